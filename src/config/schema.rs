//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dashboard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ledger::auth::AUTH_TOKEN_ENV_VAR;

/// Root configuration for the dashboard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    /// Remote ledger connection settings.
    pub ledger: LedgerConfig,

    /// Refresh intervals per entity kind.
    pub polling: PollingConfig,

    /// Account shown by the dashboard binary.
    pub account: AccountConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Base URL of the ledger REST API (e.g., "http://localhost:8080/api").
    pub base_url: String,

    /// Request timeout in seconds. There is no other deadline.
    pub request_timeout_secs: u64,

    /// Environment variable holding the bearer token.
    pub auth_token_env: String,

    /// Number of transactions requested per history fetch.
    pub transactions_limit: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout_secs: 10,
            auth_token_env: AUTH_TOKEN_ENV_VAR.to_string(),
            transactions_limit: 50,
        }
    }
}

/// Poll intervals. Transaction history is fetched on demand only.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Wallet refresh interval in milliseconds.
    pub wallet_interval_ms: u64,

    /// Reserve refresh interval in milliseconds.
    pub reserve_interval_ms: u64,

    /// Compliance alert refresh interval in milliseconds.
    pub alerts_interval_ms: u64,
}

impl PollingConfig {
    pub fn wallet_interval(&self) -> Duration {
        Duration::from_millis(self.wallet_interval_ms)
    }

    pub fn reserve_interval(&self) -> Duration {
        Duration::from_millis(self.reserve_interval_ms)
    }

    pub fn alerts_interval(&self) -> Duration {
        Duration::from_millis(self.alerts_interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            wallet_interval_ms: 30_000,
            reserve_interval_ms: 60_000,
            alerts_interval_ms: 30_000,
        }
    }
}

/// The account the dashboard binary watches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Wallet address to display.
    pub wallet_address: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            wallet_address: "user_xyz789".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address for the Prometheus scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "reserve_dashboard=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.ledger.base_url, "http://localhost:8080/api");
        assert_eq!(config.ledger.request_timeout_secs, 10);
        assert_eq!(config.ledger.transactions_limit, 50);
        assert_eq!(config.polling.wallet_interval(), Duration::from_secs(30));
        assert_eq!(config.polling.reserve_interval(), Duration::from_secs(60));
        assert_eq!(config.polling.alerts_interval(), Duration::from_secs(30));
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [ledger]
            base_url = "https://ledger.example.com/api"

            [polling]
            reserve_interval_ms = 120000
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger.base_url, "https://ledger.example.com/api");
        assert_eq!(config.ledger.request_timeout_secs, 10);
        assert_eq!(config.polling.reserve_interval(), Duration::from_secs(120));
        assert_eq!(config.polling.wallet_interval(), Duration::from_secs(30));
    }
}
