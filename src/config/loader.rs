//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::DashboardConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DashboardConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DashboardConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    
    validate_config(&config).map_err(ConfigError::Validation)?;
    
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Load configuration from `path` if given, otherwise use validated defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = DashboardConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, uuid::Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp(
            "dashboard-config",
            r#"
            [ledger]
            base_url = "http://127.0.0.1:9000/api"
            transactions_limit = 20

            [account]
            wallet_address = "corp_abc123"
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.ledger.transactions_limit, 20);
        assert_eq!(config.account.wallet_address, "corp_abc123");
        std::fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = write_temp("dashboard-config-invalid", "[polling]\nwallet_interval_ms = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("polling.wallet_interval_ms"));
        std::fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let path = write_temp("dashboard-config-garbled", "[ledger\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/dashboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_default_when_no_path() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.polling.wallet_interval_ms, 30_000);
    }
}
