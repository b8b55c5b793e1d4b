//! Remote ledger REST client.
//!
//! # Responsibilities
//! - Build requests for every ledger endpoint
//! - Attach the bearer credential and a request ID to each call
//! - Unwrap the `{ success, data, message }` envelope
//! - Normalize transport and status failures into `LedgerError`
//!
//! No call is ever retried here; callers decide whether a retry is safe.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use url::Url;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::ledger::auth::CredentialStore;
use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::types::{
    ApiResponse, ApiStatus, BurnRequest, ComplianceAlert, MintRequest, Reserve, Transaction,
    TransferRequest, Wallet,
};
use crate::observability::metrics;

/// Header carrying the per-call correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The ledger operations the dashboard depends on.
///
/// Implemented by [`LedgerClient`] over HTTP; tests substitute in-memory fakes.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn get_wallet(&self, address: &str) -> LedgerResult<Wallet>;

    /// Open a wallet. The KYC payload is passed through untouched.
    async fn create_wallet(&self, kyc: &serde_json::Value) -> LedgerResult<Wallet>;

    async fn transfer(&self, request: &TransferRequest) -> LedgerResult<Transaction>;

    async fn mint(&self, request: &MintRequest) -> LedgerResult<Transaction>;

    async fn burn(&self, request: &BurnRequest) -> LedgerResult<Transaction>;

    async fn get_transactions(&self, address: &str, limit: u32) -> LedgerResult<Vec<Transaction>>;

    async fn get_reserve(&self) -> LedgerResult<Reserve>;

    async fn get_compliance_alerts(&self) -> LedgerResult<Vec<ComplianceAlert>>;

    async fn freeze_wallet(&self, address: &str) -> LedgerResult<()>;

    async fn unfreeze_wallet(&self, address: &str) -> LedgerResult<()>;
}

/// HTTP implementation of [`LedgerApi`].
#[derive(Clone)]
pub struct LedgerClient {
    http: Client,
    base_url: Url,
    credentials: CredentialStore,
    timeout: Duration,
}

impl LedgerClient {
    /// Create a client for the configured ledger.
    ///
    /// # Arguments
    /// * `config` - Ledger endpoint and timeout settings
    /// * `credentials` - Shared credential store read on every call
    pub fn new(config: &LedgerConfig, credentials: CredentialStore) -> LedgerResult<Self> {
        let base_url: Url = config.base_url.parse().map_err(|e| {
            LedgerError::Validation(format!("invalid ledger URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(LedgerError::Validation(format!(
                "ledger URL '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Unknown {
                status: None,
                message: format!("failed to build HTTP client: {}", e),
            })?;

        tracing::info!(
            base_url = %base_url,
            timeout_secs = config.request_timeout_secs,
            authenticated = credentials.is_present(),
            "Ledger client initialized"
        );

        Ok(Self {
            http,
            base_url,
            credentials,
            timeout,
        })
    }

    /// The credential store used by this client.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Resolve an endpoint below the base URL, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> LedgerResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LedgerError::Validation("ledger URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return its status and raw body.
    async fn execute(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> LedgerResult<(StatusCode, String)> {
        let request_id = Uuid::new_v4();
        let mut builder = builder.header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(bearer) = self.credentials.bearer() {
            builder = builder.header(AUTHORIZATION, bearer);
        }

        let started = Instant::now();
        let result = builder.send().await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let err = LedgerError::from(e);
                tracing::warn!(
                    operation,
                    request_id = %request_id,
                    error = %err,
                    "Ledger call failed"
                );
                metrics::record_ledger_call(operation, err.kind(), started.elapsed());
                return Err(err);
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(LedgerError::from)?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiStatus>(&body)
                .ok()
                .and_then(|s| s.message)
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("no reason").to_string());
            let err = LedgerError::from_status(status.as_u16(), reason);
            tracing::warn!(
                operation,
                request_id = %request_id,
                status = status.as_u16(),
                error = %err,
                "Ledger rejected call"
            );
            metrics::record_ledger_call(operation, err.kind(), started.elapsed());
            return Err(err);
        }

        tracing::debug!(
            operation,
            request_id = %request_id,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ledger call completed"
        );
        metrics::record_ledger_call(operation, "ok", started.elapsed());
        Ok((status, body))
    }

    /// Send a request and unwrap the envelope's `data`.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> LedgerResult<T> {
        let (status, body) = self.execute(operation, builder).await?;
        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| LedgerError::Unknown {
                status: Some(status.as_u16()),
                message: format!("undecodable {} response: {}", operation, e),
            })?;
        if !envelope.success {
            return Err(LedgerError::Unknown {
                status: Some(status.as_u16()),
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("{} reported failure", operation)),
            });
        }
        Ok(envelope.data)
    }

    /// Send a request whose envelope carries no data.
    async fn call_void(&self, operation: &'static str, builder: RequestBuilder) -> LedgerResult<()> {
        let (status, body) = self.execute(operation, builder).await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        let envelope: ApiStatus = serde_json::from_str(&body).map_err(|e| LedgerError::Unknown {
            status: Some(status.as_u16()),
            message: format!("undecodable {} response: {}", operation, e),
        })?;
        if !envelope.success {
            return Err(LedgerError::Unknown {
                status: Some(status.as_u16()),
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("{} reported failure", operation)),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerApi for LedgerClient {
    async fn get_wallet(&self, address: &str) -> LedgerResult<Wallet> {
        let url = self.endpoint(&["wallets", address])?;
        self.call("get_wallet", self.http.get(url)).await
    }

    async fn create_wallet(&self, kyc: &serde_json::Value) -> LedgerResult<Wallet> {
        let url = self.endpoint(&["wallets"])?;
        self.call("create_wallet", self.http.post(url).json(kyc)).await
    }

    async fn transfer(&self, request: &TransferRequest) -> LedgerResult<Transaction> {
        let url = self.endpoint(&["transactions", "transfer"])?;
        self.call("transfer", self.http.post(url).json(request)).await
    }

    async fn mint(&self, request: &MintRequest) -> LedgerResult<Transaction> {
        let url = self.endpoint(&["transactions", "mint"])?;
        self.call("mint", self.http.post(url).json(request)).await
    }

    async fn burn(&self, request: &BurnRequest) -> LedgerResult<Transaction> {
        let url = self.endpoint(&["transactions", "burn"])?;
        self.call("burn", self.http.post(url).json(request)).await
    }

    async fn get_transactions(&self, address: &str, limit: u32) -> LedgerResult<Vec<Transaction>> {
        let url = self.endpoint(&["transactions", address])?;
        let builder = self.http.get(url).query(&[("limit", limit)]);
        self.call("get_transactions", builder).await
    }

    async fn get_reserve(&self) -> LedgerResult<Reserve> {
        let url = self.endpoint(&["reserve"])?;
        self.call("get_reserve", self.http.get(url)).await
    }

    async fn get_compliance_alerts(&self) -> LedgerResult<Vec<ComplianceAlert>> {
        let url = self.endpoint(&["compliance", "alerts"])?;
        self.call("get_compliance_alerts", self.http.get(url)).await
    }

    async fn freeze_wallet(&self, address: &str) -> LedgerResult<()> {
        let url = self.endpoint(&["compliance", "freeze", address])?;
        self.call_void("freeze_wallet", self.http.post(url)).await
    }

    async fn unfreeze_wallet(&self, address: &str) -> LedgerResult<()> {
        let url = self.endpoint(&["compliance", "unfreeze", address])?;
        self.call_void("unfreeze_wallet", self.http.post(url)).await
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout.as_secs())
            .field("credentials", &self.credentials)
            .finish()
    }
}
