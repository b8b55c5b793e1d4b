//! Normalized ledger failures.

use thiserror::Error;

/// Errors surfaced by the ledger boundary and by client-side prechecks.
///
/// `Clone` because one in-flight fetch result is handed to every caller
/// waiting on the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Transport unreachable or timed out.
    #[error("network failure: {0}")]
    Network(String),

    /// Missing or expired credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed or out-of-policy request.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown address or resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rejected against current ledger state (frozen wallet, insufficient balance).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Server-side degradation.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// Anything the ledger reported that does not fit the categories above.
    #[error("unexpected ledger response (status {status:?}): {message}")]
    Unknown { status: Option<u16>, message: String },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Classify an HTTP status code, keeping the ledger's reason.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => LedgerError::Validation(message),
            401 | 403 => LedgerError::Unauthorized(message),
            404 => LedgerError::NotFound(message),
            409 => LedgerError::Conflict(message),
            502..=504 => LedgerError::Unavailable(message),
            _ => LedgerError::Unknown {
                status: Some(status),
                message,
            },
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Network(_) => "network",
            LedgerError::Unauthorized(_) => "unauthorized",
            LedgerError::Validation(_) => "validation",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::Unavailable(_) => "unavailable",
            LedgerError::Unknown { .. } => "unknown",
        }
    }

    /// Whether repeating the same read could plausibly succeed.
    ///
    /// Mutations are never retried regardless of this value.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Network(_) | LedgerError::Unavailable(_))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            LedgerError::Network(err.to_string())
        } else if err.is_decode() {
            LedgerError::Unknown {
                status: err.status().map(|s| s.as_u16()),
                message: format!("undecodable response: {}", err),
            }
        } else if let Some(status) = err.status() {
            LedgerError::from_status(status.as_u16(), err.to_string())
        } else {
            LedgerError::Network(err.to_string())
        }
    }
}
