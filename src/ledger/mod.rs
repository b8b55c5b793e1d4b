//! Remote ledger boundary.
//!
//! # Data Flow
//! ```text
//! Session credential (env / login)
//!     → auth.rs (credential store, hot-swappable)
//!     → client.rs (request building, envelope unwrapping)
//!     → error.rs (status code → LedgerError)
//!     → types.rs (wire model)
//! ```
//!
//! # Design Decisions
//! - The ledger is the sole source of truth for balances and statuses
//! - No automatic retries at this layer
//! - Every call carries the bearer credential and a request ID

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use auth::CredentialStore;
pub use client::{LedgerApi, LedgerClient};
pub use error::{LedgerError, LedgerResult};
pub use types::{
    BurnRequest, ComplianceAlert, KycStatus, MintRequest, Reserve, SeverityLevel, Transaction,
    TransactionMetadata, TransactionStatus, TransactionType, TransferRequest, Wallet,
};
