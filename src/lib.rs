//! Reserve dashboard sync core
//!
//! Keeps several independently polled views of a custodial HKD ledger
//! (wallet, reserve, transaction history, compliance alerts) consistent with
//! each other and with user-initiated writes.

// Ledger boundary
pub mod ledger;

// Client-side state
pub mod cache;
pub mod mutation;
pub mod poller;

// Composition and presentation
pub mod dashboard;
pub mod view;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use cache::{CacheKey, EntityCache, FreshnessState};
pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use ledger::{LedgerClient, LedgerError};
pub use lifecycle::Shutdown;
