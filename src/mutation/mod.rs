//! Write path: transfers, mints, burns, freezes.
//!
//! # Data Flow
//! ```text
//! Caller (view / CLI)
//!     → precheck.rs (advisory checks against cached state)
//!     → ledger call (never retried)
//!     → on success: plan.rs keys → cache invalidate
//!     → typed result back to the caller
//! ```
//!
//! # Design Decisions
//! - Nothing is shown as committed before the ledger confirms it
//! - Failures invalidate nothing and always reach the caller
//! - Mutation results are not written into the cache

pub mod coordinator;
pub mod plan;
pub mod precheck;

pub use coordinator::MutationCoordinator;
pub use plan::{Mutation, MutationOutcome};
