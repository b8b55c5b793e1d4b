//! Composition root.
//!
//! # Data Flow
//! ```text
//! DashboardConfig
//!     → LedgerClient (bearer from env)
//!     → EntityCache ← Poller (timers per watched key)
//!                   ← MutationCoordinator (invalidate after success)
//!     → DashboardSnapshot for the view
//! ```
//!
//! # Design Decisions
//! - One cache per dashboard, injected into every collaborator (no globals)
//! - Polls register lazily on the first watch of a key
//! - Shutdown stops timers but lets in-flight fetches land

pub mod service;

pub use service::Dashboard;
