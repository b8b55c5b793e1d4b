//! Periodic refresh subsystem.
//!
//! # Data Flow
//! ```text
//! register(key, interval, fetch)
//!     → scheduler.rs (one registration per key)
//!     → timer.rs while the key has subscribers
//!         tick → cache expire → cache fetch (de-duplicated)
//!
//! Cache subscriber count 0 → 1: scheduler restarts timer (immediate refetch),
//!     once per observation generation
//! Cache subscriber count 1 → 0: scheduler aborts timer
//! ```
//!
//! # Design Decisions
//! - Unobserved data is never polled
//! - Poll failures are absorbed into the cache entry, never surfaced to views
//! - No retries beyond the next scheduled tick
//! - Transaction lists are not polled; they refresh on demand

pub mod scheduler;
pub mod timer;

pub use scheduler::Poller;
