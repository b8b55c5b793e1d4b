//! Entity cache subsystem.
//!
//! # Data Flow
//! ```text
//! Poller / read-through query
//!     → store.rs fetch (joins in-flight fetch unless invalidated since)
//!     → ledger call
//!     → entry.rs settle (Fresh, or Stale if invalidated meanwhile)
//!     → subscription.rs events to every subscriber of the key
//!
//! Mutation success
//!     → store.rs invalidate (Fresh → Stale, value kept)
//! ```
//!
//! # Design Decisions
//! - Stale-while-revalidate: values are never evicted on error
//! - One outstanding fetch per key
//! - Views only read; writers are the poller and mutation coordinator

pub mod entry;
pub mod key;
pub mod source;
pub mod store;
pub mod subscription;

pub use entry::{EntrySnapshot, FreshnessState, SharedFetch};
pub use key::{CacheKey, CacheValue};
pub use source::ledger_fetcher;
pub use store::{EntityCache, FetchFn, FetchFuture};
pub use subscription::{CacheEvent, ObserverChange, Subscription};
