//! Read-only presentation of the cache.
//!
//! # Data Flow
//! ```text
//! EntityCache
//!     → snapshot.rs (copy every panel with its freshness)
//!     → render.rs (plain text, stale / failed markers)
//!     → format.rs (HK$ amounts, timestamps, short addresses)
//! ```
//!
//! # Design Decisions
//! - Pure functions over a snapshot; nothing here fetches or invalidates
//! - A stale or failed panel keeps showing its last known value

pub mod format;
pub mod render;
pub mod snapshot;

pub use format::{format_hkd, format_timestamp, truncate_address};
pub use render::render_text;
pub use snapshot::{DashboardSnapshot, Panel};
