//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (binary):
//!     Load config → Validate → Build ledger client → Build dashboard → Watch keys
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C or explicit trigger → Poll timers exit → Render loop exits
//! ```
//!
//! # Design Decisions
//! - The entity cache lives exactly as long as the dashboard that owns it
//! - In-flight reads are allowed to finish; nothing waits on them at exit

pub mod shutdown;

pub use shutdown::Shutdown;
