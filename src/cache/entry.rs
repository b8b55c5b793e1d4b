//! Per-key cache entry and its freshness state machine.
//!
//! # States
//! - Fresh: value can be trusted without refetching
//! - Stale: value is outdated (or the last refresh failed) but still shown
//! - Fetching: a refresh is in flight
//!
//! # State Transitions
//! ```text
//! (none)   → Fetching: first fetch dispatched
//! Fresh    → Stale:    invalidation or poll expiry
//! Stale    → Fetching: refetch dispatched
//! Fetching → Fresh:    success, no invalidation since dispatch
//! Fetching → Stale:    success after a later invalidation, or failure
//! Fetching → Fetching: a superseded fetch lands while its replacement runs
//! ```

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, Shared};

use crate::cache::key::CacheValue;
use crate::ledger::error::{LedgerError, LedgerResult};

/// A fetch shared by every caller waiting on the same key.
pub type SharedFetch = Shared<BoxFuture<'static, LedgerResult<CacheValue>>>;

/// Freshness tag of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessState {
    Fresh,
    Stale,
    Fetching,
}

impl FreshnessState {
    pub fn label(&self) -> &'static str {
        match self {
            FreshnessState::Fresh => "fresh",
            FreshnessState::Stale => "stale",
            FreshnessState::Fetching => "fetching",
        }
    }
}

/// Point-in-time copy of an entry, handed to readers.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    /// Last known good value; `None` until the first successful fetch.
    pub value: Option<CacheValue>,
    pub state: FreshnessState,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Set when the most recent refresh failed.
    pub last_error: Option<LedgerError>,
}

impl EntrySnapshot {
    pub fn is_fresh(&self) -> bool {
        self.state == FreshnessState::Fresh
    }

    /// True when the view should show a "last update failed" marker.
    pub fn last_update_failed(&self) -> bool {
        self.last_error.is_some()
    }
}

pub(crate) struct InFlight {
    pub id: u64,
    /// Invalidation epoch observed when the fetch was dispatched.
    pub dispatched_epoch: u64,
    pub shared: SharedFetch,
}

pub(crate) struct Entry {
    pub value: Option<CacheValue>,
    pub state: FreshnessState,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<LedgerError>,
    /// Bumped on every invalidation.
    pub epoch: u64,
    pub in_flight: Option<InFlight>,
}

impl Entry {
    pub fn new() -> Self {
        Self {
            value: None,
            state: FreshnessState::Stale,
            fetched_at: None,
            last_error: None,
            epoch: 0,
            in_flight: None,
        }
    }

    /// Install a value as fresh.
    pub fn install(&mut self, value: CacheValue) {
        self.value = Some(value);
        self.fetched_at = Some(Utc::now());
        self.last_error = None;
        self.state = FreshnessState::Fresh;
    }

    /// Apply the outcome of fetch `id`.
    pub fn settle(&mut self, id: u64, dispatched_epoch: u64, result: &LedgerResult<CacheValue>) {
        let superseded = match &self.in_flight {
            Some(in_flight) if in_flight.id == id => {
                self.in_flight = None;
                false
            }
            Some(_) => true,
            None => false,
        };

        match result {
            Ok(value) => {
                self.install(value.clone());
                if self.epoch > dispatched_epoch {
                    // Data predates an invalidating event.
                    self.state = FreshnessState::Stale;
                }
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                self.state = FreshnessState::Stale;
            }
        }

        if superseded {
            self.state = FreshnessState::Fetching;
        }
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            value: self.value.clone(),
            state: self.state,
            fetched_at: self.fetched_at,
            last_error: self.last_error.clone(),
        }
    }
}
