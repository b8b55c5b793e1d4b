//! Subscriber handles and change notifications.

use chrono::{DateTime, Utc};
use std::sync::Weak;
use tokio::sync::mpsc;

use crate::cache::entry::FreshnessState;
use crate::cache::key::CacheKey;
use crate::cache::store::CacheInner;
use crate::ledger::error::LedgerError;

/// A state or value change of one key, delivered in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEvent {
    pub key: CacheKey,
    pub state: FreshnessState,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<LedgerError>,
}

/// Reported to the observer when a key gains its first or loses its last subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverChange {
    /// `generation` grows with every 0→1 transition of the key, so an
    /// observer that falls behind can still tell a new observation apart
    /// from one it already handled.
    Observed { key: CacheKey, generation: u64 },
    Unobserved(CacheKey),
}

/// Listener registration for one key.
///
/// Dropping the handle unsubscribes. A fetch already in flight is not
/// cancelled by unsubscribing.
#[derive(Debug)]
pub struct Subscription {
    pub(crate) key: CacheKey,
    pub(crate) id: u64,
    pub(crate) events: mpsc::UnboundedReceiver<CacheEvent>,
    pub(crate) cache: Weak<CacheInner>,
}

impl Subscription {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Wait for the next change of this key.
    ///
    /// Returns `None` once the cache has been dropped.
    pub async fn recv(&mut self) -> Option<CacheEvent> {
        self.events.recv().await
    }

    /// Take the next change if one is already queued.
    pub fn try_recv(&mut self) -> Option<CacheEvent> {
        self.events.try_recv().ok()
    }

    /// Drain every queued change.
    pub fn drain(&mut self) -> Vec<CacheEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Stop listening. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.cache.upgrade() {
            inner.remove_subscriber(&self.key, self.id);
        }
    }
}
