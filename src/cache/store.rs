//! The entity cache.
//!
//! # Responsibilities
//! - Hold the last known value of every fetched key with its freshness
//! - De-duplicate concurrent fetches of the same key
//! - Notify subscribers of every change, in order
//! - Report subscriber-count transitions to the poller
//!
//! Every mutation of a key happens under that key's map lock and never across
//! an `.await`; notifications are queued while the lock is held, so per-key
//! delivery order equals state-change order.

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

use crate::cache::entry::{Entry, EntrySnapshot, FreshnessState, InFlight, SharedFetch};
use crate::cache::key::{CacheKey, CacheValue};
use crate::cache::subscription::{CacheEvent, ObserverChange, Subscription};
use crate::ledger::error::LedgerResult;
use crate::ledger::types::Wallet;
use crate::observability::metrics;

/// A future producing a fresh value for one key.
pub type FetchFuture = BoxFuture<'static, LedgerResult<CacheValue>>;

/// Produces a fetch for one key. Called at most once per dispatched fetch.
pub type FetchFn = Arc<dyn Fn() -> FetchFuture + Send + Sync>;

#[derive(Default)]
struct Slot {
    entry: Option<Entry>,
    subscribers: Vec<(u64, mpsc::UnboundedSender<CacheEvent>)>,
    /// Id of the latest 0→1 subscriber transition.
    observed_since: u64,
}

impl Slot {
    fn broadcast(&self, key: &CacheKey) {
        let Some(entry) = &self.entry else {
            return;
        };
        for (_, tx) in &self.subscribers {
            let _ = tx.send(CacheEvent {
                key: key.clone(),
                state: entry.state,
                fetched_at: entry.fetched_at,
                last_error: entry.last_error.clone(),
            });
        }
    }
}

pub(crate) struct CacheInner {
    slots: DashMap<CacheKey, Slot>,
    next_id: AtomicU64,
    observer: ArcSwapOption<mpsc::UnboundedSender<ObserverChange>>,
}

impl CacheInner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn signal(&self, change: ObserverChange) {
        if let Some(tx) = self.observer.load().as_ref() {
            let _ = tx.send(change);
        }
    }

    pub(crate) fn remove_subscriber(&self, key: &CacheKey, id: u64) {
        if let Some(mut slot) = self.slots.get_mut(key) {
            let before = slot.subscribers.len();
            slot.subscribers.retain(|(sub_id, _)| *sub_id != id);
            if before > 0 && slot.subscribers.is_empty() {
                tracing::debug!(key = %key, "Last subscriber left");
                self.signal(ObserverChange::Unobserved(key.clone()));
            }
        }
        self.slots
            .remove_if(key, |_, slot| slot.entry.is_none() && slot.subscribers.is_empty());
    }

    fn settle(&self, key: &CacheKey, id: u64, dispatched_epoch: u64, result: &LedgerResult<CacheValue>) {
        let Some(mut guard) = self.slots.get_mut(key) else {
            return;
        };
        let slot = &mut *guard;
        let Some(entry) = slot.entry.as_mut() else {
            return;
        };
        entry.settle(id, dispatched_epoch, result);

        match result {
            Ok(_) => {
                metrics::record_cache_fetch(key.kind(), "ok");
                tracing::debug!(key = %key, state = entry.state.label(), "Fetch installed");
            }
            Err(err) => {
                metrics::record_cache_fetch(key.kind(), err.kind());
                tracing::warn!(key = %key, error = %err, "Fetch failed, keeping last known value");
            }
        }
        slot.broadcast(key);
    }
}

/// Keyed store of ledger entities with per-key freshness.
///
/// Cloning is cheap and every clone shares the same state. The cache is
/// created by the composition root and injected where needed.
#[derive(Clone)]
pub struct EntityCache {
    inner: Arc<CacheInner>,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: DashMap::new(),
                next_id: AtomicU64::new(1),
                observer: ArcSwapOption::empty(),
            }),
        }
    }

    /// Last known value and freshness of `key`.
    ///
    /// `None` if the key has never been fetched.
    pub fn get(&self, key: &CacheKey) -> Option<EntrySnapshot> {
        self.inner
            .slots
            .get(key)
            .and_then(|slot| slot.entry.as_ref().map(Entry::snapshot))
    }

    /// Cached wallet for `address`, whatever its freshness.
    pub fn cached_wallet(&self, address: &str) -> Option<Wallet> {
        self.get(&CacheKey::wallet(address))
            .and_then(|snapshot| snapshot.value)
            .and_then(|value| value.as_wallet().cloned())
    }

    /// Install a fresh value for `key` and notify its subscribers.
    pub fn put(&self, key: CacheKey, value: CacheValue) {
        let mut guard = self.inner.slots.entry(key.clone()).or_default();
        let slot = &mut *guard;
        slot.entry.get_or_insert_with(Entry::new).install(value);
        tracing::trace!(key = %key, "Value installed");
        slot.broadcast(&key);
    }

    /// Mark `key` stale after a state-changing event.
    ///
    /// The stored value stays visible. A fetch dispatched before this call
    /// will land as stale. Returns true if a Fresh entry became Stale.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let Some(mut guard) = self.inner.slots.get_mut(key) else {
            return false;
        };
        let slot = &mut *guard;
        let Some(entry) = slot.entry.as_mut() else {
            return false;
        };

        entry.epoch += 1;
        metrics::record_invalidation(key.kind());
        if entry.state != FreshnessState::Fresh {
            return false;
        }
        entry.state = FreshnessState::Stale;
        tracing::debug!(key = %key, "Entry invalidated");
        slot.broadcast(key);
        true
    }

    /// Mark `key` stale because its refresh interval elapsed.
    ///
    /// Unlike [`invalidate`](Self::invalidate) this does not affect fetches
    /// already in flight.
    pub fn expire(&self, key: &CacheKey) -> bool {
        let Some(mut guard) = self.inner.slots.get_mut(key) else {
            return false;
        };
        let slot = &mut *guard;
        match slot.entry.as_mut() {
            Some(entry) if entry.state == FreshnessState::Fresh => {
                entry.state = FreshnessState::Stale;
                slot.broadcast(key);
                true
            }
            _ => false,
        }
    }

    /// Fetch `key`, joining the fetch already in flight if there is one.
    ///
    /// A fetch dispatched before the latest [`invalidate`](Self::invalidate)
    /// is not joined; a new one replaces it as the in-flight fetch. The older
    /// one still lands when it completes, as Stale. The returned future may be dropped without cancelling the fetch; the
    /// result is installed either way. `fetch` must not call back into the
    /// cache synchronously.
    pub fn fetch(&self, key: &CacheKey, fetch: &FetchFn) -> SharedFetch {
        let mut guard = self.inner.slots.entry(key.clone()).or_default();
        let slot = &mut *guard;
        let entry = slot.entry.get_or_insert_with(Entry::new);

        if let Some(in_flight) = &entry.in_flight {
            if in_flight.dispatched_epoch == entry.epoch {
                metrics::record_dedup(key.kind());
                tracing::trace!(key = %key, "Joining in-flight fetch");
                return in_flight.shared.clone();
            }
            // Dispatched before an invalidation, so never joined.
            tracing::debug!(
                key = %key,
                superseded_id = in_flight.id,
                "In-flight fetch predates an invalidation, dispatching another"
            );
        }

        let id = self.inner.next_id();
        let dispatched_epoch = entry.epoch;
        let cache: Weak<CacheInner> = Arc::downgrade(&self.inner);
        let settle_key = key.clone();
        let request = fetch();

        let shared = async move {
            let result = request.await;
            if let Some(inner) = cache.upgrade() {
                inner.settle(&settle_key, id, dispatched_epoch, &result);
            }
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            id,
            dispatched_epoch,
            shared: shared.clone(),
        });
        entry.state = FreshnessState::Fetching;
        tracing::debug!(key = %key, fetch_id = id, "Fetch dispatched");
        slot.broadcast(key);
        drop(guard);

        // Drive to completion even if every caller goes away.
        tokio::spawn(shared.clone());
        shared
    }

    /// Return the cached value if fresh, otherwise fetch it.
    pub async fn read(&self, key: &CacheKey, fetch: &FetchFn) -> LedgerResult<CacheValue> {
        if let Some(EntrySnapshot {
            value: Some(value),
            state: FreshnessState::Fresh,
            ..
        }) = self.get(key)
        {
            metrics::record_cache_hit(key.kind());
            return Ok(value);
        }
        self.fetch(key, fetch).await
    }

    /// Listen to every change of `key`.
    pub fn subscribe(&self, key: &CacheKey) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id();

        let mut slot = self.inner.slots.entry(key.clone()).or_default();
        slot.subscribers.push((id, tx));
        if slot.subscribers.len() == 1 {
            slot.observed_since = id;
            tracing::debug!(key = %key, generation = id, "First subscriber joined");
            self.inner.signal(ObserverChange::Observed {
                key: key.clone(),
                generation: id,
            });
        }
        drop(slot);

        Subscription {
            key: key.clone(),
            id,
            events: rx,
            cache: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions on `key`.
    pub fn subscriber_count(&self, key: &CacheKey) -> usize {
        self.inner
            .slots
            .get(key)
            .map(|slot| slot.subscribers.len())
            .unwrap_or(0)
    }

    /// Generation of the current observation of `key`, if it has subscribers.
    ///
    /// Every time `key` goes from zero to one subscriber it gets a new,
    /// strictly greater generation.
    pub fn observation(&self, key: &CacheKey) -> Option<u64> {
        self.inner
            .slots
            .get(key)
            .filter(|slot| !slot.subscribers.is_empty())
            .map(|slot| slot.observed_since)
    }

    /// Receive subscriber-count transitions from now on.
    ///
    /// Replaces any previous observer. Keys already observed are announced
    /// immediately.
    pub fn observe(&self) -> mpsc::UnboundedReceiver<ObserverChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.observer.store(Some(Arc::new(tx)));
        for slot in self.inner.slots.iter() {
            if !slot.subscribers.is_empty() {
                self.inner.signal(ObserverChange::Observed {
                    key: slot.key().clone(),
                    generation: slot.observed_since,
                });
            }
        }
        rx
    }

    /// Keys with a stored entry.
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .inner
            .slots
            .iter()
            .filter(|slot| slot.entry.is_some())
            .map(|slot| slot.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|slot| slot.entry.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("entries", &self.len())
            .finish()
    }
}
