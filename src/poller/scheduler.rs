//! Subscriber-counted poll scheduling.

use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::cache::{CacheKey, EntityCache, FetchFn, ObserverChange};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::poller::timer::run_timer;

struct Registration {
    interval: Duration,
    fetch: FetchFn,
    timer: Option<JoinHandle<()>>,
    /// Observation generation the running timer was started for.
    generation: u64,
}

impl Registration {
    fn stop_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                metrics::record_poll_stopped();
                true
            }
            None => false,
        }
    }

    fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

struct PollerInner {
    cache: EntityCache,
    registrations: DashMap<CacheKey, Registration>,
    shutdown: Shutdown,
}

impl PollerInner {
    fn start_timer(&self, key: &CacheKey, registration: &mut Registration) {
        registration.stop_timer();
        let timer = tokio::spawn(run_timer(
            self.cache.clone(),
            key.clone(),
            registration.interval,
            registration.fetch.clone(),
            self.shutdown.subscribe(),
        ));
        registration.timer = Some(timer);
        metrics::record_poll_started();
    }

    /// A key gained its first subscriber.
    ///
    /// A newer generation restarts a timer that is still running: the key lost
    /// and regained its subscribers before the pause was handled.
    fn resume(&self, key: &CacheKey, generation: u64) {
        if let Some(mut registration) = self.registrations.get_mut(key) {
            if self.cache.subscriber_count(key) == 0 {
                return;
            }
            if generation > registration.generation || !registration.is_running() {
                tracing::debug!(key = %key, generation, "Resuming poll");
                self.start_timer(key, &mut registration);
                registration.generation = registration.generation.max(generation);
            }
        }
    }

    /// A key lost its last subscriber.
    fn pause(&self, key: &CacheKey) {
        if let Some(mut registration) = self.registrations.get_mut(key) {
            if self.cache.subscriber_count(key) == 0 && registration.stop_timer() {
                tracing::debug!(key = %key, "Pausing poll, no subscribers left");
            }
        }
    }
}

/// Drives periodic refresh of registered keys while they are observed.
///
/// Each registered key polls on its own interval. A key with no subscribers
/// is not polled; its timer restarts (with an immediate refetch) when a
/// subscriber returns.
pub struct Poller {
    inner: Arc<PollerInner>,
    supervisor: JoinHandle<()>,
}

impl Poller {
    /// Create a poller attached to `cache`.
    ///
    /// Must be called from within a Tokio runtime. Becomes the cache's only
    /// subscriber-count observer.
    pub fn new(cache: EntityCache, shutdown: Shutdown) -> Self {
        let changes = cache.observe();
        let inner = Arc::new(PollerInner {
            cache,
            registrations: DashMap::new(),
            shutdown,
        });
        let supervisor = tokio::spawn(supervise(
            Arc::downgrade(&inner),
            changes,
            inner.shutdown.subscribe(),
        ));
        Self { inner, supervisor }
    }

    /// Poll `key` every `interval` using `fetch`.
    ///
    /// Fetches once immediately. Registering a key again replaces its
    /// interval, fetch function and timer.
    pub fn register(&self, key: CacheKey, interval: Duration, fetch: FetchFn) {
        let mut registration = self
            .inner
            .registrations
            .entry(key.clone())
            .or_insert_with(|| Registration {
                interval,
                fetch: fetch.clone(),
                timer: None,
                generation: 0,
            });
        registration.stop_timer();
        registration.interval = interval;
        registration.fetch = fetch;

        tracing::info!(key = %key, interval_ms = interval.as_millis() as u64, "Poll registered");

        if let Some(generation) = self.inner.cache.observation(&key) {
            self.inner.start_timer(&key, &mut registration);
            registration.generation = generation;
        } else {
            // Nobody is watching yet; refresh once and wait for a subscriber.
            drop(self.inner.cache.fetch(&key, &registration.fetch));
        }
    }

    /// Stop polling `key` for good. Returns false if it was not registered.
    pub fn deregister(&self, key: &CacheKey) -> bool {
        match self.inner.registrations.remove(key) {
            Some((_, mut registration)) => {
                registration.stop_timer();
                tracing::info!(key = %key, "Poll deregistered");
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, key: &CacheKey) -> bool {
        self.inner.registrations.contains_key(key)
    }

    /// Whether a timer is currently running for `key`.
    pub fn is_polling(&self, key: &CacheKey) -> bool {
        self.inner
            .registrations
            .get(key)
            .is_some_and(|registration| registration.is_running())
    }

    /// Number of keys with a running timer.
    pub fn active_polls(&self) -> usize {
        self.inner
            .registrations
            .iter()
            .filter(|registration| registration.is_running())
            .count()
    }

    /// Stop every timer and stop reacting to subscriptions.
    pub fn stop(&self) {
        self.supervisor.abort();
        for mut registration in self.inner.registrations.iter_mut() {
            registration.stop_timer();
        }
        tracing::info!("Poller stopped");
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn supervise(
    inner: Weak<PollerInner>,
    mut changes: mpsc::UnboundedReceiver<ObserverChange>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                let Some(inner) = inner.upgrade() else { break };
                match change {
                    ObserverChange::Observed { key, generation } => inner.resume(&key, generation),
                    ObserverChange::Unobserved(key) => inner.pause(&key),
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Poll supervisor received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
