//! The dashboard composition root.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{ledger_fetcher, CacheKey, CacheValue, EntityCache, FetchFn, Subscription};
use crate::config::DashboardConfig;
use crate::ledger::auth::CredentialStore;
use crate::ledger::client::{LedgerApi, LedgerClient};
use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::types::{
    BurnRequest, ComplianceAlert, MintRequest, Reserve, Transaction, TransferRequest, Wallet,
};
use crate::lifecycle::Shutdown;
use crate::mutation::{Mutation, MutationCoordinator, MutationOutcome};
use crate::poller::Poller;
use crate::view::DashboardSnapshot;

/// Owns the cache, poller and mutation coordinator for one ledger.
///
/// Reads go through the cache (fresh hit or de-duplicated fetch). `watch_*`
/// subscribes to a key and makes sure its poll is registered. Dropping the
/// dashboard or calling [`Dashboard::shutdown`] stops every timer.
pub struct Dashboard {
    api: Arc<dyn LedgerApi>,
    cache: EntityCache,
    poller: Poller,
    coordinator: MutationCoordinator,
    config: DashboardConfig,
    shutdown: Shutdown,
}

impl Dashboard {
    /// Connect to the ledger described by `config`.
    ///
    /// The bearer token is read from the environment variable named in the
    /// config. Must be called from within a Tokio runtime.
    pub fn connect(config: DashboardConfig) -> LedgerResult<Self> {
        let credentials = CredentialStore::from_env(&config.ledger.auth_token_env);
        let client = LedgerClient::new(&config.ledger, credentials)?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Build a dashboard over any ledger implementation.
    pub fn with_api(config: DashboardConfig, api: Arc<dyn LedgerApi>) -> Self {
        let cache = EntityCache::new();
        let shutdown = Shutdown::new();
        let poller = Poller::new(cache.clone(), shutdown.clone());
        let coordinator = MutationCoordinator::new(api.clone(), cache.clone());

        tracing::info!(
            wallet_interval_ms = config.polling.wallet_interval_ms,
            reserve_interval_ms = config.polling.reserve_interval_ms,
            alerts_interval_ms = config.polling.alerts_interval_ms,
            "Dashboard initialized"
        );

        Self {
            api,
            cache,
            poller,
            coordinator,
            config,
            shutdown,
        }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Shutdown handle shared with the poll timers.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    fn fetcher(&self, key: &CacheKey) -> FetchFn {
        ledger_fetcher(self.api.clone(), key.clone(), self.config.ledger.transactions_limit)
    }

    fn interval(&self, key: &CacheKey) -> Option<Duration> {
        match key {
            CacheKey::Wallet(_) => Some(self.config.polling.wallet_interval()),
            CacheKey::Reserve => Some(self.config.polling.reserve_interval()),
            CacheKey::ComplianceAlerts => Some(self.config.polling.alerts_interval()),
            CacheKey::Transactions(_) => None,
        }
    }

    async fn read<T>(&self, key: CacheKey, extract: fn(CacheValue) -> Option<T>) -> LedgerResult<T> {
        let value = self.cache.read(&key, &self.fetcher(&key)).await?;
        extract(value).ok_or_else(|| LedgerError::Unknown {
            status: None,
            message: format!("cache held an unexpected value for {}", key),
        })
    }

    /// Current wallet state, fetched if not fresh.
    pub async fn wallet(&self, address: &str) -> LedgerResult<Wallet> {
        self.read(CacheKey::wallet(address), CacheValue::into_wallet).await
    }

    pub async fn reserve(&self) -> LedgerResult<Reserve> {
        self.read(CacheKey::Reserve, CacheValue::into_reserve).await
    }

    pub async fn transactions(&self, address: &str) -> LedgerResult<Vec<Transaction>> {
        self.read(CacheKey::transactions(address), CacheValue::into_transactions)
            .await
    }

    pub async fn compliance_alerts(&self) -> LedgerResult<Vec<ComplianceAlert>> {
        self.read(CacheKey::ComplianceAlerts, CacheValue::into_alerts).await
    }

    /// Subscribe to `key` and keep it refreshed while anyone listens.
    ///
    /// Polled kinds register their poll on first use. Transaction history has
    /// no poll; it is fetched once here unless already fresh. Wallet keys with
    /// a blank address are subscribed but never fetched.
    pub fn watch(&self, key: CacheKey) -> Subscription {
        let subscription = self.cache.subscribe(&key);
        if key.address().is_some_and(|address| address.trim().is_empty()) {
            tracing::debug!(key = %key, "No wallet address, not refreshing");
            return subscription;
        }
        match self.interval(&key) {
            Some(interval) => {
                if !self.poller.is_registered(&key) {
                    self.poller.register(key.clone(), interval, self.fetcher(&key));
                }
            }
            None => {
                let fresh = self.cache.get(&key).is_some_and(|entry| entry.is_fresh());
                if !fresh {
                    drop(self.cache.fetch(&key, &self.fetcher(&key)));
                }
            }
        }
        subscription
    }

    pub fn watch_wallet(&self, address: &str) -> Subscription {
        self.watch(CacheKey::wallet(address))
    }

    pub fn watch_reserve(&self) -> Subscription {
        self.watch(CacheKey::Reserve)
    }

    pub fn watch_alerts(&self) -> Subscription {
        self.watch(CacheKey::ComplianceAlerts)
    }

    pub fn watch_transactions(&self, address: &str) -> Subscription {
        self.watch(CacheKey::transactions(address))
    }

    /// Force a refetch of `key`, joining one already in flight.
    pub async fn refresh(&self, key: &CacheKey) -> LedgerResult<CacheValue> {
        self.cache.fetch(key, &self.fetcher(key)).await
    }

    pub async fn transfer(&self, request: TransferRequest) -> LedgerResult<Transaction> {
        self.coordinator.transfer(request).await
    }

    pub async fn mint(&self, request: MintRequest) -> LedgerResult<Transaction> {
        self.coordinator.mint(request).await
    }

    pub async fn burn(&self, request: BurnRequest) -> LedgerResult<Transaction> {
        self.coordinator.burn(request).await
    }

    pub async fn freeze(&self, address: &str) -> LedgerResult<()> {
        self.coordinator.freeze(address).await
    }

    pub async fn unfreeze(&self, address: &str) -> LedgerResult<()> {
        self.coordinator.unfreeze(address).await
    }

    pub async fn execute(&self, mutation: Mutation) -> LedgerResult<MutationOutcome> {
        self.coordinator.execute(mutation).await
    }

    /// Open a wallet. A previously cached lookup of the new address is marked stale.
    pub async fn create_wallet(&self, kyc: &serde_json::Value) -> LedgerResult<Wallet> {
        let wallet = self.api.create_wallet(kyc).await?;
        self.cache.invalidate(&CacheKey::wallet(&wallet.address));
        tracing::info!(address = %wallet.address, "Wallet created");
        Ok(wallet)
    }

    /// Everything the view shows for `address`, without touching the network.
    pub fn snapshot(&self, address: &str) -> DashboardSnapshot {
        DashboardSnapshot::capture(&self.cache, address)
    }

    /// Stop every poll timer. In-flight fetches still complete.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
        self.poller.stop();
        tracing::info!("Dashboard shut down");
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("cache", &self.cache)
            .field("active_polls", &self.poller.active_polls())
            .field("base_url", &self.config.ledger.base_url)
            .finish()
    }
}
