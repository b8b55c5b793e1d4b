//! Fetch functions backed by the ledger.

use futures_util::future::FutureExt;
use std::sync::Arc;

use crate::cache::key::{CacheKey, CacheValue};
use crate::cache::store::FetchFn;
use crate::ledger::client::LedgerApi;

/// Build the fetch function that refreshes `key` from the ledger.
///
/// Transaction lists are requested with `transactions_limit` entries.
pub fn ledger_fetcher(api: Arc<dyn LedgerApi>, key: CacheKey, transactions_limit: u32) -> FetchFn {
    Arc::new(move || {
        let api = api.clone();
        let key = key.clone();
        async move {
            match key {
                CacheKey::Wallet(address) => api.get_wallet(&address).await.map(CacheValue::Wallet),
                CacheKey::Reserve => api.get_reserve().await.map(CacheValue::Reserve),
                CacheKey::Transactions(address) => api
                    .get_transactions(&address, transactions_limit)
                    .await
                    .map(CacheValue::Transactions),
                CacheKey::ComplianceAlerts => api
                    .get_compliance_alerts()
                    .await
                    .map(CacheValue::ComplianceAlerts),
            }
        }
        .boxed()
    })
}
