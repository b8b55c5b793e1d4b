//! Point-in-time copy of everything the dashboard shows.

use chrono::{DateTime, Utc};

use crate::cache::{CacheKey, CacheValue, EntityCache, EntrySnapshot, FreshnessState};
use crate::ledger::error::LedgerError;
use crate::ledger::types::{ComplianceAlert, Reserve, Transaction, Wallet};

/// One panel's data plus the freshness needed to decorate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel<T> {
    /// Last known value, possibly stale.
    pub value: Option<T>,
    /// `None` when the key has never been fetched.
    pub state: Option<FreshnessState>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<LedgerError>,
}

impl<T> Panel<T> {
    fn from_entry(entry: Option<EntrySnapshot>, extract: impl FnOnce(CacheValue) -> Option<T>) -> Self {
        match entry {
            Some(entry) => Self {
                value: entry.value.and_then(extract),
                state: Some(entry.state),
                fetched_at: entry.fetched_at,
                last_error: entry.last_error,
            },
            None => Self {
                value: None,
                state: None,
                fetched_at: None,
                last_error: None,
            },
        }
    }

    /// Annotation shown next to the panel title, if any.
    pub fn marker(&self) -> Option<&'static str> {
        if self.last_error.is_some() {
            return Some("last update failed");
        }
        match (self.state, self.value.is_some()) {
            (None, _) => Some("not loaded"),
            (Some(FreshnessState::Fetching), false) => Some("loading"),
            (Some(FreshnessState::Fetching), true) => Some("refreshing"),
            (Some(FreshnessState::Stale), _) => Some("stale"),
            (Some(FreshnessState::Fresh), _) => None,
        }
    }
}

/// Every panel of the dashboard for one wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub address: String,
    pub wallet: Panel<Wallet>,
    pub reserve: Panel<Reserve>,
    pub transactions: Panel<Vec<Transaction>>,
    pub alerts: Panel<Vec<ComplianceAlert>>,
}

impl DashboardSnapshot {
    /// Read the current cache contents for `address`. Never touches the network.
    pub fn capture(cache: &EntityCache, address: &str) -> Self {
        Self {
            address: address.to_string(),
            wallet: Panel::from_entry(cache.get(&CacheKey::wallet(address)), CacheValue::into_wallet),
            reserve: Panel::from_entry(cache.get(&CacheKey::Reserve), CacheValue::into_reserve),
            transactions: Panel::from_entry(
                cache.get(&CacheKey::transactions(address)),
                CacheValue::into_transactions,
            ),
            alerts: Panel::from_entry(cache.get(&CacheKey::ComplianceAlerts), CacheValue::into_alerts),
        }
    }

    /// Number of high or critical compliance alerts.
    pub fn elevated_alerts(&self) -> usize {
        self.alerts
            .value
            .as_ref()
            .map(|alerts| alerts.iter().filter(|alert| alert.is_elevated()).count())
            .unwrap_or(0)
    }
}
