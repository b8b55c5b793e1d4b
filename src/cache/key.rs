//! Cache keys and the values stored under them.

use std::fmt;

use crate::ledger::types::{ComplianceAlert, Reserve, Transaction, Wallet};

/// Identifies one cached view of server state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// A wallet, by address.
    Wallet(String),
    /// The reserve singleton.
    Reserve,
    /// Transaction history of an address.
    Transactions(String),
    /// All open compliance alerts.
    ComplianceAlerts,
}

impl CacheKey {
    pub fn wallet(address: impl Into<String>) -> Self {
        CacheKey::Wallet(address.into())
    }

    pub fn transactions(address: impl Into<String>) -> Self {
        CacheKey::Transactions(address.into())
    }

    /// Entity kind, used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::Wallet(_) => "wallet",
            CacheKey::Reserve => "reserve",
            CacheKey::Transactions(_) => "transactions",
            CacheKey::ComplianceAlerts => "compliance_alerts",
        }
    }

    /// The address parameter, for per-address keys.
    pub fn address(&self) -> Option<&str> {
        match self {
            CacheKey::Wallet(address) | CacheKey::Transactions(address) => Some(address),
            CacheKey::Reserve | CacheKey::ComplianceAlerts => None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address() {
            Some(address) => write!(f, "{}:{}", self.kind(), address),
            None => f.write_str(self.kind()),
        }
    }
}

/// An entity (or list) fetched from the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Wallet(Wallet),
    Reserve(Reserve),
    Transactions(Vec<Transaction>),
    ComplianceAlerts(Vec<ComplianceAlert>),
}

impl CacheValue {
    pub fn as_wallet(&self) -> Option<&Wallet> {
        match self {
            CacheValue::Wallet(wallet) => Some(wallet),
            _ => None,
        }
    }

    pub fn as_reserve(&self) -> Option<&Reserve> {
        match self {
            CacheValue::Reserve(reserve) => Some(reserve),
            _ => None,
        }
    }

    pub fn as_transactions(&self) -> Option<&[Transaction]> {
        match self {
            CacheValue::Transactions(transactions) => Some(transactions),
            _ => None,
        }
    }

    pub fn as_alerts(&self) -> Option<&[ComplianceAlert]> {
        match self {
            CacheValue::ComplianceAlerts(alerts) => Some(alerts),
            _ => None,
        }
    }

    pub fn into_wallet(self) -> Option<Wallet> {
        match self {
            CacheValue::Wallet(wallet) => Some(wallet),
            _ => None,
        }
    }

    pub fn into_reserve(self) -> Option<Reserve> {
        match self {
            CacheValue::Reserve(reserve) => Some(reserve),
            _ => None,
        }
    }

    pub fn into_transactions(self) -> Option<Vec<Transaction>> {
        match self {
            CacheValue::Transactions(transactions) => Some(transactions),
            _ => None,
        }
    }

    pub fn into_alerts(self) -> Option<Vec<ComplianceAlert>> {
        match self {
            CacheValue::ComplianceAlerts(alerts) => Some(alerts),
            _ => None,
        }
    }
}
