//! Write operations and the cache keys each one makes stale.

use rust_decimal::Decimal;

use crate::cache::CacheKey;
use crate::ledger::types::{BurnRequest, MintRequest, Transaction, TransferRequest};

/// A state-changing request to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Transfer(TransferRequest),
    Mint(MintRequest),
    Burn(BurnRequest),
    Freeze { address: String },
    Unfreeze { address: String },
}

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The ledger recorded a transaction.
    Transaction(Transaction),
    /// The ledger applied the change without returning data.
    Applied,
}

impl Mutation {
    /// Operation name, used in logs and metrics.
    pub fn operation(&self) -> &'static str {
        match self {
            Mutation::Transfer(_) => "transfer",
            Mutation::Mint(_) => "mint",
            Mutation::Burn(_) => "burn",
            Mutation::Freeze { .. } => "freeze",
            Mutation::Unfreeze { .. } => "unfreeze",
        }
    }

    /// Amount moved, for operations that move funds.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Mutation::Transfer(request) => Some(request.amount),
            Mutation::Mint(request) => Some(request.amount),
            Mutation::Burn(request) => Some(request.amount),
            Mutation::Freeze { .. } | Mutation::Unfreeze { .. } => None,
        }
    }

    /// Keys whose cached value no longer reflects the ledger once this succeeds.
    pub fn invalidates(&self) -> Vec<CacheKey> {
        match self {
            Mutation::Transfer(request) => vec![
                CacheKey::wallet(&request.from_address),
                CacheKey::wallet(&request.to_address),
                CacheKey::transactions(&request.from_address),
            ],
            Mutation::Mint(request) => vec![CacheKey::wallet(&request.to_address), CacheKey::Reserve],
            Mutation::Burn(request) => vec![CacheKey::wallet(&request.from_address), CacheKey::Reserve],
            Mutation::Freeze { address } | Mutation::Unfreeze { address } => {
                vec![CacheKey::wallet(address)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_transfer_invalidates_both_wallets_and_sender_history() {
        let mutation = Mutation::Transfer(TransferRequest {
            from_address: "A".into(),
            to_address: "B".into(),
            amount: Decimal::from(100),
            metadata: None,
        });
        assert_eq!(
            mutation.invalidates(),
            vec![CacheKey::wallet("A"), CacheKey::wallet("B"), CacheKey::transactions("A")]
        );
        assert!(!mutation.invalidates().contains(&CacheKey::Reserve));
    }

    #[test]
    fn test_mint_and_burn_touch_reserve() {
        let mint = Mutation::Mint(MintRequest {
            to_address: "B".into(),
            amount: Decimal::from(50),
            asset_backing: BTreeMap::new(),
        });
        assert_eq!(mint.invalidates(), vec![CacheKey::wallet("B"), CacheKey::Reserve]);

        let burn = Mutation::Burn(BurnRequest {
            from_address: "A".into(),
            amount: Decimal::from(50),
        });
        assert_eq!(burn.invalidates(), vec![CacheKey::wallet("A"), CacheKey::Reserve]);
    }

    #[test]
    fn test_freeze_touches_only_the_wallet() {
        let freeze = Mutation::Freeze { address: "A".into() };
        assert_eq!(freeze.invalidates(), vec![CacheKey::wallet("A")]);
        assert_eq!(freeze.amount(), None);
        assert_eq!(Mutation::Unfreeze { address: "A".into() }.operation(), "unfreeze");
    }
}
