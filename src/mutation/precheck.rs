//! Client-side checks run before a mutation is submitted.
//!
//! These only avoid obviously doomed requests. They read whatever the cache
//! holds, fresh or not, and the ledger remains the authority: a stale balance
//! may let a request through that the ledger then rejects.

use rust_decimal::Decimal;

use crate::cache::EntityCache;
use crate::ledger::error::{LedgerError, LedgerResult};
use crate::mutation::plan::Mutation;

/// Reject `mutation` if it cannot succeed given what the cache knows.
pub fn precheck(mutation: &Mutation, cache: &EntityCache) -> LedgerResult<()> {
    if let Some(amount) = mutation.amount() {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation("amount must be positive".to_string()));
        }
    }

    match mutation {
        Mutation::Transfer(request) => {
            if request.to_address.trim().is_empty() {
                return Err(LedgerError::Validation("recipient address is required".to_string()));
            }
            if let Some(wallet) = cache.cached_wallet(&request.from_address) {
                if wallet.frozen {
                    return Err(LedgerError::Conflict("wallet is frozen".to_string()));
                }
                if request.amount > wallet.balance {
                    return Err(LedgerError::Validation("insufficient balance".to_string()));
                }
            }
        }
        Mutation::Mint(request) if request.to_address.trim().is_empty() => {
            return Err(LedgerError::Validation("recipient address is required".to_string()));
        }
        Mutation::Freeze { address } | Mutation::Unfreeze { address } if address.trim().is_empty() => {
            return Err(LedgerError::Validation("wallet address is required".to_string()));
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, CacheValue};
    use crate::ledger::types::{KycStatus, TransferRequest, Wallet};
    use chrono::Utc;

    fn cache_with_wallet(balance: i64, frozen: bool) -> EntityCache {
        let cache = EntityCache::new();
        cache.put(
            CacheKey::wallet("A"),
            CacheValue::Wallet(Wallet {
                address: "A".into(),
                balance: Decimal::from(balance),
                frozen,
                kyc_status: KycStatus::Verified,
                created_at: Utc::now(),
            }),
        );
        cache
    }

    fn transfer(amount: i64) -> Mutation {
        Mutation::Transfer(TransferRequest {
            from_address: "A".into(),
            to_address: "B".into(),
            amount: Decimal::from(amount),
            metadata: None,
        })
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let cache = EntityCache::new();
        assert!(matches!(precheck(&transfer(0), &cache), Err(LedgerError::Validation(_))));
        assert!(matches!(precheck(&transfer(-5), &cache), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_rejects_transfer_above_cached_balance() {
        let cache = cache_with_wallet(1000, false);
        assert_eq!(
            precheck(&transfer(1500), &cache),
            Err(LedgerError::Validation("insufficient balance".into()))
        );
        assert!(precheck(&transfer(1000), &cache).is_ok());
    }

    #[test]
    fn test_stale_balance_still_used() {
        let cache = cache_with_wallet(1000, false);
        cache.invalidate(&CacheKey::wallet("A"));
        assert!(precheck(&transfer(1500), &cache).is_err());
    }

    #[test]
    fn test_unknown_balance_defers_to_ledger() {
        let cache = EntityCache::new();
        assert!(precheck(&transfer(1_000_000), &cache).is_ok());
    }

    #[test]
    fn test_frozen_wallet_is_read_only() {
        let cache = cache_with_wallet(1000, true);
        assert!(matches!(precheck(&transfer(10), &cache), Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn test_freeze_requires_address() {
        let cache = EntityCache::new();
        let freeze = Mutation::Freeze { address: " ".into() };
        assert!(matches!(precheck(&freeze, &cache), Err(LedgerError::Validation(_))));
    }
}
