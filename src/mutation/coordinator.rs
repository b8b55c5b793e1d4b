//! Mutation execution and post-success invalidation.

use std::future::Future;
use std::sync::Arc;

use crate::cache::EntityCache;
use crate::ledger::client::LedgerApi;
use crate::ledger::error::LedgerResult;
use crate::ledger::types::{BurnRequest, MintRequest, Transaction, TransferRequest};
use crate::mutation::plan::{Mutation, MutationOutcome};
use crate::mutation::precheck::precheck;
use crate::observability::metrics;

/// Submits writes to the ledger and marks affected cache keys stale.
///
/// Keys are invalidated only after the ledger confirms the write. The
/// returned transaction is handed to the caller and never written into the
/// cache; the next read refetches authoritative state instead.
#[derive(Clone)]
pub struct MutationCoordinator {
    api: Arc<dyn LedgerApi>,
    cache: EntityCache,
}

impl MutationCoordinator {
    pub fn new(api: Arc<dyn LedgerApi>, cache: EntityCache) -> Self {
        Self { api, cache }
    }

    pub async fn transfer(&self, request: TransferRequest) -> LedgerResult<Transaction> {
        let mutation = Mutation::Transfer(request.clone());
        self.run(&mutation, self.api.transfer(&request)).await
    }

    pub async fn mint(&self, request: MintRequest) -> LedgerResult<Transaction> {
        let mutation = Mutation::Mint(request.clone());
        self.run(&mutation, self.api.mint(&request)).await
    }

    pub async fn burn(&self, request: BurnRequest) -> LedgerResult<Transaction> {
        let mutation = Mutation::Burn(request.clone());
        self.run(&mutation, self.api.burn(&request)).await
    }

    pub async fn freeze(&self, address: &str) -> LedgerResult<()> {
        let mutation = Mutation::Freeze {
            address: address.to_string(),
        };
        self.run(&mutation, self.api.freeze_wallet(address)).await
    }

    pub async fn unfreeze(&self, address: &str) -> LedgerResult<()> {
        let mutation = Mutation::Unfreeze {
            address: address.to_string(),
        };
        self.run(&mutation, self.api.unfreeze_wallet(address)).await
    }

    /// Execute any mutation.
    pub async fn execute(&self, mutation: Mutation) -> LedgerResult<MutationOutcome> {
        match mutation {
            Mutation::Transfer(request) => self.transfer(request).await.map(MutationOutcome::Transaction),
            Mutation::Mint(request) => self.mint(request).await.map(MutationOutcome::Transaction),
            Mutation::Burn(request) => self.burn(request).await.map(MutationOutcome::Transaction),
            Mutation::Freeze { address } => self.freeze(&address).await.map(|()| MutationOutcome::Applied),
            Mutation::Unfreeze { address } => {
                self.unfreeze(&address).await.map(|()| MutationOutcome::Applied)
            }
        }
    }

    /// Precheck, submit (never retried), then invalidate on success.
    ///
    /// `submit` is not polled when the precheck fails, so no request is sent.
    async fn run<T>(
        &self,
        mutation: &Mutation,
        submit: impl Future<Output = LedgerResult<T>>,
    ) -> LedgerResult<T> {
        let operation = mutation.operation();

        if let Err(err) = precheck(mutation, &self.cache) {
            tracing::info!(operation, error = %err, "Mutation rejected before submission");
            metrics::record_mutation(operation, "rejected");
            return Err(err);
        }

        match submit.await {
            Ok(value) => {
                let keys = mutation.invalidates();
                for key in &keys {
                    self.cache.invalidate(key);
                }
                tracing::info!(
                    operation,
                    invalidated = keys.len(),
                    "Mutation committed, affected keys marked stale"
                );
                metrics::record_mutation(operation, "ok");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(operation, error = %err, "Mutation failed at ledger");
                metrics::record_mutation(operation, err.kind());
                Err(err)
            }
        }
    }
}
