//! In-memory ledger for unit tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::ledger::client::LedgerApi;
use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::types::{
    BurnRequest, ComplianceAlert, KycStatus, MintRequest, Reserve, Transaction, TransactionStatus,
    TransactionType, TransferRequest, Wallet,
};

/// Records calls and serves canned data.
#[derive(Default)]
pub(crate) struct FakeLedger {
    pub wallets: DashMap<String, Wallet>,
    pub reserve_balance: Mutex<Decimal>,
    /// Error returned by the next mutation, if set.
    pub fail_next_mutation: Mutex<Option<LedgerError>>,
    /// Artificial latency applied to every read.
    pub read_delay: Mutex<Duration>,
    pub calls: DashMap<&'static str, usize>,
    pub mutations: AtomicUsize,
}

impl FakeLedger {
    pub fn with_wallet(address: &str, balance: i64) -> Self {
        let ledger = Self::default();
        ledger.add_wallet(address, balance);
        ledger
    }

    pub fn add_wallet(&self, address: &str, balance: i64) {
        self.wallets.insert(
            address.to_string(),
            Wallet {
                address: address.to_string(),
                balance: Decimal::from(balance),
                frozen: false,
                kyc_status: KycStatus::Verified,
                created_at: Utc::now(),
            },
        );
    }

    pub fn calls(&self, operation: &'static str) -> usize {
        self.calls.get(operation).map(|count| *count).unwrap_or(0)
    }

    fn record(&self, operation: &'static str) {
        *self.calls.entry(operation).or_insert(0) += 1;
    }

    async fn read_latency(&self) {
        let delay = *self.read_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn begin_mutation(&self, operation: &'static str) -> LedgerResult<()> {
        self.record(operation);
        self.mutations.fetch_add(1, Ordering::SeqCst);
        match self.fail_next_mutation.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn adjust(&self, address: &str, delta: Decimal) -> LedgerResult<()> {
        let mut wallet = self
            .wallets
            .get_mut(address)
            .ok_or_else(|| LedgerError::NotFound(format!("wallet {}", address)))?;
        if wallet.frozen && delta < Decimal::ZERO {
            return Err(LedgerError::Conflict("Wallet is frozen".into()));
        }
        if wallet.balance + delta < Decimal::ZERO {
            return Err(LedgerError::Conflict("Insufficient balance".into()));
        }
        wallet.balance += delta;
        Ok(())
    }

    fn transaction(kind: TransactionType, from: &str, to: &str, amount: Decimal) -> Transaction {
        Transaction {
            id: format!("tx-{}", uuid::Uuid::new_v4()),
            from_address: from.to_string(),
            to_address: to.to_string(),
            amount,
            transaction_type: kind,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
            metadata: None,
        }
    }
}

#[async_trait]
impl LedgerApi for FakeLedger {
    async fn get_wallet(&self, address: &str) -> LedgerResult<Wallet> {
        self.record("get_wallet");
        self.read_latency().await;
        self.wallets
            .get(address)
            .map(|wallet| wallet.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("wallet {}", address)))
    }

    async fn create_wallet(&self, kyc: &serde_json::Value) -> LedgerResult<Wallet> {
        self.record("create_wallet");
        let address = kyc
            .get("address")
            .and_then(|a| a.as_str())
            .ok_or_else(|| LedgerError::Validation("address missing".into()))?;
        self.add_wallet(address, 0);
        self.get_wallet(address).await
    }

    async fn transfer(&self, request: &TransferRequest) -> LedgerResult<Transaction> {
        self.begin_mutation("transfer")?;
        self.adjust(&request.from_address, -request.amount)?;
        self.adjust(&request.to_address, request.amount)?;
        Ok(Self::transaction(
            TransactionType::Transfer,
            &request.from_address,
            &request.to_address,
            request.amount,
        ))
    }

    async fn mint(&self, request: &MintRequest) -> LedgerResult<Transaction> {
        self.begin_mutation("mint")?;
        self.adjust(&request.to_address, request.amount)?;
        *self.reserve_balance.lock().unwrap() += request.amount;
        Ok(Self::transaction(TransactionType::Mint, "", &request.to_address, request.amount))
    }

    async fn burn(&self, request: &BurnRequest) -> LedgerResult<Transaction> {
        self.begin_mutation("burn")?;
        self.adjust(&request.from_address, -request.amount)?;
        *self.reserve_balance.lock().unwrap() -= request.amount;
        Ok(Self::transaction(TransactionType::Burn, &request.from_address, "", request.amount))
    }

    async fn get_transactions(&self, _address: &str, _limit: u32) -> LedgerResult<Vec<Transaction>> {
        self.record("get_transactions");
        self.read_latency().await;
        Ok(Vec::new())
    }

    async fn get_reserve(&self) -> LedgerResult<Reserve> {
        self.record("get_reserve");
        self.read_latency().await;
        let balance = *self.reserve_balance.lock().unwrap();
        Ok(Reserve {
            hkd_balance: balance,
            assets: BTreeMap::from([("HKD_Cash".to_string(), balance)]),
            last_audit: Utc::now(),
            reserve_ratio: Decimal::ONE,
        })
    }

    async fn get_compliance_alerts(&self) -> LedgerResult<Vec<ComplianceAlert>> {
        self.record("get_compliance_alerts");
        self.read_latency().await;
        Ok(Vec::new())
    }

    async fn freeze_wallet(&self, address: &str) -> LedgerResult<()> {
        self.begin_mutation("freeze")?;
        let mut wallet = self
            .wallets
            .get_mut(address)
            .ok_or_else(|| LedgerError::NotFound(format!("wallet {}", address)))?;
        wallet.frozen = true;
        Ok(())
    }

    async fn unfreeze_wallet(&self, address: &str) -> LedgerResult<()> {
        self.begin_mutation("unfreeze")?;
        let mut wallet = self
            .wallets
            .get_mut(address)
            .ok_or_else(|| LedgerError::NotFound(format!("wallet {}", address)))?;
        wallet.frozen = false;
        Ok(())
    }
}
