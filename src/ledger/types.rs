//! Wire types exchanged with the remote ledger.
//!
//! Field names are camelCase and enum values SCREAMING_SNAKE_CASE on the wire.
//! Amounts are decimals in the account's fiat unit (HKD), serialized as JSON numbers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// KYC level of a wallet holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
    /// Unlocks higher transaction limits at the ledger.
    EnhancedVerified,
}

impl KycStatus {
    /// Human readable label ("enhanced verified").
    pub fn label(&self) -> &'static str {
        match self {
            KycStatus::Pending => "pending",
            KycStatus::Verified => "verified",
            KycStatus::Rejected => "rejected",
            KycStatus::EnhancedVerified => "enhanced verified",
        }
    }
}

/// A custodial wallet as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: String,
    pub balance: Decimal,
    /// A frozen wallet cannot send funds.
    pub frozen: bool,
    pub kyc_status: KycStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Transfer,
    Mint,
    Burn,
    Freeze,
    Unfreeze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    /// Held by a regulatory freeze.
    Frozen,
}

/// Optional free-form annotations on a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory_approval_id: Option<String>,
}

/// A ledger transaction. Only the ledger changes its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Not meaningful for mints.
    #[serde(default)]
    pub from_address: String,
    /// Not meaningful for burns.
    #[serde(default)]
    pub to_address: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TransactionMetadata>,
}

/// The reserve backing the circulating supply. There is exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reserve {
    pub hkd_balance: Decimal,
    /// Asset name -> amount held.
    #[serde(default)]
    pub assets: BTreeMap<String, Decimal>,
    pub last_audit: DateTime<Utc>,
    pub reserve_ratio: Decimal,
}

impl Reserve {
    /// A ratio of 1.0 or more means circulation is fully backed.
    pub fn is_fully_backed(&self) -> bool {
        self.reserve_ratio >= Decimal::ONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Suspicious activity flagged by the compliance engine. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAlert {
    pub id: String,
    pub wallet_address: String,
    pub activity_type: String,
    pub description: String,
    pub detected_at: DateTime<Utc>,
    pub severity: SeverityLevel,
}

impl ComplianceAlert {
    /// High and critical alerts are surfaced on the dashboard overview.
    pub fn is_elevated(&self) -> bool {
        self.severity >= SeverityLevel::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_address: String,
    pub to_address: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TransactionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub to_address: String,
    pub amount: Decimal,
    /// Assets deposited into the reserve to back the new supply.
    #[serde(default)]
    pub asset_backing: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRequest {
    pub from_address: String,
    pub amount: Decimal,
}

/// Envelope wrapping every ledger response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Envelope shape used when only the message matters (errors, void calls).
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
