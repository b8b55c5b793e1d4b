//! Plain-text rendering of a [`DashboardSnapshot`].

use std::fmt::Write;

use crate::ledger::types::{TransactionStatus, TransactionType};
use crate::view::format::{format_hkd, format_timestamp, truncate_address};
use crate::view::snapshot::{DashboardSnapshot, Panel};

/// Transactions listed under "Recent Transactions".
const RECENT_TRANSACTIONS: usize = 10;

fn heading<T>(out: &mut String, title: &str, panel: &Panel<T>) {
    match panel.marker() {
        Some(marker) => {
            let _ = writeln!(out, "== {} [{}] ==", title, marker);
        }
        None => {
            let _ = writeln!(out, "== {} ==", title);
        }
    }
}

fn type_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Transfer => "TRANSFER",
        TransactionType::Mint => "MINT",
        TransactionType::Burn => "BURN",
        TransactionType::Freeze => "FREEZE",
        TransactionType::Unfreeze => "UNFREEZE",
    }
}

fn status_label(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Pending => "pending",
        TransactionStatus::Completed => "completed",
        TransactionStatus::Failed => "failed",
        TransactionStatus::Frozen => "frozen",
    }
}

/// Render every panel as text. Stale or failed panels keep their last value
/// and carry a marker in their heading.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    heading(
        &mut out,
        &format!("Wallet {}", truncate_address(&snapshot.address, 6, 4)),
        &snapshot.wallet,
    );
    match &snapshot.wallet.value {
        Some(wallet) => {
            let _ = writeln!(out, "Balance:         {}", format_hkd(wallet.balance));
            let _ = writeln!(out, "KYC Status:      {}", wallet.kyc_status.label());
            if wallet.frozen {
                let _ = writeln!(out, "Status:          FROZEN");
            }
        }
        None => out.push_str("Balance:         -\n"),
    }
    let _ = writeln!(out, "Critical Alerts: {}", snapshot.elevated_alerts());
    if let Some(err) = &snapshot.alerts.last_error {
        let _ = writeln!(out, "  (alerts: {})", err);
    }
    out.push('\n');

    heading(&mut out, "Reserve", &snapshot.reserve);
    match &snapshot.reserve.value {
        Some(reserve) => {
            let status = if reserve.is_fully_backed() { "Fully Backed" } else { "Under-Backed" };
            let _ = writeln!(out, "Total HKD in Circulation: {}", format_hkd(reserve.hkd_balance));
            let _ = writeln!(out, "Last Audit:               {}", format_timestamp(&reserve.last_audit));
            let _ = writeln!(out, "Reserve Status:           {} (ratio {})", status, reserve.reserve_ratio);
            for (asset, amount) in &reserve.assets {
                let _ = writeln!(out, "  {:<24}{}", asset, format_hkd(*amount));
            }
        }
        None => out.push_str("Reserve Status:           N/A\n"),
    }
    out.push('\n');

    heading(&mut out, "Recent Transactions", &snapshot.transactions);
    match snapshot.transactions.value.as_deref() {
        Some([]) => out.push_str("No transactions\n"),
        Some(transactions) => {
            for tx in transactions.iter().take(RECENT_TRANSACTIONS) {
                let _ = writeln!(
                    out,
                    "  {}  {:<8} {} -> {}  {}  {}",
                    format_timestamp(&tx.created_at),
                    type_label(tx.transaction_type),
                    truncate_address(&tx.from_address, 6, 4),
                    truncate_address(&tx.to_address, 6, 4),
                    format_hkd(tx.amount),
                    status_label(tx.status),
                );
            }
        }
        None => out.push_str("-\n"),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, CacheValue, EntityCache};
    use crate::ledger::types::{KycStatus, Reserve, Transaction, Wallet};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn seeded() -> EntityCache {
        let cache = EntityCache::new();
        cache.put(
            CacheKey::wallet("user_xyz789"),
            CacheValue::Wallet(Wallet {
                address: "user_xyz789".into(),
                balance: Decimal::new(125050, 2),
                frozen: false,
                kyc_status: KycStatus::EnhancedVerified,
                created_at: Utc::now(),
            }),
        );
        cache.put(
            CacheKey::Reserve,
            CacheValue::Reserve(Reserve {
                hkd_balance: Decimal::from(1_000_000),
                assets: BTreeMap::from([
                    ("HKD_Cash".to_string(), Decimal::from(600_000)),
                    ("HK_Govt_Bonds".to_string(), Decimal::from(400_000)),
                ]),
                last_audit: Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap(),
                reserve_ratio: Decimal::new(98, 2),
            }),
        );
        cache.put(
            CacheKey::transactions("user_xyz789"),
            CacheValue::Transactions(vec![Transaction {
                id: "tx-1".into(),
                from_address: "user_xyz789".into(),
                to_address: "merchant_abc123".into(),
                amount: Decimal::from(50),
                transaction_type: TransactionType::Transfer,
                status: TransactionStatus::Completed,
                created_at: Utc.with_ymd_and_hms(2025, 1, 16, 10, 15, 0).unwrap(),
                metadata: None,
            }]),
        );
        cache
    }

    #[test]
    fn test_render_full_dashboard() {
        let cache = seeded();
        let text = render_text(&DashboardSnapshot::capture(&cache, "user_xyz789"));

        assert!(text.contains("== Wallet user_x...z789 =="));
        assert!(text.contains("Balance:         HK$1,250.50"));
        assert!(text.contains("KYC Status:      enhanced verified"));
        assert!(text.contains("Reserve Status:           Under-Backed (ratio 0.98)"));
        assert!(text.contains("HK_Govt_Bonds"));
        assert!(text.contains("TRANSFER"));
        assert!(text.contains("user_x...z789 -> mercha...c123  HK$50.00  completed"));
        // Alerts never fetched
        assert!(text.contains("Critical Alerts: 0"));
    }

    #[test]
    fn test_render_marks_stale_panels() {
        let cache = seeded();
        cache.invalidate(&CacheKey::Reserve);
        let text = render_text(&DashboardSnapshot::capture(&cache, "user_xyz789"));

        assert!(text.contains("== Reserve [stale] =="));
        assert!(text.contains("== Wallet user_x...z789 ==\n"));
        // Last known value still shown
        assert!(text.contains("Total HKD in Circulation: HK$1,000,000.00"));
    }

    #[test]
    fn test_render_unknown_wallet() {
        let text = render_text(&DashboardSnapshot::capture(&EntityCache::new(), "nobody"));
        assert!(text.contains("== Wallet nobody [not loaded] =="));
        assert!(text.contains("Reserve Status:           N/A"));
    }
}
