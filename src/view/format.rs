//! Display formatting for amounts, timestamps and addresses.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as Hong Kong dollars with two decimals and thousands separators.
///
/// `1234.5` renders as `HK$1,234.50`; negative amounts carry a leading `-`.
pub fn format_hkd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}HK${}.{}", sign, grouped, fraction)
}

/// Format a timestamp as `15 Jan 2025 14:30` (UTC).
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%d %b %Y %H:%M").to_string()
}

/// Shorten an address to its first `start` and last `end` characters.
///
/// Addresses no longer than `start + end` are returned unchanged.
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= start + end {
        return address.to_string();
    }
    let head: String = chars[..start].iter().collect();
    let tail: String = chars[chars.len() - end..].iter().collect();
    format!("{}...{}", head, tail)
}
