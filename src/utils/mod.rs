//! Utility functions for formatting and common operations
//!
//! Centralized formatting of rupee amounts for console output. CSV reports
//! use plain `{:.2}` numbers instead so they stay machine-readable.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "₹" prefix (Indian Rupee)
    Inr,
    /// No currency symbol (for table cells, calculations display)
    None,
}

/// Group an integer digit string the Indian way: last three digits, then pairs
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using Indian conventions:
/// - Lakh/crore grouping: `12,34,567`
/// - Decimal separator: `.`
/// - Rounded half away from zero to 2 places
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `width` - Minimum width in characters (0 for no padding, right-aligned)
/// * `symbol` - Whether to include currency symbol
///
/// # Examples
/// ```
/// use mftax::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234567.5), 0, CurrencySymbol::Inr),
///     "₹12,34,567.50"
/// );
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Inr => "₹",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{}.{}", sign, prefix, group_indian(integer_part), decimal_part);

    // ₹ is multi-byte, so pad by characters
    let chars = result.chars().count();
    if width > chars {
        format!("{}{}", " ".repeat(width - chars), result)
    } else {
        result
    }
}

/// Format as rupees with symbol: "₹1,23,456.78"
///
/// # Examples
/// ```
/// use mftax::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(123456.78)), "₹1,23,456.78");
/// assert_eq!(format_currency(dec!(-500)), "-₹500.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::Inr)
}

/// Format number only (no symbol): "1,23,456.78"
pub fn format_amount(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}
