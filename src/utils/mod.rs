//! Utility functions for formatting and input parsing
//!
//! This module provides centralized formatting utilities for consistent
//! display of money and percentages, plus the date and currency parsing
//! shared by the CLI and the store.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{Result, TallyError};

/// Exclusive upper bound on the magnitude of a stored balance
pub const MAX_BALANCE_MAGNITUDE: i64 = 1_000_000_000_000_000;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol<'a> {
    /// Symbol (or code) prefix derived from an ISO currency code
    Code(&'a str),
    /// No currency symbol (for table cells and CSV-like output)
    None,
}

fn symbol_for(code: &str) -> String {
    match code {
        "GBP" => "£".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        other => format!("{} ", other),
    }
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using UK conventions:
/// - Thousands separator: `,`
/// - Decimal separator: `.`
///
/// # Examples
/// ```
/// use tally::utils::{format_money_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_money_with_width(dec!(1234.56), 0, CurrencySymbol::Code("GBP")),
///     "£1,234.56"
/// );
///
/// assert_eq!(
///     format_money_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_money_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let abs_value = value.abs().round_dp(2);

    let formatted = format!("{:.2}", abs_value);
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative && !abs_value.is_zero() {
        "-"
    } else {
        ""
    };
    let prefix = match symbol {
        CurrencySymbol::Code(code) => symbol_for(code),
        CurrencySymbol::None => String::new(),
    };

    let result = format!("{}{}{}.{}", sign, prefix, with_separators, decimal_part);

    if width > 0 && result.chars().count() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format with the symbol of the given currency: "£1,234.56"
///
/// # Examples
/// ```
/// use tally::utils::format_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_money(dec!(1234.5), "GBP"), "£1,234.50");
/// assert_eq!(format_money(dec!(-500), "GBP"), "-£500.00");
/// assert_eq!(format_money(dec!(10), "CHF"), "CHF 10.00");
/// ```
pub fn format_money(value: Decimal, currency: &str) -> String {
    format_money_with_width(value, 0, CurrencySymbol::Code(currency))
}

/// Format a number with separators but no symbol: "1,234.56"
pub fn format_amount(value: Decimal) -> String {
    format_money_with_width(value, 0, CurrencySymbol::None)
}

/// Format a change with an explicit sign: "+£100.00" / "-£25.00"
pub fn format_signed_money(value: Decimal, currency: &str) -> String {
    if value > Decimal::ZERO {
        format!("+{}", format_money(value, currency))
    } else {
        format_money(value, currency)
    }
}

/// Format a percentage already scaled to 0-100: "12.5%"
pub fn format_percent(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{:.1}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// Parse a calendar date in `YYYY-MM-DD` form
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        TallyError::ValidationError(format!("invalid date '{}', expected YYYY-MM-DD", s)).into()
    })
}

/// Parse a balance amount, accepting thousands separators and a leading currency sign
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '£' | '$' | '€' | ' '))
        .collect();
    let amount = cleaned
        .parse::<Decimal>()
        .map_err(|_| TallyError::ValidationError(format!("invalid amount '{}'", s)))?;
    check_balance(amount)
}

/// Balances must stay below 10^15 in magnitude so sums across accounts never overflow
pub fn check_balance(amount: Decimal) -> Result<Decimal> {
    if amount.abs() >= Decimal::from(MAX_BALANCE_MAGNITUDE) {
        return Err(TallyError::ValidationError(format!(
            "balance {} is out of range; amounts must be below 1,000,000,000,000,000",
            amount
        ))
        .into());
    }
    Ok(amount)
}

/// Normalise an ISO-4217 style currency code ("gbp" -> "GBP")
pub fn normalize_currency(code: &str) -> Result<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(TallyError::ValidationError(format!(
            "invalid currency code '{}', expected three letters like GBP",
            code
        ))
        .into());
    }
    Ok(code)
}
