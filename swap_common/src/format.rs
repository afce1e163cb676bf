//! Presentation helpers for amounts and rates.
//!
//! Rounding here is display-only; values fed back into evaluation always come
//! from the raw `f64`s, never from these strings.
use crate::config::{AMOUNT_DECIMALS, RATE_DECIMALS};
use crate::quote::Quote;

/// Renders `value` with at most `max_decimals` fractional digits, trailing
/// zeros removed. Non-finite values render as `0`.
pub fn format_decimal(value: f64, max_decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", max_decimals, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Amount or balance, 6 decimal places at most.
pub fn format_amount(value: f64) -> String {
    format_decimal(value, AMOUNT_DECIMALS)
}

/// Exchange rate, 8 decimal places at most.
pub fn format_rate(value: f64) -> String {
    format_decimal(value, RATE_DECIMALS)
}

/// `1 FROM ≈ rate TO · 1 TO ≈ inverse FROM`
pub fn rate_line(quote: &Quote) -> String {
    format!(
        "1 {from} ≈ {} {to} · 1 {to} ≈ {} {from}",
        format_rate(quote.rate),
        format_rate(quote.inverse_rate),
        from = quote.from,
        to = quote.to,
    )
}
