//! Locale-aware rate parsing.

use crate::error::ParseError;

/// Parse a rate written with either a decimal comma (`"91,23"`) or a
/// decimal point (`"91.23"`).
///
/// Only the first comma is treated as the separator, so `"1,2,3"` is
/// rejected rather than guessed at.
pub fn parse_rate(raw: &str) -> Result<f64, ParseError> {
    let normalized = raw.trim().replacen(',', ".", 1);

    match normalized.parse::<f64>() {
        Ok(rate) if rate.is_finite() => Ok(rate),
        _ => Err(ParseError::InvalidRate {
            raw: raw.to_string(),
        }),
    }
}
