//! Money
//!
//! Conversions between major-unit decimals (as stored and as quoted by carriers) and the
//! minor-unit [`Money`](rusty_money::Money) values used everywhere else in the crate.

use std::str::FromStr;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::iso::{self, Currency};
use thiserror::Error;

/// Errors raised while converting amounts.
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    /// The amount does not fit in minor units.
    #[error("amount {0} overflows minor units")]
    Overflow(Decimal),

    /// The currency exponent cannot be represented as a decimal scale.
    #[error("currency {0} has an unsupported exponent")]
    Scale(&'static str),

    /// No ISO currency exists for the given code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed")]
    PercentConversion,
}

/// Convert a major-unit amount into minor units for `currency`.
///
/// Rounds half away from zero, so `10.005` BRL becomes `1001`.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] if the amount does not fit in an `i64` of minor units.
pub fn to_minor(amount: Decimal, currency: &Currency) -> Result<i64, AmountError> {
    let scale = 10_i64
        .checked_pow(currency.exponent)
        .ok_or(AmountError::Scale(currency.iso_alpha_code))?;

    amount
        .checked_mul(Decimal::from(scale))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(AmountError::Overflow(amount))
}

/// Convert minor units back into a major-unit amount for `currency`.
///
/// # Errors
///
/// Returns [`AmountError::Scale`] if the currency exponent exceeds the decimal scale limit.
pub fn from_minor(minor: i64, currency: &Currency) -> Result<Decimal, AmountError> {
    Decimal::try_new(minor, currency.exponent)
        .map(|amount| amount.normalize())
        .map_err(|_err| AmountError::Scale(currency.iso_alpha_code))
}

/// Parse a loosely formatted price string such as `"20.00"`, `"20,00"` or `"R$ 1.234,56"`.
///
/// Leading and trailing non-numeric characters (currency symbols, codes) are ignored. When
/// both `.` and `,` appear, whichever comes last is the decimal separator. Returns `None`
/// when nothing numeric remains.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let start = text.find(|c: char| c.is_ascii_digit() || c == '-')?;

    let numeric = text
        .get(start..)?
        .trim_end_matches(|c: char| !c.is_ascii_digit());

    if numeric.is_empty() || numeric == "-" {
        return None;
    }

    let normalised = match (numeric.rfind('.'), numeric.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => numeric.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => numeric.replace(',', ""),
        (None, Some(_)) => numeric.replace(',', "."),
        _ => numeric.to_string(),
    };

    Decimal::from_str(&normalised).ok()
}

/// Look up an ISO currency by its alpha code, case-insensitively.
///
/// # Errors
///
/// Returns [`AmountError::UnknownCurrency`] if the code is not an ISO currency.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, AmountError> {
    iso::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| AmountError::UnknownCurrency(code.to_string()))
}

/// Calculate a percentage of a minor unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`AmountError::PercentConversion`] if the result does not fit in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, AmountError> {
    ((*percent) * Decimal::ONE)
        .checked_mul(Decimal::from(minor))
        .ok_or(AmountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::PercentConversion)
}
