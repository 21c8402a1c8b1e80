//! Exact rational arithmetic over token amounts.
//!
//! Fractions enter as `Decimal` (from configuration) or as integer ratios
//! (stake weights) and are lifted into `BigRational` so every product is
//! exact. Only the final rounding step (floor or ceil) leaves the rational
//! domain, and it converts back to `u128` with an overflow check.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use relaysettle_types::{Result, SettlementError};

/// `mantissa / 10^scale`, exactly.
#[must_use]
pub fn decimal_to_ratio(value: Decimal) -> BigRational {
    let numer = BigInt::from(value.mantissa());
    let denom = BigInt::from(10u32).pow(value.scale());
    BigRational::new(numer, denom)
}

/// `numer / denom` as a rational. `denom` must be non-zero.
pub fn ratio(numer: u128, denom: u128) -> Result<BigRational> {
    if denom == 0 {
        return Err(SettlementError::Internal(
            "ratio with zero denominator".to_string(),
        ));
    }
    Ok(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
}

/// Convert a non-negative integral rational back to `u128`.
pub fn to_amount(value: &BigInt, context: &str) -> Result<u128> {
    value
        .to_u128()
        .ok_or_else(|| SettlementError::overflow(context))
}

/// `floor(amount * fraction)`.
pub fn floor_mul(amount: u128, fraction: &BigRational, context: &str) -> Result<u128> {
    let product = BigRational::from_integer(BigInt::from(amount)) * fraction;
    to_amount(&product.floor().to_integer(), context)
}

/// `ceil(amount * fraction)`.
pub fn ceil_mul(amount: u128, fraction: &BigRational, context: &str) -> Result<u128> {
    let product = BigRational::from_integer(BigInt::from(amount)) * fraction;
    to_amount(&product.ceil().to_integer(), context)
}

/// `floor(amount * fraction)` for a configured decimal fraction.
pub fn floor_mul_decimal(amount: u128, fraction: Decimal, context: &str) -> Result<u128> {
    floor_mul(amount, &decimal_to_ratio(fraction), context)
}

/// `ceil(amount * fraction)` for a configured decimal fraction.
pub fn ceil_mul_decimal(amount: u128, fraction: Decimal, context: &str) -> Result<u128> {
    ceil_mul(amount, &decimal_to_ratio(fraction), context)
}

/// Split `value` into its integer floor and the fractional remainder in `[0, 1)`.
#[must_use]
pub fn split_floor(value: &BigRational) -> (BigInt, BigRational) {
    let floor = value.floor();
    let fraction = value - &floor;
    (floor.to_integer(), fraction)
}

/// Checked sum of amounts.
pub fn checked_sum<'a>(amounts: impl IntoIterator<Item = &'a u128>, context: &str) -> Result<u128> {
    amounts
        .into_iter()
        .try_fold(0u128, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| SettlementError::overflow(context))
}
