use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{One, Signed, Zero};
use std::num::NonZeroU64;
use std::str::FromStr;

/// Significant digits kept through rate exponentiation
pub const WAD_PRECISION: u64 = 78;

/// Convert a raw on-chain integer into an exact decimal
pub fn u256_to_decimal(value: &U256) -> BigDecimal {
    BigDecimal::new(BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>()), 0)
}

/// `10^exponent` as an exact decimal
pub fn ten_pow(exponent: i64) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -exponent)
}

/// Scale a raw token amount down by its decimals
pub fn format_units(raw: &U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(BigInt::from_bytes_be(Sign::Plus, &raw.to_be_bytes::<32>()), decimals as i64)
}

/// Scale a human amount up to the raw integer, dropping sub-unit dust
pub fn parse_units(amount: &BigDecimal, decimals: u8) -> Result<U256, String> {
    if amount.is_negative() {
        return Err("Amount cannot be negative".to_string());
    }

    let scaled = (amount * ten_pow(decimals as i64)).with_scale(0);
    let (int_val, _) = scaled.as_bigint_and_exponent();

    U256::from_str(&int_val.to_string())
        .map_err(|e| format!("Amount does not fit in uint256: {}", e))
}

/// Truncate (round toward zero) to `places` decimal places
pub fn to_fixed(value: &BigDecimal, places: i64) -> BigDecimal {
    value.with_scale(places)
}

/// Truncate to at most `digits` significant digits
pub fn truncate_significant(value: &BigDecimal, digits: u64) -> BigDecimal {
    let (int_val, scale) = value.as_bigint_and_exponent();
    let len = int_val.magnitude().to_string().len() as u64;

    if len <= digits {
        return value.clone();
    }

    let excess = len - digits;
    value.with_scale(scale - excess as i64)
}

/// Round to `digits` significant digits for presentation
pub fn round_significant(value: &BigDecimal, digits: u64) -> BigDecimal {
    if value.is_zero() {
        return BigDecimal::zero();
    }
    let digits = NonZeroU64::new(digits).unwrap_or(NonZeroU64::MIN);
    value.with_precision_round(digits, RoundingMode::HalfUp)
}

/// `base^exp` by repeated squaring, truncating every intermediate to
/// `precision` significant digits
pub fn pow_round_down(base: &BigDecimal, exp: u64, precision: u64) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut square = truncate_significant(base, precision);
    let mut remaining = exp;

    while remaining > 0 {
        if remaining & 1 == 1 {
            result = truncate_significant(&(&result * &square), precision);
        }
        remaining >>= 1;
        if remaining > 0 {
            square = truncate_significant(&(&square * &square), precision);
        }
    }

    result
}
