//! Decimal amount and hex formatting helpers.
//!
//! Token amounts move between two representations: human-readable
//! decimals (what the API accepts and returns) and integer base units
//! (what contracts take, scaled by 10^decimals). The conversions here
//! are exact; an amount with more fractional digits than the token
//! supports is rejected rather than silently rounded.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from decimal/base-unit conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
	/// Amount is negative and cannot be expressed in base units.
	#[error("amount cannot be negative")]
	Negative,
	/// Amount carries more fractional digits than the token supports.
	#[error("amount has {actual} fractional digits, token supports {max}")]
	PrecisionLoss { actual: u32, max: u32 },
	/// Base-unit value does not fit the decimal representation.
	#[error("base-unit value too large to represent")]
	Overflow,
}

/// Converts a human-readable decimal amount to integer base units.
///
/// The amount must already be rounded to the token's precision;
/// `PrecisionLoss` is returned otherwise so rounding stays an explicit,
/// documented step in the calculator.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256, UnitsError> {
	if amount.is_sign_negative() {
		return Err(UnitsError::Negative);
	}
	let normalized = amount.normalize();
	let scale = normalized.scale();
	if scale > decimals as u32 {
		return Err(UnitsError::PrecisionLoss {
			actual: scale,
			max: decimals as u32,
		});
	}
	// mantissa is non-negative after the sign check above
	let mantissa = normalized.mantissa().unsigned_abs();
	let exponent = decimals as u32 - scale;
	// decimals comes from an untrusted contract; 10^decimals can exceed
	// U256 for values above 77
	let factor = U256::from(10u64)
		.checked_pow(U256::from(exponent))
		.ok_or(UnitsError::Overflow)?;
	U256::from(mantissa)
		.checked_mul(factor)
		.ok_or(UnitsError::Overflow)
}

/// Converts an integer base-unit value back to a human-readable decimal.
pub fn from_base_units(value: U256, decimals: u8) -> Result<Decimal, UnitsError> {
	let raw = u128::try_from(value).map_err(|_| UnitsError::Overflow)?;
	let signed = i128::try_from(raw).map_err(|_| UnitsError::Overflow)?;
	Decimal::try_from_i128_with_scale(signed, decimals as u32).map_err(|_| UnitsError::Overflow)
}

/// Adds a "0x" prefix to a hex string if missing.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a leading "0x"/"0X" from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}
