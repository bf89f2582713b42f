//! USD to token conversion arithmetic.
//!
//! Pure function over exact decimals: gross amount at the oracle price,
//! a percentage commission, and the net amount actually transferred.
//! Results are rounded to the token's declared precision using
//! round-half-away-from-zero; the net is derived from the rounded gross
//! and commission, so `net + commission == gross` holds exactly.

use crate::BridgeError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Outcome of a conversion calculation, all values in token units at
/// the token's precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
	/// Token value of the USD amount before fees.
	pub gross: Decimal,
	/// Commission withheld.
	pub commission: Decimal,
	/// Amount transferred to the recipient.
	pub net: Decimal,
}

/// Computes the token amounts for a USD conversion.
///
/// Fails with `Validation` for a non-positive amount or a commission
/// outside `[0, 100)`, and with `InvalidOracleData` for a non-positive
/// oracle price.
pub fn calculate(
	amount_usd: Decimal,
	oracle_price: Decimal,
	commission_percent: Decimal,
	token_decimals: u8,
) -> Result<Conversion, BridgeError> {
	if amount_usd <= Decimal::ZERO {
		return Err(BridgeError::Validation(format!(
			"amount must be positive, got {}",
			amount_usd
		)));
	}
	if commission_percent.is_sign_negative() || commission_percent >= Decimal::from(100) {
		return Err(BridgeError::Validation(format!(
			"commission percent must be in [0, 100), got {}",
			commission_percent
		)));
	}
	if oracle_price <= Decimal::ZERO {
		return Err(BridgeError::InvalidOracleData(format!(
			"oracle price must be positive, got {}",
			oracle_price
		)));
	}

	let scale = token_decimals as u32;
	let gross = (amount_usd * oracle_price)
		.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
	let commission = (gross * commission_percent / Decimal::from(100))
		.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
	let net = gross - commission;

	Ok(Conversion {
		gross,
		commission,
		net,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dec(s: &str) -> Decimal {
		s.parse().unwrap()
	}

	#[test]
	fn reference_scenario() {
		// 100 USD at 1.0002 with a 1% commission
		let conv = calculate(dec("100"), dec("1.0002"), dec("1"), 6).unwrap();
		assert_eq!(conv.gross, dec("100.020000"));
		assert_eq!(conv.commission, dec("1.000200"));
		assert_eq!(conv.net, dec("99.019800"));
	}

	#[test]
	fn net_plus_commission_equals_gross() {
		for (amount, price) in [
			("1", "1.0"),
			("0.01", "0.9998"),
			("123456.789", "1.0031"),
			("7", "3.333333"),
		] {
			let conv = calculate(dec(amount), dec(price), dec("1"), 6).unwrap();
			assert_eq!(conv.net + conv.commission, conv.gross);
		}
	}

	#[test]
	fn calculation_is_deterministic() {
		let a = calculate(dec("42"), dec("1.0002"), dec("1"), 6).unwrap();
		let b = calculate(dec("42"), dec("1.0002"), dec("1"), 6).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn results_fit_token_precision() {
		let conv = calculate(dec("7"), dec("3.333333"), dec("1"), 6).unwrap();
		assert!(conv.gross.scale() <= 6);
		assert!(conv.commission.scale() <= 6);
		assert!(conv.net.scale() <= 6);
	}

	#[test]
	fn zero_commission_transfers_the_full_gross() {
		let conv = calculate(dec("100"), dec("1"), dec("0"), 6).unwrap();
		assert_eq!(conv.commission, Decimal::ZERO);
		assert_eq!(conv.net, dec("100"));
	}

	#[test]
	fn non_positive_amounts_are_rejected() {
		assert!(matches!(
			calculate(dec("0"), dec("1"), dec("1"), 6),
			Err(BridgeError::Validation(_))
		));
		assert!(matches!(
			calculate(dec("-5"), dec("1"), dec("1"), 6),
			Err(BridgeError::Validation(_))
		));
	}

	#[test]
	fn non_positive_oracle_price_is_rejected() {
		assert!(matches!(
			calculate(dec("100"), dec("0"), dec("1"), 6),
			Err(BridgeError::InvalidOracleData(_))
		));
		assert!(matches!(
			calculate(dec("100"), dec("-1.0002"), dec("1"), 6),
			Err(BridgeError::InvalidOracleData(_))
		));
	}

	#[test]
	fn commission_out_of_range_is_rejected() {
		assert!(matches!(
			calculate(dec("100"), dec("1"), dec("100"), 6),
			Err(BridgeError::Validation(_))
		));
		assert!(matches!(
			calculate(dec("100"), dec("1"), dec("-1"), 6),
			Err(BridgeError::Validation(_))
		));
	}

	#[test]
	fn midpoints_round_away_from_zero() {
		// 0.0000005 at the 6-decimal boundary rounds up
		let conv = calculate(dec("0.0000005"), dec("1"), dec("0"), 6).unwrap();
		assert_eq!(conv.gross, dec("0.000001"));
	}
}
