//! Gas price policy.
//!
//! Both policies observed in the wild here are crude (a fixed price, or
//! the network price times a multiplier), so a hard cap is applied to
//! either one to bound fee overpay.

use bridge_config::{GasConfig, GasPolicy};

const GWEI: u128 = 1_000_000_000;

/// Computes the gas price in wei to submit at.
///
/// `network_price_wei` is only consulted for the multiplier policy; pass
/// zero when the policy is fixed.
pub fn effective_gas_price(config: &GasConfig, network_price_wei: u128) -> u128 {
	let chosen = match config.policy {
		GasPolicy::Fixed => config.fixed_gwei as u128 * GWEI,
		GasPolicy::Multiplier => network_price_wei.saturating_mul(config.multiplier as u128),
	};
	chosen.min(config.max_gwei as u128 * GWEI)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(policy: GasPolicy) -> GasConfig {
		GasConfig {
			policy,
			fixed_gwei: 20,
			multiplier: 5,
			max_gwei: 500,
			limit: 150_000,
		}
	}

	#[test]
	fn fixed_policy_ignores_the_network_price() {
		let cfg = config(GasPolicy::Fixed);
		assert_eq!(effective_gas_price(&cfg, 999 * GWEI), 20 * GWEI);
	}

	#[test]
	fn multiplier_policy_scales_the_network_price() {
		let cfg = config(GasPolicy::Multiplier);
		assert_eq!(effective_gas_price(&cfg, 10 * GWEI), 50 * GWEI);
	}

	#[test]
	fn cap_bounds_both_policies() {
		let cfg = config(GasPolicy::Multiplier);
		// 200 gwei x 5 would exceed the 500 gwei cap
		assert_eq!(effective_gas_price(&cfg, 200 * GWEI), 500 * GWEI);

		let mut fixed = config(GasPolicy::Fixed);
		fixed.fixed_gwei = 1_000;
		assert_eq!(effective_gas_price(&fixed, 0), 500 * GWEI);
	}
}
