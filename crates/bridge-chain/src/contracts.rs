//! ABI bindings for the contracts the bridge talks to.
//!
//! Only the functions actually invoked are declared: the ERC-20 surface
//! used for transfers and balance reads, the Chainlink-style aggregator
//! read, and the delegator issuance recording functions.

use alloy_sol_types::sol;

sol! {
	/// Minimal ERC-20 surface (USDT-compatible).
	interface IErc20 {
		function transfer(address to, uint256 value) external returns (bool);
		function balanceOf(address who) external view returns (uint256);
		function decimals() external view returns (uint8);
	}

	/// Chainlink-style price aggregator.
	interface IPriceFeed {
		function latestRoundData()
			external
			view
			returns (
				uint80 roundId,
				int256 answer,
				uint256 startedAt,
				uint256 updatedAt,
				uint80 answeredInRound
			);
	}

	/// Delegator contract recording issuance events. These calls create
	/// accounting records without moving tokens.
	interface IDelegator {
		function emitIssueEvent(address to, uint256 amount) external returns (bytes32);
		function registerIssuance(address to, uint256 amount) external returns (bool);
		function getTotalIssued() external view returns (uint256);
		function getIssuedAmount(address to) external view returns (uint256);
	}
}

/// State-changing delegator methods exposed through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatorMethod {
	/// `emitIssueEvent(address,uint256)`
	EmitIssue,
	/// `registerIssuance(address,uint256)`
	RegisterIssuance,
}

impl DelegatorMethod {
	/// Contract method name, as reported in responses.
	pub fn name(&self) -> &'static str {
		match self {
			DelegatorMethod::EmitIssue => "emitIssueEvent",
			DelegatorMethod::RegisterIssuance => "registerIssuance",
		}
	}
}
