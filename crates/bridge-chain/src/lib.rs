//! Chain client adapter for the USDT bridge.
//!
//! Wraps the Alloy library behind the handful of operations the bridge
//! needs: native and token balance reads, price-feed reads, delegator
//! reads, and signed contract-call submission with confirmation
//! monitoring. Submissions sharing the signer are serialized to avoid
//! nonce races, and confirmation waits are bounded by a configured
//! timeout.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use bridge_types::{SubmittedTx, TxHash, TxReceipt};
use thiserror::Error;

mod client;
mod contracts;
mod gas;

pub use client::{ChainClient, OracleRound};
pub use contracts::DelegatorMethod;
pub use gas::effective_gas_price;

/// Trait defining the chain operations the bridge engine depends on.
///
/// [`ChainClient`] is the production implementation; the seam exists so
/// the engine pipeline can be exercised against a fake chain in tests.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	/// Address of the configured signer.
	fn signer_address(&self) -> Address;

	/// Native-currency balance of an address, in wei.
	async fn native_balance(&self, address: Address) -> Result<U256, ChainError>;

	/// ERC-20 token balance of an address, in base units.
	async fn token_balance(&self, token: Address, who: Address) -> Result<U256, ChainError>;

	/// Declared decimal precision of the token contract.
	async fn token_decimals(&self, token: Address) -> Result<u8, ChainError>;

	/// Latest round of the price feed, scaled to a decimal price.
	async fn latest_round(&self, feed: Address) -> Result<OracleRound, ChainError>;

	/// Cumulative issued amount recorded by a delegator, in base units.
	async fn total_issued(&self, delegator: Address) -> Result<U256, ChainError>;

	/// Amount recorded for one recipient by a delegator, in base units.
	async fn issued_amount(&self, delegator: Address, to: Address) -> Result<U256, ChainError>;

	/// Submits an ERC-20 `transfer` on the token contract.
	async fn transfer_token(
		&self,
		token: Address,
		to: Address,
		amount: U256,
	) -> Result<SubmittedTx, ChainError>;

	/// Submits one of the state-changing delegator methods.
	async fn delegator_call(
		&self,
		delegator: Address,
		method: DelegatorMethod,
		to: Address,
		amount: U256,
	) -> Result<SubmittedTx, ChainError>;

	/// Waits for the configured number of confirmations, bounded by the
	/// configured timeout. A reverted receipt is returned, not an error;
	/// the caller decides how to surface it.
	async fn wait_for_confirmation(&self, hash: &TxHash) -> Result<TxReceipt, ChainError>;
}

/// Errors that can occur while talking to the chain.
#[derive(Debug, Error)]
pub enum ChainError {
	/// RPC or transport failure. Not retried.
	#[error("chain communication error: {0}")]
	Network(String),
	/// The configured signing credential could not be parsed.
	#[error("invalid signing key: {0}")]
	InvalidKey(String),
	/// The confirmation wait exceeded its configured bound. The
	/// transaction may still confirm later; the hash is kept so the
	/// caller can inspect it on-chain.
	#[error("transaction {hash} not confirmed after {waited_secs}s")]
	ConfirmationTimeout { hash: String, waited_secs: u64 },
}
