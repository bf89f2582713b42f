//! Transaction hash and receipt types.
//!
//! Thin representations of what the bridge reads back from the chain
//! after submitting a transaction. The full receipt is owned by the
//! chain client; only the fields surfaced in API responses are kept.

use crate::units::with_0x_prefix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
	/// Renders the hash as a 0x-prefixed hex string.
	pub fn to_hex(&self) -> String {
		with_0x_prefix(&hex::encode(self.0))
	}
}

impl fmt::Display for TxHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

/// A transaction accepted by the node, together with the gas price it
/// was submitted at (needed for fee reporting before the receipt lands).
#[derive(Debug, Clone, Copy)]
pub struct SubmittedTx {
	/// Hash assigned by the node.
	pub hash: TxHash,
	/// Effective gas price in wei used for submission.
	pub gas_price_wei: u128,
}

/// Receipt fields read after the transaction confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
	/// The hash of the confirmed transaction.
	pub hash: TxHash,
	/// Block the transaction was included in.
	pub block_number: u64,
	/// Gas consumed by the execution.
	pub gas_used: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}
