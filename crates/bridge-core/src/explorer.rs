//! Block-explorer link building.

use alloy_primitives::Address;
use bridge_types::{ExplorerLinks, TxHash};

/// Link to a transaction page.
pub fn tx_url(base: &str, hash: &TxHash) -> String {
	format!("{}/tx/{}", base.trim_end_matches('/'), hash.to_hex())
}

/// Link to an address page.
pub fn address_url(base: &str, address: Address) -> String {
	format!("{}/address/{}", base.trim_end_matches('/'), address)
}

/// Link to a token contract page.
pub fn token_url(base: &str, token: Address) -> String {
	format!("{}/token/{}", base.trim_end_matches('/'), token)
}

/// Builds the link set attached to state-changing responses.
pub fn links(
	base: &str,
	hash: &TxHash,
	recipient: Address,
	token: Address,
	delegator: Option<Address>,
) -> ExplorerLinks {
	ExplorerLinks {
		transaction: tx_url(base, hash),
		recipient: address_url(base, recipient),
		token: token_url(base, token),
		delegator: delegator.map(|d| address_url(base, d)),
	}
}
