//! Core bridge logic.
//!
//! The conversion calculator (pure decimal arithmetic) and the bridge
//! engine that runs the validate -> read -> compute -> submit -> format
//! pipeline behind every endpoint.

use bridge_chain::ChainError;
use bridge_types::{ApiError, UnitsError};
use thiserror::Error;

pub mod calculator;
pub mod engine;
pub mod explorer;

pub use calculator::{calculate, Conversion};
pub use engine::BridgeEngine;

/// Errors the bridge pipeline can produce.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// Missing or malformed input; nothing was sent to the chain.
	#[error("validation error: {0}")]
	Validation(String),
	/// A pre-flight balance check failed; nothing was submitted.
	#[error("insufficient funds: {0}")]
	InsufficientFunds(String),
	/// The oracle reported a non-positive or unusable price.
	#[error("invalid oracle data: {0}")]
	InvalidOracleData(String),
	/// The transaction confirmed but its status flag reports failure.
	/// The hash is included so the caller can inspect it on-chain.
	#[error("transaction {hash} reverted on-chain")]
	TransactionReverted { hash: String },
	/// A chain read, submission, or confirmation wait failed.
	#[error(transparent)]
	Chain(#[from] ChainError),
}

impl From<UnitsError> for BridgeError {
	fn from(err: UnitsError) -> Self {
		BridgeError::Validation(err.to_string())
	}
}

impl From<BridgeError> for ApiError {
	fn from(err: BridgeError) -> Self {
		match err {
			BridgeError::Validation(message) => ApiError::BadRequest {
				error_type: "VALIDATION_ERROR".to_string(),
				message,
			},
			BridgeError::InsufficientFunds(message) => ApiError::UnprocessableEntity {
				error_type: "INSUFFICIENT_FUNDS".to_string(),
				message,
			},
			BridgeError::InvalidOracleData(message) => ApiError::InternalServerError {
				error_type: "INVALID_ORACLE_DATA".to_string(),
				message,
			},
			BridgeError::TransactionReverted { ref hash } => ApiError::InternalServerError {
				error_type: "TRANSACTION_REVERTED".to_string(),
				message: format!("transaction {} reverted on-chain", hash),
			},
			BridgeError::Chain(ChainError::ConfirmationTimeout { .. }) => {
				ApiError::GatewayTimeout {
					error_type: "CONFIRMATION_TIMEOUT".to_string(),
					message: err.to_string(),
				}
			},
			BridgeError::Chain(chain) => ApiError::InternalServerError {
				error_type: "CHAIN_COMMUNICATION_ERROR".to_string(),
				message: chain.to_string(),
			},
		}
	}
}
