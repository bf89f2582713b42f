//! HTTP API types for the bridge service.
//!
//! Request and response bodies for the bridge endpoints, plus the
//! uniform error envelope every failure is converted to at the handler
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for POST /bridge/convert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
	/// USD amount to convert, as a decimal string.
	pub amount_usd: String,
	/// Address receiving the token transfer.
	pub recipient_address: String,
}

/// Request body for POST /bridge/emit-issue and /bridge/register-issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
	/// Token amount, as a decimal string in human units.
	pub amount: String,
	/// Address the issuance is credited to.
	pub recipient_address: String,
	/// Delegator contract recording the issuance.
	pub delegator_address: String,
}

/// Transaction metadata common to every state-changing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
	/// Transaction hash, 0x-prefixed.
	pub hash: String,
	/// Signer address the transaction was sent from.
	pub from: String,
	/// Contract the transaction was sent to.
	pub to: String,
	/// Contract method that was invoked.
	pub method: String,
	/// Block the transaction confirmed in.
	pub block_number: u64,
	/// "Success" or "Failed" per the receipt status flag.
	pub status: String,
	/// Gas consumed, as reported by the receipt.
	pub gas_used: u64,
	/// Gas price the transaction was submitted at, in gwei.
	pub gas_price_gwei: String,
	/// Confirmations waited for before responding.
	pub confirmations: u64,
	/// RFC 3339 timestamp of when the receipt was observed.
	pub timestamp: String,
}

/// Block-explorer links attached to responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerLinks {
	/// Link to the transaction page.
	pub transaction: String,
	/// Link to the recipient address page.
	pub recipient: String,
	/// Link to the token contract page.
	pub token: String,
	/// Link to the delegator contract page, for delegator operations.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delegator: Option<String>,
}

/// Response body for POST /bridge/convert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
	pub success: bool,
	/// USD amount that was converted.
	pub amount_usd: String,
	/// Net token amount transferred after commission.
	pub amount_token_net: String,
	/// Commission withheld, in token units.
	pub commission: String,
	/// Oracle price the conversion was computed at.
	pub oracle_price: String,
	pub recipient: String,
	pub transaction: TransactionSummary,
	pub explorer: ExplorerLinks,
}

/// Response body for the two delegator issuance endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
	pub success: bool,
	/// Delegator method that was invoked.
	pub method: String,
	/// Issued amount in human token units.
	pub amount: String,
	pub recipient: String,
	pub delegator: String,
	/// Cumulative amount the delegator has recorded for this recipient,
	/// read back after the transaction confirmed.
	pub recipient_issued: String,
	pub transaction: TransactionSummary,
	pub explorer: ExplorerLinks,
}

/// Response body for GET /bridge/status/{delegatorAddress}.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
	pub success: bool,
	pub delegator_address: String,
	/// Cumulative issued amount in human token units.
	pub total_issued: String,
	pub timestamp: String,
}

/// Response body for GET /bridge/balance/{address}.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
	pub success: bool,
	pub address: String,
	/// Token balance in human units.
	pub balance: String,
	pub token: String,
}

/// Response body for GET /bridge/price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
	pub success: bool,
	/// Latest oracle price, USD per token.
	pub price: String,
	/// Unix timestamp the feed last updated at.
	pub updated_at: u64,
	/// Price feed contract address.
	pub feed: String,
}

/// Uniform JSON failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
	pub success: bool,
	/// Human-readable description.
	pub error: String,
	/// Machine-readable error category.
	#[serde(rename = "type")]
	pub error_type: String,
}

/// Structured API error with HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed or missing input; nothing was submitted (400).
	BadRequest { error_type: String, message: String },
	/// Pre-flight balance check failed; nothing was submitted (422).
	UnprocessableEntity { error_type: String, message: String },
	/// Confirmation wait exceeded the configured bound (504).
	GatewayTimeout { error_type: String, message: String },
	/// Chain communication or execution failure (500).
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	/// HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::UnprocessableEntity { .. } => 422,
			ApiError::GatewayTimeout { .. } => 504,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Converts to the uniform JSON envelope.
	pub fn to_error_body(&self) -> ErrorBody {
		let (error_type, message) = match self {
			ApiError::BadRequest {
				error_type,
				message,
			}
			| ApiError::UnprocessableEntity {
				error_type,
				message,
			}
			| ApiError::GatewayTimeout {
				error_type,
				message,
			}
			| ApiError::InternalServerError {
				error_type,
				message,
			} => (error_type.clone(), message.clone()),
		};
		ErrorBody {
			success: false,
			error: message,
			error_type,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			}
			ApiError::GatewayTimeout { message, .. } => {
				write!(f, "Gateway Timeout: {}", message)
			}
			ApiError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status =
			StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_body())).into_response()
	}
}
