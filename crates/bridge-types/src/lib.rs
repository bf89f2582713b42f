//! Common types for the USDT bridge service.
//!
//! This crate defines the data types shared across the bridge crates:
//! transaction hashes and receipts, the secret wrapper used for signing
//! credentials, decimal/base-unit conversion helpers, and the HTTP API
//! request/response surface.

/// API request/response types and the HTTP error envelope.
pub mod api;
/// Secure wrapper for signing credentials.
pub mod secret_string;
/// Transaction hash and receipt types.
pub mod tx;
/// Decimal amount and hex formatting helpers.
pub mod units;

pub use api::*;
pub use secret_string::SecretString;
pub use tx::{SubmittedTx, TxHash, TxReceipt};
pub use units::{from_base_units, to_base_units, with_0x_prefix, without_0x_prefix, UnitsError};
