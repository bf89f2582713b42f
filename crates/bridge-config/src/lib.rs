//! Configuration for the USDT bridge service.
//!
//! Loads a TOML configuration file, resolves `${VAR}` / `${VAR:-default}`
//! environment-variable references before parsing, and validates the
//! result at startup. Every external collaborator (RPC endpoint, signing
//! credential, contract addresses, fee and gas policy) lives here; none
//! of them may appear as literals in code.

use alloy_primitives::Address;
use bridge_types::SecretString;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message without the full input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration for the bridge service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Chain endpoint and explorer settings.
	pub chain: ChainConfig,
	/// Signing credential.
	pub account: AccountConfig,
	/// Contract addresses the bridge talks to.
	pub contracts: ContractsConfig,
	/// Commission settings for the USD conversion.
	pub fees: FeesConfig,
	/// Gas price policy and limit.
	#[serde(default)]
	pub gas: GasConfig,
	/// Submission and confirmation settings.
	#[serde(default)]
	pub submission: SubmissionConfig,
	/// HTTP API server settings.
	#[serde(default)]
	pub api: ApiConfig,
}

/// Chain endpoint and explorer settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// JSON-RPC endpoint URL. Supplied via environment, never a literal.
	pub rpc_url: String,
	/// Chain ID transactions are signed for.
	pub chain_id: u64,
	/// Block-explorer base URL used for link building.
	#[serde(default = "default_explorer_url")]
	pub explorer_url: String,
}

/// Signing credential configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Signer private key. Supplied via environment, redacted everywhere.
	pub private_key: SecretString,
}

/// Contract addresses the bridge interacts with.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractsConfig {
	/// ERC-20 token contract address.
	pub token: String,
	/// Price-feed oracle contract address.
	pub price_feed: String,
}

/// Commission settings for the USD conversion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeesConfig {
	/// Commission percentage withheld from conversions, in `[0, 100)`.
	pub commission_percent: Decimal,
}

/// How the gas price for submissions is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GasPolicy {
	/// Submit at a fixed gwei price.
	Fixed,
	/// Submit at the current network price times a multiplier.
	Multiplier,
}

/// Gas price policy and limit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GasConfig {
	/// Which pricing policy to apply.
	pub policy: GasPolicy,
	/// Gas price in gwei when the policy is `fixed`.
	#[serde(default = "default_fixed_gwei")]
	pub fixed_gwei: u64,
	/// Multiplier over the network price when the policy is `multiplier`.
	#[serde(default = "default_multiplier")]
	pub multiplier: u64,
	/// Hard cap in gwei applied to either policy.
	#[serde(default = "default_max_gwei")]
	pub max_gwei: u64,
	/// Gas limit for contract calls.
	#[serde(default = "default_gas_limit")]
	pub limit: u64,
}

impl Default for GasConfig {
	fn default() -> Self {
		Self {
			policy: GasPolicy::Multiplier,
			fixed_gwei: default_fixed_gwei(),
			multiplier: default_multiplier(),
			max_gwei: default_max_gwei(),
			limit: default_gas_limit(),
		}
	}
}

/// Submission and confirmation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionConfig {
	/// Confirmations to wait for before responding.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	/// Upper bound on the confirmation wait, in seconds.
	#[serde(default = "default_confirmation_timeout")]
	pub confirmation_timeout_secs: u64,
	/// Minimum native balance (in ETH) the signer must hold for gas.
	#[serde(default = "default_min_native_balance")]
	pub min_native_balance_eth: Decimal,
}

impl Default for SubmissionConfig {
	fn default() -> Self {
		Self {
			confirmations: default_confirmations(),
			confirmation_timeout_secs: default_confirmation_timeout(),
			min_native_balance_eth: default_min_native_balance(),
		}
	}
}

/// HTTP API server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			timeout_seconds: default_api_timeout(),
		}
	}
}

fn default_explorer_url() -> String {
	"https://etherscan.io".to_string()
}

fn default_fixed_gwei() -> u64 {
	20
}

fn default_multiplier() -> u64 {
	5
}

fn default_max_gwei() -> u64 {
	500
}

fn default_gas_limit() -> u64 {
	150_000
}

fn default_confirmations() -> u64 {
	1
}

fn default_confirmation_timeout() -> u64 {
	300
}

fn default_min_native_balance() -> Decimal {
	// 0.01 ETH gas reserve
	Decimal::new(1, 2)
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	// Must leave room for a full confirmation wait
	330
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, supporting
/// defaults with `${VAR_NAME:-default_value}`. Input is size-limited to
/// keep the regex pass bounded.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply in reverse so earlier positions stay valid
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

fn validate_address(value: &str, field: &str) -> Result<(), ConfigError> {
	Address::from_str(value).map_err(|_| {
		ConfigError::Validation(format!("{} is not a valid chain address: {}", field, value))
	})?;
	Ok(())
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		contents.parse()
	}

	/// Validates the configuration after parsing.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.chain.rpc_url.is_empty() {
			return Err(ConfigError::Validation("chain.rpc_url cannot be empty".into()));
		}
		if self.chain.chain_id == 0 {
			return Err(ConfigError::Validation("chain.chain_id must be non-zero".into()));
		}
		if self.chain.explorer_url.is_empty() {
			return Err(ConfigError::Validation(
				"chain.explorer_url cannot be empty".into(),
			));
		}

		if self.account.private_key.is_empty() {
			return Err(ConfigError::Validation(
				"account.private_key cannot be empty".into(),
			));
		}

		validate_address(&self.contracts.token, "contracts.token")?;
		validate_address(&self.contracts.price_feed, "contracts.price_feed")?;

		if self.fees.commission_percent.is_sign_negative()
			|| self.fees.commission_percent >= Decimal::from(100)
		{
			return Err(ConfigError::Validation(format!(
				"fees.commission_percent must be in [0, 100), got {}",
				self.fees.commission_percent
			)));
		}

		if self.gas.max_gwei == 0 {
			return Err(ConfigError::Validation("gas.max_gwei must be non-zero".into()));
		}
		if self.gas.limit == 0 {
			return Err(ConfigError::Validation("gas.limit must be non-zero".into()));
		}
		match self.gas.policy {
			GasPolicy::Fixed if self.gas.fixed_gwei == 0 => {
				return Err(ConfigError::Validation(
					"gas.fixed_gwei must be non-zero for the fixed policy".into(),
				));
			},
			GasPolicy::Multiplier if self.gas.multiplier == 0 => {
				return Err(ConfigError::Validation(
					"gas.multiplier must be non-zero for the multiplier policy".into(),
				));
			},
			_ => {},
		}

		if self.submission.confirmations == 0 {
			return Err(ConfigError::Validation(
				"submission.confirmations must be at least 1".into(),
			));
		}
		if self.submission.confirmations > 100 {
			return Err(ConfigError::Validation(
				"submission.confirmations cannot exceed 100".into(),
			));
		}
		if self.submission.confirmation_timeout_secs == 0 {
			return Err(ConfigError::Validation(
				"submission.confirmation_timeout_secs must be non-zero".into(),
			));
		}
		if self.submission.min_native_balance_eth.is_sign_negative() {
			return Err(ConfigError::Validation(
				"submission.min_native_balance_eth cannot be negative".into(),
			));
		}

		if self.api.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"api.timeout_seconds must be non-zero".into(),
			));
		}
		if self.api.timeout_seconds <= self.submission.confirmation_timeout_secs {
			return Err(ConfigError::Validation(
				"api.timeout_seconds must exceed submission.confirmation_timeout_secs".into(),
			));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string, resolving environment
/// variables first and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const VALID_CONFIG: &str = r#"
[chain]
rpc_url = "${BRIDGE_TEST_RPC:-http://localhost:8545}"
chain_id = 1

[account]
private_key = "${BRIDGE_TEST_KEY:-0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80}"

[contracts]
token = "0xdAC17F958D2ee523a2206206994597C13D831ec7"
price_feed = "0x3E7d1eAB13ad0104d2750B8863b489D65364e32D"

[fees]
commission_percent = "1"

[gas]
policy = "multiplier"
multiplier = 5
max_gwei = 500

[submission]
confirmations = 1
confirmation_timeout_secs = 300
min_native_balance_eth = "0.01"

[api]
host = "127.0.0.1"
port = 3000
"#;

	#[test]
	fn parses_a_complete_config() {
		let config: Config = VALID_CONFIG.parse().unwrap();
		assert_eq!(config.chain.rpc_url, "http://localhost:8545");
		assert_eq!(config.chain.chain_id, 1);
		assert_eq!(config.chain.explorer_url, "https://etherscan.io");
		assert_eq!(config.fees.commission_percent, Decimal::from(1));
		assert_eq!(config.gas.policy, GasPolicy::Multiplier);
		assert_eq!(config.gas.limit, 150_000);
		assert_eq!(config.submission.confirmations, 1);
		assert_eq!(
			config.submission.min_native_balance_eth,
			"0.01".parse::<Decimal>().unwrap()
		);
	}

	#[test]
	fn env_var_resolution_with_default() {
		let input = "value = \"${BRIDGE_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn missing_env_var_is_an_error() {
		let input = "value = \"${BRIDGE_MISSING_VAR}\"";
		let err = resolve_env_vars(input).unwrap_err();
		assert!(err.to_string().contains("BRIDGE_MISSING_VAR"));
	}

	#[test]
	fn env_var_resolution_reads_the_environment() {
		std::env::set_var("BRIDGE_TEST_EXPLORER", "https://sepolia.etherscan.io");
		let input = "explorer_url = \"${BRIDGE_TEST_EXPLORER}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "explorer_url = \"https://sepolia.etherscan.io\"");
		std::env::remove_var("BRIDGE_TEST_EXPLORER");
	}

	#[test]
	fn invalid_token_address_is_rejected() {
		let config = VALID_CONFIG.replace("0xdAC17F958D2ee523a2206206994597C13D831ec7", "not-an-address");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("contracts.token"));
	}

	#[test]
	fn commission_out_of_range_is_rejected() {
		let config = VALID_CONFIG.replace("commission_percent = \"1\"", "commission_percent = \"100\"");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("commission_percent"));
	}

	#[test]
	fn zero_confirmations_are_rejected() {
		let config = VALID_CONFIG.replace("confirmations = 1", "confirmations = 0");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("confirmations"));
	}

	#[test]
	fn api_timeout_must_outlast_confirmation_wait() {
		let config = VALID_CONFIG.replace("port = 3000", "port = 3000\ntimeout_seconds = 300");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("api.timeout_seconds"));
	}

	#[test]
	fn defaults_fill_optional_sections() {
		let config = VALID_CONFIG
			.lines()
			.take_while(|line| !line.starts_with("[gas]"))
			.collect::<Vec<_>>()
			.join("\n");
		let config: Config = config.parse().unwrap();
		assert_eq!(config.gas.multiplier, 5);
		assert_eq!(config.gas.max_gwei, 500);
		assert_eq!(config.submission.confirmation_timeout_secs, 300);
		assert_eq!(config.api.port, 3000);
	}

	#[test]
	fn loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(VALID_CONFIG.as_bytes()).unwrap();
		let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
		assert_eq!(config.chain.chain_id, 1);
	}
}
