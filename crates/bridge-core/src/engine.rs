//! Bridge engine: the pipeline behind every endpoint.
//!
//! Each operation is one linear attempt: validate the input, run the
//! pre-flight reads, submit at most one transaction, wait for its
//! confirmation, and shape the response. There is no shared mutable
//! state between requests and no retry; a request either completes or
//! fails once.

use crate::{calculator, explorer, BridgeError};
use alloy_primitives::Address;
use bridge_chain::{ChainInterface, DelegatorMethod};
use bridge_config::Config;
use bridge_types::{
	from_base_units, to_base_units, BalanceResponse, ConvertRequest, ConvertResponse,
	IssueRequest, IssueResponse, PriceResponse, StatusResponse, SubmittedTx, TransactionSummary,
	TxReceipt,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Orchestrates chain reads, the conversion calculator, and transaction
/// submission for the HTTP handlers.
pub struct BridgeEngine {
	client: Arc<dyn ChainInterface>,
	config: Config,
	token: Address,
	price_feed: Address,
}

impl BridgeEngine {
	/// Creates an engine over a connected chain client.
	pub fn new(client: Arc<dyn ChainInterface>, config: Config) -> Result<Self, BridgeError> {
		let token = parse_address(&config.contracts.token, "contracts.token")?;
		let price_feed = parse_address(&config.contracts.price_feed, "contracts.price_feed")?;
		Ok(Self {
			client,
			config,
			token,
			price_feed,
		})
	}

	/// USD to token conversion: price the amount at the oracle rate,
	/// withhold the commission, and transfer the net from the signer.
	pub async fn convert(&self, request: ConvertRequest) -> Result<ConvertResponse, BridgeError> {
		let request_id = Uuid::new_v4();
		let amount_usd = parse_amount(&request.amount_usd, "amountUsd")?;
		let recipient = parse_address(&request.recipient_address, "recipientAddress")?;

		tracing::info!(
			%request_id,
			amount_usd = %amount_usd,
			recipient = %recipient,
			"Starting USD conversion"
		);

		self.check_native_reserve().await?;

		let round = self.client.latest_round(self.price_feed).await?;
		let decimals = self.client.token_decimals(self.token).await?;
		let conversion = calculator::calculate(
			amount_usd,
			round.price,
			self.config.fees.commission_percent,
			decimals,
		)?;
		let net_units = to_base_units(conversion.net, decimals)?;

		let signer = self.client.signer_address();
		let token_balance = self.client.token_balance(self.token, signer).await?;
		if token_balance < net_units {
			let held = from_base_units(token_balance, decimals).unwrap_or_default();
			return Err(BridgeError::InsufficientFunds(format!(
				"token balance {} below required {}",
				held, conversion.net
			)));
		}

		tracing::info!(
			%request_id,
			net = %conversion.net,
			commission = %conversion.commission,
			oracle_price = %round.price,
			"Submitting token transfer"
		);
		let submitted = self
			.client
			.transfer_token(self.token, recipient, net_units)
			.await?;
		let receipt = self.confirm(request_id, &submitted).await?;

		let transaction = self.summary(&submitted, &receipt, self.token, "transfer");
		let explorer = explorer::links(
			&self.config.chain.explorer_url,
			&receipt.hash,
			recipient,
			self.token,
			None,
		);

		Ok(ConvertResponse {
			success: true,
			amount_usd: amount_usd.normalize().to_string(),
			amount_token_net: conversion.net.to_string(),
			commission: conversion.commission.to_string(),
			oracle_price: round.price.normalize().to_string(),
			recipient: recipient.to_string(),
			transaction,
			explorer,
		})
	}

	/// Records an issuance via `emitIssueEvent` on the delegator.
	pub async fn emit_issue(&self, request: IssueRequest) -> Result<IssueResponse, BridgeError> {
		self.submit_issuance(DelegatorMethod::EmitIssue, request)
			.await
	}

	/// Records an issuance via `registerIssuance` on the delegator.
	pub async fn register_issuance(
		&self,
		request: IssueRequest,
	) -> Result<IssueResponse, BridgeError> {
		self.submit_issuance(DelegatorMethod::RegisterIssuance, request)
			.await
	}

	// The two issuance endpoints differ only in the encoded method, so
	// they share one parametrized pipeline.
	async fn submit_issuance(
		&self,
		method: DelegatorMethod,
		request: IssueRequest,
	) -> Result<IssueResponse, BridgeError> {
		let request_id = Uuid::new_v4();
		let amount = parse_amount(&request.amount, "amount")?;
		let recipient = parse_address(&request.recipient_address, "recipientAddress")?;
		let delegator = parse_address(&request.delegator_address, "delegatorAddress")?;

		tracing::info!(
			%request_id,
			method = method.name(),
			amount = %amount,
			recipient = %recipient,
			delegator = %delegator,
			"Starting delegator issuance"
		);

		self.check_native_reserve().await?;

		let decimals = self.client.token_decimals(self.token).await?;
		let units = to_base_units(amount, decimals)?;

		let submitted = self
			.client
			.delegator_call(delegator, method, recipient, units)
			.await?;
		let receipt = self.confirm(request_id, &submitted).await?;

		// Read back what the delegator now has on record for this
		// recipient, so the response reflects confirmed contract state.
		let recipient_issued = self.client.issued_amount(delegator, recipient).await?;
		let recipient_issued = from_base_units(recipient_issued, decimals)?;

		let transaction = self.summary(&submitted, &receipt, delegator, method.name());
		let explorer = explorer::links(
			&self.config.chain.explorer_url,
			&receipt.hash,
			recipient,
			self.token,
			Some(delegator),
		);

		Ok(IssueResponse {
			success: true,
			method: method.name().to_string(),
			amount: amount.normalize().to_string(),
			recipient: recipient.to_string(),
			delegator: delegator.to_string(),
			recipient_issued: recipient_issued.normalize().to_string(),
			transaction,
			explorer,
		})
	}

	/// Cumulative issued amount recorded by a delegator contract.
	pub async fn delegator_status(
		&self,
		delegator_address: &str,
	) -> Result<StatusResponse, BridgeError> {
		let delegator = parse_address(delegator_address, "delegatorAddress")?;
		let decimals = self.client.token_decimals(self.token).await?;
		let total = self.client.total_issued(delegator).await?;
		let total = from_base_units(total, decimals)?;

		Ok(StatusResponse {
			success: true,
			delegator_address: delegator.to_string(),
			total_issued: total.normalize().to_string(),
			timestamp: Utc::now().to_rfc3339(),
		})
	}

	/// Token balance of an address, in human units.
	pub async fn token_balance(&self, address: &str) -> Result<BalanceResponse, BridgeError> {
		let who = parse_address(address, "address")?;
		let decimals = self.client.token_decimals(self.token).await?;
		let balance = self.client.token_balance(self.token, who).await?;
		let balance = from_base_units(balance, decimals)?;

		Ok(BalanceResponse {
			success: true,
			address: who.to_string(),
			balance: balance.normalize().to_string(),
			token: self.token.to_string(),
		})
	}

	/// Current oracle price.
	pub async fn oracle_price(&self) -> Result<PriceResponse, BridgeError> {
		let round = self.client.latest_round(self.price_feed).await?;
		if round.price <= Decimal::ZERO {
			return Err(BridgeError::InvalidOracleData(format!(
				"oracle price must be positive, got {}",
				round.price
			)));
		}

		Ok(PriceResponse {
			success: true,
			price: round.price.normalize().to_string(),
			updated_at: round.updated_at,
			feed: self.price_feed.to_string(),
		})
	}

	/// Fails fast if the signer cannot cover gas for a submission.
	async fn check_native_reserve(&self) -> Result<(), BridgeError> {
		let minimum = to_base_units(self.config.submission.min_native_balance_eth, 18)?;
		let balance = self
			.client
			.native_balance(self.client.signer_address())
			.await?;
		if balance < minimum {
			let held = from_base_units(balance, 18).unwrap_or_default();
			return Err(BridgeError::InsufficientFunds(format!(
				"native balance {} ETH below required minimum {} ETH",
				held.normalize(),
				self.config.submission.min_native_balance_eth
			)));
		}
		Ok(())
	}

	async fn confirm(
		&self,
		request_id: Uuid,
		submitted: &SubmittedTx,
	) -> Result<TxReceipt, BridgeError> {
		let receipt = self.client.wait_for_confirmation(&submitted.hash).await?;
		if !receipt.success {
			tracing::warn!(%request_id, tx_hash = %receipt.hash, "Transaction reverted");
			return Err(BridgeError::TransactionReverted {
				hash: receipt.hash.to_hex(),
			});
		}
		tracing::info!(
			%request_id,
			tx_hash = %receipt.hash,
			block = receipt.block_number,
			"Transaction confirmed"
		);
		Ok(receipt)
	}

	fn summary(
		&self,
		submitted: &SubmittedTx,
		receipt: &TxReceipt,
		to: Address,
		method: &str,
	) -> TransactionSummary {
		TransactionSummary {
			hash: receipt.hash.to_hex(),
			from: self.client.signer_address().to_string(),
			to: to.to_string(),
			method: method.to_string(),
			block_number: receipt.block_number,
			status: if receipt.success { "Success" } else { "Failed" }.to_string(),
			gas_used: receipt.gas_used,
			gas_price_gwei: format_gwei(submitted.gas_price_wei),
			confirmations: self.config.submission.confirmations,
			timestamp: Utc::now().to_rfc3339(),
		}
	}
}

/// Parses a positive decimal amount from request input.
fn parse_amount(value: &str, field: &str) -> Result<Decimal, BridgeError> {
	let amount: Decimal = value.trim().parse().map_err(|_| {
		BridgeError::Validation(format!("{} is not a valid decimal amount: {}", field, value))
	})?;
	if amount <= Decimal::ZERO {
		return Err(BridgeError::Validation(format!(
			"{} must be positive, got {}",
			field, amount
		)));
	}
	Ok(amount)
}

/// Parses a chain address from request input.
fn parse_address(value: &str, field: &str) -> Result<Address, BridgeError> {
	value.trim().parse().map_err(|_| {
		BridgeError::Validation(format!("{} is not a valid chain address: {}", field, value))
	})
}

/// Formats a wei gas price as a gwei decimal string.
fn format_gwei(wei: u128) -> String {
	match i128::try_from(wei)
		.ok()
		.and_then(|wei| Decimal::try_from_i128_with_scale(wei, 9).ok())
	{
		Some(gwei) => gwei.normalize().to_string(),
		None => (wei / 1_000_000_000).to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;
	use async_trait::async_trait;
	use bridge_chain::{ChainError, OracleRound};
	use bridge_config::{
		AccountConfig, ApiConfig, ChainConfig, Config, ContractsConfig, FeesConfig, GasConfig,
		SubmissionConfig,
	};
	use bridge_types::{ConvertRequest, IssueRequest, SecretString, TxHash, TxReceipt};
	use std::sync::Mutex as StdMutex;

	const TOKEN: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
	const FEED: &str = "0x3E7d1eAB13ad0104d2750B8863b489D65364e32D";
	const DELEGATOR: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
	const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

	#[derive(Debug, Clone, Copy)]
	enum WaitOutcome {
		Confirm,
		Revert,
		Timeout,
	}

	/// In-memory chain standing in for a live provider. Records every
	/// submission so tests can assert what reached the chain.
	struct FakeChain {
		signer: Address,
		native_wei: U256,
		token_units: U256,
		decimals: u8,
		round: OracleRound,
		issued_units: U256,
		outcome: WaitOutcome,
		submissions: StdMutex<Vec<(Address, U256)>>,
	}

	impl Default for FakeChain {
		fn default() -> Self {
			Self {
				signer: Address::repeat_byte(0x11),
				// 0.1 ETH, well above the default 0.01 reserve
				native_wei: U256::from(10u64).pow(U256::from(17)),
				token_units: U256::from(1_000_000_000_000u64),
				decimals: 6,
				round: OracleRound {
					price: "1.0002".parse().unwrap(),
					updated_at: 1_700_000_000,
				},
				issued_units: U256::ZERO,
				outcome: WaitOutcome::Confirm,
				submissions: StdMutex::new(Vec::new()),
			}
		}
	}

	impl FakeChain {
		fn record(&self, to: Address, amount: U256) -> SubmittedTx {
			self.submissions.lock().unwrap().push((to, amount));
			SubmittedTx {
				hash: TxHash([0x42; 32]),
				gas_price_wei: 20_000_000_000,
			}
		}

		fn submission_count(&self) -> usize {
			self.submissions.lock().unwrap().len()
		}
	}

	#[async_trait]
	impl ChainInterface for FakeChain {
		fn signer_address(&self) -> Address {
			self.signer
		}

		async fn native_balance(&self, _address: Address) -> Result<U256, ChainError> {
			Ok(self.native_wei)
		}

		async fn token_balance(&self, _token: Address, _who: Address) -> Result<U256, ChainError> {
			Ok(self.token_units)
		}

		async fn token_decimals(&self, _token: Address) -> Result<u8, ChainError> {
			Ok(self.decimals)
		}

		async fn latest_round(&self, _feed: Address) -> Result<OracleRound, ChainError> {
			Ok(self.round)
		}

		async fn total_issued(&self, _delegator: Address) -> Result<U256, ChainError> {
			Ok(self.issued_units)
		}

		async fn issued_amount(
			&self,
			_delegator: Address,
			_to: Address,
		) -> Result<U256, ChainError> {
			Ok(self.issued_units)
		}

		async fn transfer_token(
			&self,
			_token: Address,
			to: Address,
			amount: U256,
		) -> Result<SubmittedTx, ChainError> {
			Ok(self.record(to, amount))
		}

		async fn delegator_call(
			&self,
			delegator: Address,
			_method: DelegatorMethod,
			_to: Address,
			amount: U256,
		) -> Result<SubmittedTx, ChainError> {
			Ok(self.record(delegator, amount))
		}

		async fn wait_for_confirmation(&self, hash: &TxHash) -> Result<TxReceipt, ChainError> {
			match self.outcome {
				WaitOutcome::Confirm | WaitOutcome::Revert => Ok(TxReceipt {
					hash: *hash,
					block_number: 21_000_000,
					gas_used: 48_211,
					success: matches!(self.outcome, WaitOutcome::Confirm),
				}),
				WaitOutcome::Timeout => Err(ChainError::ConfirmationTimeout {
					hash: hash.to_hex(),
					waited_secs: 300,
				}),
			}
		}
	}

	fn test_config() -> Config {
		Config {
			chain: ChainConfig {
				rpc_url: "http://localhost:8545".to_string(),
				chain_id: 1,
				explorer_url: "https://etherscan.io".to_string(),
			},
			account: AccountConfig {
				private_key: SecretString::from("test-key"),
			},
			contracts: ContractsConfig {
				token: TOKEN.to_string(),
				price_feed: FEED.to_string(),
			},
			fees: FeesConfig {
				commission_percent: "1".parse().unwrap(),
			},
			gas: GasConfig::default(),
			submission: SubmissionConfig::default(),
			api: ApiConfig::default(),
		}
	}

	fn engine_over(chain: Arc<FakeChain>) -> BridgeEngine {
		BridgeEngine::new(chain, test_config()).unwrap()
	}

	fn convert_request() -> ConvertRequest {
		ConvertRequest {
			amount_usd: "100".to_string(),
			recipient_address: RECIPIENT.to_string(),
		}
	}

	fn issue_request() -> IssueRequest {
		IssueRequest {
			amount: "5".to_string(),
			recipient_address: RECIPIENT.to_string(),
			delegator_address: DELEGATOR.to_string(),
		}
	}

	#[tokio::test]
	async fn convert_transfers_the_net_amount() {
		let chain = Arc::new(FakeChain::default());
		let engine = engine_over(chain.clone());

		let response = engine.convert(convert_request()).await.unwrap();
		assert_eq!(response.amount_token_net, "99.019800");
		assert_eq!(response.commission, "1.000200");
		assert_eq!(response.oracle_price, "1.0002");

		let expected: Vec<(Address, U256)> =
			vec![(RECIPIENT.parse().unwrap(), U256::from(99_019_800u64))];
		assert_eq!(*chain.submissions.lock().unwrap(), expected);
	}

	#[tokio::test]
	async fn low_gas_reserve_fails_preflight_without_submitting() {
		let chain = Arc::new(FakeChain {
			native_wei: U256::ZERO,
			..FakeChain::default()
		});
		let engine = engine_over(chain.clone());

		let err = engine.convert(convert_request()).await.unwrap_err();
		assert!(matches!(err, BridgeError::InsufficientFunds(_)));
		assert_eq!(chain.submission_count(), 0);
	}

	#[tokio::test]
	async fn low_token_balance_fails_preflight_without_submitting() {
		// 1 USDT held, 99.0198 needed
		let chain = Arc::new(FakeChain {
			token_units: U256::from(1_000_000u64),
			..FakeChain::default()
		});
		let engine = engine_over(chain.clone());

		let err = engine.convert(convert_request()).await.unwrap_err();
		assert!(matches!(err, BridgeError::InsufficientFunds(_)));
		assert_eq!(chain.submission_count(), 0);
	}

	#[tokio::test]
	async fn reverted_transfer_reports_the_hash() {
		let chain = Arc::new(FakeChain {
			outcome: WaitOutcome::Revert,
			..FakeChain::default()
		});
		let engine = engine_over(chain);

		let err = engine.convert(convert_request()).await.unwrap_err();
		match err {
			BridgeError::TransactionReverted { hash } => {
				assert_eq!(hash, TxHash([0x42; 32]).to_hex());
			},
			other => panic!("expected TransactionReverted, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn confirmation_timeout_maps_to_gateway_timeout() {
		let chain = Arc::new(FakeChain {
			outcome: WaitOutcome::Timeout,
			..FakeChain::default()
		});
		let engine = engine_over(chain);

		let err = engine.convert(convert_request()).await.unwrap_err();
		assert!(matches!(
			err,
			BridgeError::Chain(ChainError::ConfirmationTimeout { .. })
		));
		assert_eq!(bridge_types::ApiError::from(err).status_code(), 504);
	}

	#[tokio::test]
	async fn issuance_reports_the_recipient_running_total() {
		let chain = Arc::new(FakeChain {
			issued_units: U256::from(5_000_000u64),
			..FakeChain::default()
		});
		let engine = engine_over(chain.clone());

		let response = engine.emit_issue(issue_request()).await.unwrap();
		assert_eq!(response.method, "emitIssueEvent");
		assert_eq!(response.recipient_issued, "5");

		let expected: Vec<(Address, U256)> =
			vec![(DELEGATOR.parse().unwrap(), U256::from(5_000_000u64))];
		assert_eq!(*chain.submissions.lock().unwrap(), expected);
	}

	#[test]
	fn amounts_must_be_positive_decimals() {
		assert!(parse_amount("100", "amount").is_ok());
		assert!(parse_amount(" 0.5 ", "amount").is_ok());

		for bad in ["0", "-1", "abc", "", "1e5", "NaN"] {
			let err = parse_amount(bad, "amount").unwrap_err();
			assert!(
				matches!(err, BridgeError::Validation(_)),
				"expected validation error for {:?}",
				bad
			);
		}
	}

	#[test]
	fn addresses_must_be_well_formed() {
		assert!(parse_address("0xdAC17F958D2ee523a2206206994597C13D831ec7", "address").is_ok());

		for bad in ["", "0x123", "dAC17F958D2ee523a220620699459", "not-an-address"] {
			let err = parse_address(bad, "address").unwrap_err();
			assert!(matches!(err, BridgeError::Validation(_)));
		}
	}

	#[test]
	fn gas_price_formats_as_gwei() {
		assert_eq!(format_gwei(20_000_000_000), "20");
		assert_eq!(format_gwei(1_500_000_000), "1.5");
		assert_eq!(format_gwei(0), "0");
	}
}
