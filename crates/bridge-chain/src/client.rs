//! Alloy-backed chain client.
//!
//! One client instance is built at startup from configuration and shared
//! across requests. Reads go straight to the provider; writes funnel
//! through [`ChainClient::submit`], which applies the gas policy and
//! holds the per-signer lock across `eth_sendTransaction` so concurrent
//! requests cannot race on nonce assignment.

use crate::contracts::{DelegatorMethod, IDelegator, IErc20, IPriceFeed};
use crate::{gas, ChainError, ChainInterface};
use alloy_network::EthereumWallet;
use async_trait::async_trait;
use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use alloy_transport_http::Http;
use bridge_config::{Config, GasConfig, GasPolicy};
use bridge_types::{SubmittedTx, TxHash, TxReceipt};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Decimal places reported by Chainlink USD aggregators.
const FEED_DECIMALS: u32 = 8;

/// Receipt poll interval while waiting for confirmations.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Latest price-feed round, scaled to a decimal price.
#[derive(Debug, Clone, Copy)]
pub struct OracleRound {
	/// Price in USD per token.
	pub price: Decimal,
	/// Unix timestamp the feed last updated at.
	pub updated_at: u64,
}

/// Connected chain client bound to one signer and one network.
pub struct ChainClient {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	signer_address: Address,
	gas: GasConfig,
	confirmations: u64,
	confirmation_timeout: Duration,
	/// Serializes submissions so the shared signer cannot race on nonces.
	submit_lock: tokio::sync::Mutex<()>,
}

impl ChainClient {
	/// Builds a client from configuration: parses the signing key,
	/// attaches the chain id, and connects an HTTP provider.
	pub fn new(config: &Config) -> Result<Self, ChainError> {
		let url = config
			.chain
			.rpc_url
			.parse()
			.map_err(|e| ChainError::Network(format!("Invalid RPC URL: {}", e)))?;

		let signer: PrivateKeySigner = config.account.private_key.with_exposed(|key| {
			key.parse()
				.map_err(|_| ChainError::InvalidKey("private key is not a valid signing key".into()))
		})?;
		let signer = signer.with_chain_id(Some(config.chain.chain_id));
		let signer_address = signer.address();
		let wallet = EthereumWallet::from(signer);

		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		provider
			.client()
			.set_poll_interval(Duration::from_secs(7));

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
			signer_address,
			gas: config.gas.clone(),
			confirmations: config.submission.confirmations,
			confirmation_timeout: Duration::from_secs(config.submission.confirmation_timeout_secs),
			submit_lock: tokio::sync::Mutex::new(()),
		})
	}

	async fn effective_gas_price(&self) -> Result<u128, ChainError> {
		let network_price = match self.gas.policy {
			GasPolicy::Fixed => 0,
			GasPolicy::Multiplier => self.network_gas_price().await?,
		};
		Ok(gas::effective_gas_price(&self.gas, network_price))
	}

	/// Current network gas price in wei.
	pub async fn network_gas_price(&self) -> Result<u128, ChainError> {
		self.provider
			.get_gas_price()
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get gas price: {}", e)))
	}

	/// Submits a contract call with the configured gas policy applied.
	async fn submit(&self, to: Address, calldata: Vec<u8>) -> Result<SubmittedTx, ChainError> {
		let gas_price = self.effective_gas_price().await?;

		let mut request = TransactionRequest::default().to(to).input(calldata.into());
		request.gas = Some(self.gas.limit);
		request.gas_price = Some(gas_price);

		// Held across send so the nonce the filler assigns is consumed
		// before the next submission starts.
		let _guard = self.submit_lock.lock().await;
		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| ChainError::Network(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = *pending.tx_hash();
		let hash = TxHash(tx_hash.0);
		tracing::info!(tx_hash = %hash, gas_price_wei = gas_price, "Submitted transaction");

		Ok(SubmittedTx {
			hash,
			gas_price_wei: gas_price,
		})
	}

	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, ChainError> {
		let request = TransactionRequest::default().to(to).input(data.into());
		self.provider
			.call(&request)
			.await
			.map_err(|e| ChainError::Network(format!("Contract call failed: {}", e)))
	}
}

#[async_trait]
impl ChainInterface for ChainClient {
	fn signer_address(&self) -> Address {
		self.signer_address
	}

	async fn native_balance(&self, address: Address) -> Result<U256, ChainError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get balance: {}", e)))
	}

	async fn token_balance(&self, token: Address, who: Address) -> Result<U256, ChainError> {
		let data = IErc20::balanceOfCall { who }.abi_encode();
		let raw = self.call(token, data).await?;
		let decoded = IErc20::balanceOfCall::abi_decode_returns(&raw, true)
			.map_err(|e| ChainError::Network(format!("Invalid balanceOf response: {}", e)))?;
		Ok(decoded._0)
	}

	async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
		let data = IErc20::decimalsCall {}.abi_encode();
		let raw = self.call(token, data).await?;
		let decoded = IErc20::decimalsCall::abi_decode_returns(&raw, true)
			.map_err(|e| ChainError::Network(format!("Invalid decimals response: {}", e)))?;
		Ok(decoded._0)
	}

	async fn latest_round(&self, feed: Address) -> Result<OracleRound, ChainError> {
		let data = IPriceFeed::latestRoundDataCall {}.abi_encode();
		let raw = self.call(feed, data).await?;
		let decoded = IPriceFeed::latestRoundDataCall::abi_decode_returns(&raw, true)
			.map_err(|e| ChainError::Network(format!("Invalid latestRoundData response: {}", e)))?;

		let answer: i128 = decoded
			.answer
			.try_into()
			.map_err(|_| ChainError::Network("Oracle answer out of range".into()))?;
		let price = Decimal::try_from_i128_with_scale(answer, FEED_DECIMALS)
			.map_err(|_| ChainError::Network("Oracle answer out of range".into()))?;
		let updated_at = u64::try_from(decoded.updatedAt).unwrap_or(0);

		Ok(OracleRound { price, updated_at })
	}

	async fn total_issued(&self, delegator: Address) -> Result<U256, ChainError> {
		let data = IDelegator::getTotalIssuedCall {}.abi_encode();
		let raw = self.call(delegator, data).await?;
		let decoded = IDelegator::getTotalIssuedCall::abi_decode_returns(&raw, true)
			.map_err(|e| ChainError::Network(format!("Invalid getTotalIssued response: {}", e)))?;
		Ok(decoded._0)
	}

	async fn issued_amount(&self, delegator: Address, to: Address) -> Result<U256, ChainError> {
		let data = IDelegator::getIssuedAmountCall { to }.abi_encode();
		let raw = self.call(delegator, data).await?;
		let decoded = IDelegator::getIssuedAmountCall::abi_decode_returns(&raw, true)
			.map_err(|e| ChainError::Network(format!("Invalid getIssuedAmount response: {}", e)))?;
		Ok(decoded._0)
	}

	async fn transfer_token(
		&self,
		token: Address,
		to: Address,
		amount: U256,
	) -> Result<SubmittedTx, ChainError> {
		let data = IErc20::transferCall { to, value: amount }.abi_encode();
		self.submit(token, data).await
	}

	async fn delegator_call(
		&self,
		delegator: Address,
		method: DelegatorMethod,
		to: Address,
		amount: U256,
	) -> Result<SubmittedTx, ChainError> {
		let data = match method {
			DelegatorMethod::EmitIssue => {
				IDelegator::emitIssueEventCall { to, amount }.abi_encode()
			},
			DelegatorMethod::RegisterIssuance => {
				IDelegator::registerIssuanceCall { to, amount }.abi_encode()
			},
		};
		self.submit(delegator, data).await
	}

	// Inclusion in a block counts as the first confirmation.
	async fn wait_for_confirmation(&self, hash: &TxHash) -> Result<TxReceipt, ChainError> {
		let tx_hash = FixedBytes::<32>::from(hash.0);
		let start = tokio::time::Instant::now();

		tracing::info!(
			tx_hash = %hash,
			"Waiting for {} confirmations (timeout: {}s)",
			self.confirmations,
			self.confirmation_timeout.as_secs()
		);

		loop {
			if start.elapsed() > self.confirmation_timeout {
				return Err(ChainError::ConfirmationTimeout {
					hash: hash.to_hex(),
					waited_secs: self.confirmation_timeout.as_secs(),
				});
			}

			let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					// Not yet mined
					tokio::time::sleep(POLL_INTERVAL).await;
					continue;
				},
				Err(e) => {
					return Err(ChainError::Network(format!("Failed to get receipt: {}", e)));
				},
			};

			let current_block = self
				.provider
				.get_block_number()
				.await
				.map_err(|e| ChainError::Network(format!("Failed to get block number: {}", e)))?;

			let tx_block = receipt.block_number.unwrap_or(0);
			let confirmations = current_block.saturating_sub(tx_block) + 1;

			if confirmations >= self.confirmations {
				return Ok(TxReceipt {
					hash: TxHash(receipt.transaction_hash.0),
					block_number: tx_block,
					gas_used: receipt.gas_used as u64,
					success: receipt.status(),
				});
			}

			tracing::debug!(
				"Waiting for {} more confirmations",
				self.confirmations.saturating_sub(confirmations)
			);
			tokio::time::sleep(POLL_INTERVAL).await;
		}
	}
}
