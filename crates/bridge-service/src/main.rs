//! Main entry point for the bridge service.
//!
//! Loads configuration, connects the chain client, and serves the
//! bridge HTTP API until interrupted.

use bridge_chain::{ChainClient, ChainInterface};
use bridge_config::Config;
use bridge_core::BridgeEngine;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

/// Command-line arguments for the bridge service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the bridge service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads and validates configuration
/// 4. Connects the chain client and builds the engine
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	tracing::info!("Started bridge service");

	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path)?;
	tracing::info!(
		chain_id = config.chain.chain_id,
		"Loaded configuration"
	);

	let client = Arc::new(ChainClient::new(&config)?);
	tracing::info!(signer = %client.signer_address(), "Connected chain client");

	let api_config = config.api.clone();
	let engine = Arc::new(BridgeEngine::new(client, config)?);

	server::start_server(api_config, engine).await?;

	tracing::info!("Stopped bridge service");
	Ok(())
}
