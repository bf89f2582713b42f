//! HTTP server for the bridge API.
//!
//! Routes requests to the bridge engine and converts pipeline errors
//! into the uniform JSON error envelope at the handler boundary.

use axum::{
	extract::{Path, State},
	response::Json,
	routing::{get, post},
	Router,
};
use bridge_config::ApiConfig;
use bridge_core::BridgeEngine;
use bridge_types::{
	ApiError, BalanceResponse, ConvertRequest, ConvertResponse, IssueRequest, IssueResponse,
	PriceResponse, StatusResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Bridge engine processing requests.
	pub engine: Arc<BridgeEngine>,
}

/// Builds the bridge router over the given engine.
pub fn router(engine: Arc<BridgeEngine>, timeout: Duration) -> Router {
	let state = AppState { engine };

	Router::new()
		.nest(
			"/bridge",
			Router::new()
				.route("/convert", post(handle_convert))
				.route("/emit-issue", post(handle_emit_issue))
				.route("/register-issuance", post(handle_register_issuance))
				.route("/status/{delegatorAddress}", get(handle_status))
				.route("/balance/{address}", get(handle_balance))
				.route("/price", get(handle_price)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(CorsLayer::permissive())
				.layer(TimeoutLayer::new(timeout)),
		)
		.with_state(state)
}

/// Starts the HTTP server for the bridge API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<BridgeEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine, Duration::from_secs(api_config.timeout_seconds));

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Bridge API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /bridge/convert requests.
async fn handle_convert(
	State(state): State<AppState>,
	Json(request): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
	match state.engine.convert(request).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Conversion request failed: {}", e);
			Err(ApiError::from(e))
		},
	}
}

/// Handles POST /bridge/emit-issue requests.
async fn handle_emit_issue(
	State(state): State<AppState>,
	Json(request): Json<IssueRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
	match state.engine.emit_issue(request).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Emit-issue request failed: {}", e);
			Err(ApiError::from(e))
		},
	}
}

/// Handles POST /bridge/register-issuance requests.
async fn handle_register_issuance(
	State(state): State<AppState>,
	Json(request): Json<IssueRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
	match state.engine.register_issuance(request).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Register-issuance request failed: {}", e);
			Err(ApiError::from(e))
		},
	}
}

/// Handles GET /bridge/status/{delegatorAddress} requests.
async fn handle_status(
	Path(delegator_address): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
	match state.engine.delegator_status(&delegator_address).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Status request failed: {}", e);
			Err(ApiError::from(e))
		},
	}
}

/// Handles GET /bridge/balance/{address} requests.
async fn handle_balance(
	Path(address): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, ApiError> {
	match state.engine.token_balance(&address).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Balance request failed: {}", e);
			Err(ApiError::from(e))
		},
	}
}

/// Handles GET /bridge/price requests.
async fn handle_price(State(state): State<AppState>) -> Result<Json<PriceResponse>, ApiError> {
	match state.engine.oracle_price().await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Price request failed: {}", e);
			Err(ApiError::from(e))
		},
	}
}
