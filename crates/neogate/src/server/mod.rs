mod admission;
mod chain;
mod contracts;
mod error;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::routing::{any, get, post};
use axum::{middleware, Json, Router};
use eyre::WrapErr;
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, CorsLayer};

use neogate_core::contracts::ContractService;
use neogate_core::rate_limit::RateLimiter;
use neogate_core::{NeoError, NeoService, Network, NetworkRegistry};

use error::AppError;

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub networks: NetworkRegistry,
    pub services: BTreeMap<Network, Arc<NeoService>>,
    pub contracts: BTreeMap<Network, ContractService>,
    /// Per-client admission for incoming HTTP requests.
    pub client_limiter: Option<RateLimiter>,
}

type SharedState = Arc<AppState>;

/// `?network=` accepted by every data route.
#[derive(Deserialize)]
pub(super) struct NetworkQuery {
    network: Option<String>,
}

impl AppState {
    fn resolve(&self, query: &NetworkQuery) -> Result<Network, AppError> {
        Ok(self.networks.resolve(query.network.as_deref())?)
    }

    fn service(&self, query: &NetworkQuery) -> Result<&NeoService, AppError> {
        let network = self.resolve(query)?;
        self.services
            .get(&network)
            .map(Arc::as_ref)
            .ok_or_else(|| NeoError::Internal(format!("no service configured for {network}")).into())
    }

    fn contracts(&self, query: &NetworkQuery) -> Result<&ContractService, AppError> {
        let network = self.resolve(query)?;
        self.contracts
            .get(&network)
            .ok_or_else(|| NeoError::Internal(format!("no contract service for {network}")).into())
    }
}

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState, origin: &str) -> eyre::Result<Router> {
    let allowed: axum::http::HeaderValue = origin
        .parse()
        .wrap_err_with(|| format!("invalid CORS origin `{origin}`"))?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate({
            let allowed = allowed.clone();
            move |request_origin: &axum::http::HeaderValue, _| *request_origin == allowed
        }))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::HeaderName::from_static(admission::CLIENT_ID_HEADER),
        ]);

    let shared = Arc::new(state);

    let public_api = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/networks", get(chain::get_networks));

    let data_api = Router::new()
        .route("/api/v1/chain", get(chain::get_chain))
        .route("/api/v1/block/{block_ref}", get(chain::get_block))
        .route("/api/v1/tx/{txid}", get(chain::get_transaction))
        .route("/api/v1/tx/{txid}/status", get(chain::get_transaction_status))
        .route("/api/v1/balance/{address}", get(chain::get_balance))
        .route("/api/v1/balance/{address}/unclaimed", get(chain::get_unclaimed_gas))
        .route("/api/v1/contracts", get(contracts::list_contracts))
        .route("/api/v1/contracts/{name}", get(contracts::get_contract))
        .route("/api/v1/contracts/{name}/query", post(contracts::query_contract))
        .route("/api/v1/fees/transfer", post(contracts::estimate_transfer))
        .route("/api/v1/fees/invocation", post(contracts::estimate_invocation))
        .route_layer(middleware::from_fn_with_state(
            shared.clone(),
            admission::admit_client,
        ));

    Ok(Router::new()
        .merge(public_api)
        .merge(data_api)
        .route("/api", any(api_not_found))
        .route("/api/{*path}", any(api_not_found))
        .layer(cors)
        .with_state(shared))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn api_not_found() -> AppError {
    AppError::NotFound("API route not found".to_string())
}
