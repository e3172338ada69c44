use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use neogate_core::types::{Balance, Block, BlockchainInfo, GasAmount, RawTransaction, TransactionStatus};
use neogate_core::{Network, TransactionStatusChecker};

use super::error::AppError;
use super::{NetworkQuery, SharedState};

// ==============================================================================
// DTOs
// ==============================================================================

#[derive(Serialize)]
pub(super) struct NetworkEntry {
    network: Network,
    rpc_url: String,
}

#[derive(Serialize)]
pub(super) struct NetworksResponse {
    default: Option<Network>,
    networks: Vec<NetworkEntry>,
}

#[derive(Serialize)]
pub(super) struct UnclaimedGasResponse {
    address: String,
    network: Network,
    unclaimed: GasAmount,
}

// ==============================================================================
// Handlers
// ==============================================================================

pub(super) async fn get_networks(State(state): State<SharedState>) -> Json<NetworksResponse> {
    let networks = state
        .networks
        .networks()
        .map(|network| NetworkEntry {
            network,
            rpc_url: state.networks.rpc_url(network).unwrap_or_default().to_owned(),
        })
        .collect();
    Json(NetworksResponse {
        default: state.networks.resolve(None).ok(),
        networks,
    })
}

pub(super) async fn get_chain(
    State(state): State<SharedState>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<BlockchainInfo>, AppError> {
    let Query(query) = query?;
    let service = state.service(&query)?;
    Ok(Json(service.get_blockchain_info().await?))
}

/// `{block_ref}` is a height or a block hash.
pub(super) async fn get_block(
    State(state): State<SharedState>,
    Path(block_ref): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<Block>, AppError> {
    let Query(query) = query?;
    let service = state.service(&query)?;
    Ok(Json(service.get_block(block_ref.as_str()).await?))
}

pub(super) async fn get_transaction(
    State(state): State<SharedState>,
    Path(txid): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<RawTransaction>, AppError> {
    let Query(query) = query?;
    let service = state.service(&query)?;
    service
        .get_transaction(&txid)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("transaction not found: {}", txid.trim())))
}

pub(super) async fn get_transaction_status(
    State(state): State<SharedState>,
    Path(txid): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<TransactionStatus>, AppError> {
    let Query(query) = query?;
    let service = state.service(&query)?;
    let status = TransactionStatusChecker::new(service).check(&txid).await?;
    Ok(Json(status))
}

pub(super) async fn get_balance(
    State(state): State<SharedState>,
    Path(address): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<Balance>, AppError> {
    let Query(query) = query?;
    let service = state.service(&query)?;
    Ok(Json(service.get_balance(&address).await?))
}

pub(super) async fn get_unclaimed_gas(
    State(state): State<SharedState>,
    Path(address): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<UnclaimedGasResponse>, AppError> {
    let Query(query) = query?;
    let service = state.service(&query)?;
    let unclaimed = service.get_unclaimed_gas(&address).await?;
    Ok(Json(UnclaimedGasResponse {
        address: address.trim().to_owned(),
        network: service.network(),
        unclaimed,
    }))
}
