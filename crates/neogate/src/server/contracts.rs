use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use neogate_core::contracts::{ContractInfo, OperationSpec};
use neogate_core::types::{FeeEstimate, InvocationResult};
use neogate_core::validation::{AmountInput, ScriptHash};
use neogate_core::{FeeEstimator, Network};

use super::error::AppError;
use super::{NetworkQuery, SharedState};

// ==============================================================================
// DTOs
// ==============================================================================

#[derive(Serialize)]
pub(super) struct ContractResponse {
    name: String,
    description: String,
    network: Network,
    script_hash: Option<ScriptHash>,
    available: bool,
    operations: Vec<OperationSpec>,
}

#[derive(Deserialize)]
pub(super) struct QueryRequest {
    operation: String,
    #[serde(default)]
    args: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
pub(super) struct TransferFeeRequest {
    from: String,
    to: String,
    asset: String,
    amount: AmountInput,
}

#[derive(Deserialize)]
pub(super) struct InvocationFeeRequest {
    signer: String,
    script_hash: String,
    operation: String,
    #[serde(default)]
    args: Vec<serde_json::Value>,
}

// ==============================================================================
// Handlers
// ==============================================================================

pub(super) async fn list_contracts(
    State(state): State<SharedState>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<Vec<ContractInfo>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.contracts(&query)?.list_supported_contracts()))
}

pub(super) async fn get_contract(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> Result<Json<ContractResponse>, AppError> {
    let Query(query) = query?;
    let contracts = state.contracts(&query)?;
    let descriptor = contracts.registry().get(&name)?;
    let script_hash = contracts.get_contract_script_hash(&name).ok();
    Ok(Json(ContractResponse {
        name: descriptor.name.clone(),
        description: descriptor.description.clone(),
        network: contracts.network(),
        available: script_hash.is_some(),
        script_hash,
        operations: contracts.get_contract_operations(&name)?,
    }))
}

pub(super) async fn query_contract(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<InvocationResult>, AppError> {
    let Query(query) = query?;
    let Json(body) = body?;
    let contracts = state.contracts(&query)?;
    let result = contracts
        .query_contract(&name, &body.operation, &body.args)
        .await?;
    Ok(Json(result))
}

pub(super) async fn estimate_transfer(
    State(state): State<SharedState>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
    body: Result<Json<TransferFeeRequest>, JsonRejection>,
) -> Result<Json<FeeEstimate>, AppError> {
    let Query(query) = query?;
    let Json(body) = body?;
    let service = state.service(&query)?;
    let estimate = FeeEstimator::new(service)?
        .estimate_transfer(&body.from, &body.to, &body.asset, &body.amount)
        .await?;
    Ok(Json(estimate))
}

pub(super) async fn estimate_invocation(
    State(state): State<SharedState>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
    body: Result<Json<InvocationFeeRequest>, JsonRejection>,
) -> Result<Json<FeeEstimate>, AppError> {
    let Query(query) = query?;
    let Json(body) = body?;
    let service = state.service(&query)?;
    let estimate = FeeEstimator::new(service)?
        .estimate_invocation(&body.signer, &body.script_hash, &body.operation, &body.args)
        .await?;
    Ok(Json(estimate))
}
