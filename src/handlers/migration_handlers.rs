use alloy::primitives::{Address, TxHash, U256};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{blockchain::EthereumClient, error::AppError, services::TokenBalance, AppState};

#[derive(Debug, Deserialize)]
pub struct PositionsQuery {
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OneHopPositionsResponse {
    pub position_ids: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct AllowanceQuery {
    pub market: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub market: String,
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct MoveInRequest {
    /// Decimal or 0x-prefixed
    pub position_id: String,
    pub market: String,
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub hash: String,
    pub status: &'static str,
}

fn submitted(hash: TxHash) -> Json<TransactionResponse> {
    Json(TransactionResponse {
        hash: hash.to_string(),
        status: "pending",
    })
}

pub async fn list_positions(
    State(state): State<AppState>,
    Query(query): Query<PositionsQuery>,
) -> Result<Json<OneHopPositionsResponse>, AppError> {
    let owner: Option<Address> = query
        .owner
        .as_deref()
        .map(EthereumClient::validate_address)
        .transpose()?;

    let ids = state.migrations.positions_of(owner).await?;

    Ok(Json(OneHopPositionsResponse {
        total: ids.len(),
        position_ids: ids.iter().map(U256::to_string).collect(),
    }))
}

pub async fn create_position(State(state): State<AppState>) -> Result<Json<TransactionResponse>, AppError> {
    let hash = state.migrations.new_position().await?;
    Ok(submitted(hash))
}

pub async fn approve_market(
    State(state): State<AppState>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let hash = state.migrations.approve_market(&request.market, &request.amount).await?;
    Ok(submitted(hash))
}

pub async fn get_allowance(
    State(state): State<AppState>,
    Query(query): Query<AllowanceQuery>,
) -> Result<Json<TokenBalance>, AppError> {
    Ok(Json(state.migrations.market_allowance(&query.market).await?))
}

pub async fn move_in(
    State(state): State<AppState>,
    Json(request): Json<MoveInRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let position_id = U256::from_str(&request.position_id)
        .map_err(|e| AppError::ValidationError(format!("Invalid position id: {}", e)))?;

    let hash = state
        .migrations
        .move_in(position_id, &request.market, &request.amount)
        .await?;
    Ok(submitted(hash))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    let hash = TxHash::from_str(&hash)
        .map_err(|e| AppError::ValidationError(format!("Invalid transaction hash: {}", e)))?;

    let status = if query.wait {
        state.transactions.wait_for_confirmation(hash).await?;
        "confirmed"
    } else {
        match state.transactions.status(hash).await? {
            None => "pending",
            Some(true) => "confirmed",
            Some(false) => "reverted",
        }
    };

    Ok(Json(TransactionResponse {
        hash: hash.to_string(),
        status,
    }))
}

pub fn create_migration_routes() -> Router<AppState> {
    Router::new()
        .route("/migrations/positions", get(list_positions).post(create_position))
        .route("/migrations/allowance", get(get_allowance))
        .route("/migrations/approve", post(approve_market))
        .route("/migrations/move-in", post(move_in))
        .route("/transactions/:hash", get(get_transaction))
}
