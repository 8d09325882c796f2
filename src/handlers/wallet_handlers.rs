use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    blockchain::EthereumClient,
    error::AppError,
    models::Token,
    services::TokenBalance,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ConnectWalletRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub address: Option<String>,
    pub connected: bool,
}

pub async fn connect_wallet(
    State(state): State<AppState>,
    Json(request): Json<ConnectWalletRequest>,
) -> Result<Json<WalletResponse>, AppError> {
    let address = EthereumClient::validate_address(&request.address)?;
    state.wallet.connect(address).await;

    Ok(Json(WalletResponse {
        address: Some(address.to_checksum(None)),
        connected: true,
    }))
}

pub async fn disconnect_wallet(State(state): State<AppState>) -> Json<WalletResponse> {
    state.wallet.disconnect().await;

    Json(WalletResponse {
        address: None,
        connected: false,
    })
}

pub async fn get_balances(State(state): State<AppState>) -> Result<Json<Vec<TokenBalance>>, AppError> {
    Ok(Json(state.migrations.wallet_balances().await?))
}

#[derive(Debug, Serialize)]
pub struct TokenListResponse {
    pub tokens: Vec<Token>,
    pub markets: Vec<Token>,
}

pub async fn list_tokens(State(state): State<AppState>) -> Json<TokenListResponse> {
    Json(TokenListResponse {
        tokens: state.registry.tokens().to_vec(),
        markets: state.registry.markets().to_vec(),
    })
}

pub fn create_wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/wallet/connect", post(connect_wallet))
        .route("/wallet/disconnect", post(disconnect_wallet))
        .route("/wallet/balances", get(get_balances))
        .route("/tokens", get(list_tokens))
}
