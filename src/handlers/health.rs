use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let wallet = state.wallet.address().await;

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "poller": state.poller.state(),
        "sync_enabled": state.poller.is_sync_enabled(),
        "poll_interval_ms": state.settings.poller.interval_ms,
        "wallet_connected": wallet.is_some(),
    }))
}
