use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    models::PositionSnapshot,
    services::{PageVisibility, PollerState},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub state: PollerState,
    pub sync_enabled: bool,
    #[serde(flatten)]
    pub snapshot: PositionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    pub sync_enabled: bool,
}

pub async fn get_positions(State(state): State<AppState>) -> Json<PositionsResponse> {
    Json(PositionsResponse {
        state: state.poller.state(),
        sync_enabled: state.poller.is_sync_enabled(),
        snapshot: state.poller.snapshot().await,
    })
}

pub async fn set_visibility(
    State(state): State<AppState>,
    Json(request): Json<VisibilityRequest>,
) -> Json<VisibilityResponse> {
    let visibility = if request.visible {
        PageVisibility::Visible
    } else {
        PageVisibility::Hidden
    };
    state.poller.on_visibility_change(visibility);

    Json(VisibilityResponse {
        sync_enabled: state.poller.is_sync_enabled(),
    })
}

pub fn create_position_routes() -> Router<AppState> {
    Router::new()
        .route("/positions", get(get_positions))
        .route("/visibility", post(set_visibility))
}
