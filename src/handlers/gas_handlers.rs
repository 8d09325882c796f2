use axum::{extract::State, response::Json, routing::get, Router};

use crate::{services::GasPriceSnapshot, AppState};

pub async fn get_gas_prices(State(state): State<AppState>) -> Json<GasPriceSnapshot> {
    Json(state.gas_oracle.current().await)
}

pub fn create_gas_routes() -> Router<AppState> {
    Router::new().route("/gas-prices", get(get_gas_prices))
}
