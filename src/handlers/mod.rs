use axum::{routing::get, Router};

use crate::AppState;

pub mod gas_handlers;
pub mod health;
pub mod migration_handlers;
pub mod position_handlers;
pub mod wallet_handlers;

pub use gas_handlers::create_gas_routes;
pub use health::health_check;
pub use migration_handlers::create_migration_routes;
pub use position_handlers::create_position_routes;
pub use wallet_handlers::create_wallet_routes;

/// Every route the service exposes, state not yet attached
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/v1",
            Router::new()
                .merge(create_position_routes())
                .merge(create_wallet_routes())
                .merge(create_gas_routes())
                .merge(create_migration_routes()),
        )
}
