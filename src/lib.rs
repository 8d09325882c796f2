pub mod adapters;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use error::types::*;

use std::sync::Arc;

use crate::blockchain::WalletSession;
use crate::config::Settings;
use crate::models::TokenRegistry;
use crate::services::{GasPriceOracle, MigrationService, PositionPoller, TransactionService};

/// Shared handles for the HTTP layer
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub registry: Arc<TokenRegistry>,
    pub wallet: Arc<WalletSession>,
    pub poller: Arc<PositionPoller>,
    pub gas_oracle: Arc<GasPriceOracle>,
    pub transactions: Arc<TransactionService>,
    pub migrations: Arc<MigrationService>,
}
