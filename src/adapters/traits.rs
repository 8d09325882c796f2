use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use crate::error::AppError;
use crate::models::MarketState;

/// Common error type for all protocol adapters
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Contract call failed: {0}")]
    ContractError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Contract not ready: {0}")]
    NotReady(String),
}

impl From<AppError> for AdapterError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Timeout(msg) => AdapterError::NotReady(msg),
            other => AdapterError::ContractError(other.to_string()),
        }
    }
}

/// Reads a wallet's balances and a market's rate inputs from a
/// Compound-style money market
#[async_trait]
pub trait LendingMarketReader: Send + Sync {
    fn protocol_name(&self) -> &'static str;

    /// Supplied balance of `owner`, expressed in the underlying asset
    async fn supplied_balance(&self, market: Address, owner: Address) -> Result<U256, AdapterError>;

    /// Outstanding borrow of `owner`, including accrued interest
    async fn borrowed_balance(&self, market: Address, owner: Address) -> Result<U256, AdapterError>;

    async fn market_state(&self, market: Address) -> Result<MarketState, AdapterError>;
}

/// Source of a per-second savings rate (1e27-scaled)
#[async_trait]
pub trait SavingsRateReader: Send + Sync {
    async fn savings_rate_per_second(&self) -> Result<U256, AdapterError>;
}

/// Signing side of the wallet provider
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit and return as soon as the hash is known
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, AdapterError>;

    /// `None` while pending, otherwise whether execution succeeded
    async fn receipt_status(&self, hash: TxHash) -> Result<Option<bool>, AdapterError>;
}
