use alloy::primitives::{Address, U256};
use alloy::sol;
use async_trait::async_trait;

use crate::adapters::traits::{AdapterError, LendingMarketReader};
use crate::blockchain::EthereumClient;
use crate::models::MarketState;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ICErc20 {
        function balanceOfUnderlying(address owner) external returns (uint256);
        function borrowBalanceCurrent(address account) external returns (uint256);
        function borrowRatePerBlock() external view returns (uint256);
        function totalBorrows() external view returns (uint256);
        function getCash() external view returns (uint256);
    }
}

/// Compound v2 cToken reads
pub struct CompoundAdapter {
    ethereum_client: EthereumClient,
}

impl CompoundAdapter {
    pub fn new(ethereum_client: EthereumClient) -> Self {
        Self { ethereum_client }
    }
}

fn call_error(what: &str, market: Address, e: impl std::fmt::Display) -> AdapterError {
    AdapterError::ContractError(format!("{} on {} failed: {}", what, market, e))
}

#[async_trait]
impl LendingMarketReader for CompoundAdapter {
    fn protocol_name(&self) -> &'static str {
        "compound"
    }

    async fn supplied_balance(&self, market: Address, owner: Address) -> Result<U256, AdapterError> {
        let contract = ICErc20::new(market, self.ethereum_client.provider().clone());
        let balance = contract
            .balanceOfUnderlying(owner)
            .call()
            .await
            .map_err(|e| call_error("balanceOfUnderlying", market, e))?;
        Ok(balance._0)
    }

    async fn borrowed_balance(&self, market: Address, owner: Address) -> Result<U256, AdapterError> {
        let contract = ICErc20::new(market, self.ethereum_client.provider().clone());
        let balance = contract
            .borrowBalanceCurrent(owner)
            .call()
            .await
            .map_err(|e| call_error("borrowBalanceCurrent", market, e))?;
        Ok(balance._0)
    }

    async fn market_state(&self, market: Address) -> Result<MarketState, AdapterError> {
        let contract = ICErc20::new(market, self.ethereum_client.provider().clone());

        let rate_call = contract.borrowRatePerBlock();
        let borrows_call = contract.totalBorrows();
        let cash_call = contract.getCash();

        let (rate, borrows, cash) = tokio::try_join!(
            async { rate_call.call().await.map_err(|e| call_error("borrowRatePerBlock", market, e)) },
            async { borrows_call.call().await.map_err(|e| call_error("totalBorrows", market, e)) },
            async { cash_call.call().await.map_err(|e| call_error("getCash", market, e)) },
        )?;

        tracing::debug!(
            market = %market,
            borrow_rate_per_block = %rate._0,
            total_borrows = %borrows._0,
            cash = %cash._0,
            "Fetched market state"
        );

        Ok(MarketState {
            borrow_rate_per_block: rate._0,
            total_borrows: borrows._0,
            cash: cash._0,
        })
    }
}
