use alloy::primitives::{Address, U256};
use alloy::sol;
use async_trait::async_trait;
use std::time::Duration;

use crate::adapters::traits::{AdapterError, SavingsRateReader};
use crate::blockchain::{ContractHandle, EthereumClient};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IPot {
        function dsr() external view returns (uint256);
    }
}

/// Maker DSR reads through the Pot contract
pub struct MakerDaoAdapter {
    ethereum_client: EthereumClient,
    pot: ContractHandle<Address>,
}

impl MakerDaoAdapter {
    pub const POT_ADDRESS: &'static str = "0x197E90f9FAD81970bA7976f33CbD77088E5D7cf7";

    /// Start resolving the Pot in the background; reads wait up to `deadline`
    pub fn new(ethereum_client: EthereumClient, pot_address: Address, deadline: Duration) -> Self {
        let client = ethereum_client.clone();
        let pot = ContractHandle::spawn_init("mcd_pot", deadline, move || {
            let client = client.clone();
            async move { client.ensure_contract(pot_address).await }
        });

        Self::with_handle(ethereum_client, pot)
    }

    pub fn with_handle(ethereum_client: EthereumClient, pot: ContractHandle<Address>) -> Self {
        Self { ethereum_client, pot }
    }
}

#[async_trait]
impl SavingsRateReader for MakerDaoAdapter {
    async fn savings_rate_per_second(&self) -> Result<U256, AdapterError> {
        let pot_address = self.pot.get().await?;
        let pot = IPot::new(pot_address, self.ethereum_client.provider().clone());

        let dsr = pot
            .dsr()
            .call()
            .await
            .map_err(|e| AdapterError::ContractError(format!("Pot dsr() failed: {}", e)))?;

        Ok(dsr._0)
    }
}
