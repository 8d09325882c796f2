use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use std::time::Duration;

use crate::adapters::traits::AdapterError;
use crate::blockchain::{ContractHandle, EthereumClient};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IOneHopToken {
        function newPosition(address holder) external returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IPositionHolder {
        function moveIn(uint256 tokenId, address market, uint256 amount) external;
    }
}

/// OneHop position token and holder contracts
pub struct OneHopAdapter {
    ethereum_client: EthereumClient,
    token: ContractHandle<Address>,
    holder: ContractHandle<Address>,
}

impl OneHopAdapter {
    pub fn new(
        ethereum_client: EthereumClient,
        token_address: Address,
        holder_address: Address,
        deadline: Duration,
    ) -> Self {
        let client = ethereum_client.clone();
        let token = ContractHandle::spawn_init("onehop_token", deadline, move || {
            let client = client.clone();
            async move { client.ensure_contract(token_address).await }
        });

        let client = ethereum_client.clone();
        let holder = ContractHandle::spawn_init("onehop_holder", deadline, move || {
            let client = client.clone();
            async move { client.ensure_contract(holder_address).await }
        });

        Self::with_handles(ethereum_client, token, holder)
    }

    pub fn with_handles(
        ethereum_client: EthereumClient,
        token: ContractHandle<Address>,
        holder: ContractHandle<Address>,
    ) -> Self {
        Self {
            ethereum_client,
            token,
            holder,
        }
    }

    pub async fn token_address(&self) -> Result<Address, AdapterError> {
        Ok(self.token.get().await?)
    }

    pub async fn holder_address(&self) -> Result<Address, AdapterError> {
        Ok(self.holder.get().await?)
    }

    pub fn new_position_calldata(holder: Address) -> Bytes {
        IOneHopToken::newPositionCall { holder }.abi_encode().into()
    }

    pub fn move_in_calldata(token_id: U256, market: Address, amount: U256) -> Bytes {
        IPositionHolder::moveInCall {
            tokenId: token_id,
            market,
            amount,
        }
        .abi_encode()
        .into()
    }

    /// Ids of every OneHop position token held by `owner`
    pub async fn positions_of(&self, owner: Address) -> Result<Vec<U256>, AdapterError> {
        let token_address = self.token_address().await?;
        let contract = IOneHopToken::new(token_address, self.ethereum_client.provider().clone());

        let count = contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| AdapterError::ContractError(format!("balanceOf failed: {}", e)))?
            ._0;

        let count: u64 = count
            .try_into()
            .map_err(|_| AdapterError::InvalidData(format!("Position count {} out of range", count)))?;

        let mut ids = Vec::with_capacity(count as usize);
        for index in 0..count {
            let id = contract
                .tokenOfOwnerByIndex(owner, U256::from(index))
                .call()
                .await
                .map_err(|e| AdapterError::ContractError(format!("tokenOfOwnerByIndex({}) failed: {}", index, e)))?;
            ids.push(id._0);
        }

        tracing::debug!(owner = %owner, positions = ids.len(), "Enumerated OneHop positions");
        Ok(ids)
    }
}
