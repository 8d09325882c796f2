use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::adapters::traits::AdapterError;
use crate::blockchain::EthereumClient;
use crate::models::Token;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

pub struct Erc20Adapter {
    ethereum_client: EthereumClient,
}

impl Erc20Adapter {
    pub fn new(ethereum_client: EthereumClient) -> Self {
        Self { ethereum_client }
    }

    pub async fn balance_of(&self, token: &Token, owner: Address) -> Result<U256, AdapterError> {
        if token.is_native() {
            return self.ethereum_client
                .get_eth_balance(owner)
                .await
                .map_err(|e| AdapterError::RpcError(e.to_string()));
        }

        let contract = IERC20::new(token.address, self.ethereum_client.provider().clone());
        let balance = contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| AdapterError::ContractError(format!("{} balanceOf failed: {}", token.symbol, e)))?;
        Ok(balance._0)
    }

    /// Native ether never needs an approval
    pub async fn allowance(&self, token: &Token, owner: Address, spender: Address) -> Result<U256, AdapterError> {
        if token.is_native() {
            return Ok(U256::MAX);
        }

        let contract = IERC20::new(token.address, self.ethereum_client.provider().clone());
        let allowance = contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| AdapterError::ContractError(format!("{} allowance failed: {}", token.symbol, e)))?;
        Ok(allowance._0)
    }

    pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
        IERC20::approveCall { spender, amount }.abi_encode().into()
    }
}
