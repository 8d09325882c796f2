use alloy::{
    primitives::{Address, TxHash, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionRequest,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use std::str::FromStr;

use crate::adapters::{AdapterError, TransactionSubmitter};

#[derive(Debug, Clone)]
pub struct EthereumClient {
    provider: RootProvider<Http<Client>>,
    rpc_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EthereumError {
    #[error("RPC connection failed: {0}")]
    RpcError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Contract call failed: {0}")]
    ContractError(String),
}

impl EthereumClient {
    /// Create a new Ethereum client and check the endpoint answers
    pub async fn new(rpc_url: &str) -> Result<Self, EthereumError> {
        let client = Self::connect_lazy(rpc_url)?;
        client.test_connection().await?;
        Ok(client)
    }

    /// Build the client without touching the network
    pub fn connect_lazy(rpc_url: &str) -> Result<Self, EthereumError> {
        let provider = ProviderBuilder::new()
            .on_http(rpc_url.parse().map_err(|e| {
                EthereumError::RpcError(format!("Invalid RPC URL: {}", e))
            })?);

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Test the RPC connection by getting the latest block number
    pub async fn test_connection(&self) -> Result<(), EthereumError> {
        match self.provider.get_block_number().await {
            Ok(block_number) => {
                tracing::info!(
                    rpc_url = %self.rpc_url,
                    block_number = %block_number,
                    "Ethereum RPC connection established"
                );
                Ok(())
            }
            Err(e) => Err(EthereumError::RpcError(format!(
                "Failed to connect to Ethereum RPC: {}", e
            ))),
        }
    }

    /// Validate an Ethereum address
    pub fn validate_address(address: &str) -> Result<Address, EthereumError> {
        if address.ends_with(".eth") {
            return Err(EthereumError::InvalidAddress(
                "ENS names are not supported, pass a hex address".to_string()
            ));
        }

        Address::from_str(address).map_err(|e| {
            EthereumError::InvalidAddress(format!("Invalid address format: {}", e))
        })
    }

    /// Get the ETH balance for an address
    pub async fn get_eth_balance(&self, address: Address) -> Result<U256, EthereumError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| EthereumError::RpcError(format!("Failed to get ETH balance: {}", e)))
    }

    /// Whether any bytecode is deployed at `address`
    pub async fn has_code(&self, address: Address) -> Result<bool, EthereumError> {
        let code = self.provider
            .get_code_at(address)
            .await
            .map_err(|e| EthereumError::RpcError(format!("Failed to get code: {}", e)))?;
        Ok(!code.is_empty())
    }

    /// Confirm bytecode exists at `address`
    pub async fn ensure_contract(&self, address: Address) -> Result<Address, EthereumError> {
        if self.has_code(address).await? {
            Ok(address)
        } else {
            Err(EthereumError::ContractError(format!("No contract deployed at {}", address)))
        }
    }

    /// Get the underlying provider for contract instantiation
    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl TransactionSubmitter for EthereumClient {
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, AdapterError> {
        // eth_sendTransaction: the node-side wallet signs for `from`
        let pending = self.provider
            .send_transaction(tx)
            .await
            .map_err(|e| AdapterError::TransactionRejected(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt_status(&self, hash: TxHash) -> Result<Option<bool>, AdapterError> {
        let receipt = self.provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| AdapterError::RpcError(format!("Failed to get receipt: {}", e)))?;
        Ok(receipt.map(|r| r.status()))
    }
}
