use alloy::primitives::{Address, Bytes, TxHash, U256};
use bigdecimal::BigDecimal;
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::adapters::{Erc20Adapter, OneHopAdapter};
use crate::blockchain::WalletSession;
use crate::error::AppError;
use crate::models::{GasTier, Token, TokenRegistry};
use crate::services::gas_price_oracle::GasPriceOracle;
use crate::services::transaction_service::{contract_call, TransactionService};
use crate::utils::math::{format_units, parse_units};

#[derive(Debug, Clone, Serialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub balance: BigDecimal,
    pub raw_balance: U256,
}

/// Builds and sends the OneHop position transactions for the connected wallet
pub struct MigrationService {
    wallet: Arc<WalletSession>,
    registry: Arc<TokenRegistry>,
    one_hop: OneHopAdapter,
    erc20: Erc20Adapter,
    transactions: Arc<TransactionService>,
    gas: Arc<GasPriceOracle>,
}

impl MigrationService {
    pub fn new(
        wallet: Arc<WalletSession>,
        registry: Arc<TokenRegistry>,
        one_hop: OneHopAdapter,
        erc20: Erc20Adapter,
        transactions: Arc<TransactionService>,
        gas: Arc<GasPriceOracle>,
    ) -> Self {
        Self {
            wallet,
            registry,
            one_hop,
            erc20,
            transactions,
            gas,
        }
    }

    async fn connected_wallet(&self) -> Result<Address, AppError> {
        self.wallet
            .address()
            .await
            .ok_or_else(|| AppError::ValidationError("No wallet connected".to_string()))
    }

    fn market(&self, symbol: &str) -> Result<&Token, AppError> {
        self.registry
            .markets()
            .iter()
            .find(|m| m.symbol == symbol)
            .ok_or_else(|| AppError::NotFound(format!("Unknown market {}", symbol)))
    }

    async fn send(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash, AppError> {
        let gas_price = self.gas.price(GasTier::Fast).await;
        self.transactions.submit(contract_call(from, to, data, gas_price)).await
    }

    /// Mint a fresh position token bound to the holder contract
    pub async fn new_position(&self) -> Result<TxHash, AppError> {
        let from = self.connected_wallet().await?;
        let token = self.one_hop.token_address().await?;
        let holder = self.one_hop.holder_address().await?;

        let hash = self.send(from, token, OneHopAdapter::new_position_calldata(holder)).await?;
        info!(wallet = %from, tx_hash = %hash, "New OneHop position requested");
        Ok(hash)
    }

    pub async fn positions_of(&self, owner: Option<Address>) -> Result<Vec<U256>, AppError> {
        let owner = match owner {
            Some(owner) => owner,
            None => self.connected_wallet().await?,
        };
        Ok(self.one_hop.positions_of(owner).await?)
    }

    /// Let the holder contract pull `amount` of the market token
    pub async fn approve_market(&self, market_symbol: &str, amount: &BigDecimal) -> Result<TxHash, AppError> {
        let from = self.connected_wallet().await?;
        let market = self.market(market_symbol)?;
        let raw = parse_units(amount, market.decimals).map_err(AppError::ValidationError)?;
        let holder = self.one_hop.holder_address().await?;

        let hash = self
            .send(from, market.address, Erc20Adapter::approve_calldata(holder, raw))
            .await?;
        info!(wallet = %from, market = %market.symbol, amount = %amount, tx_hash = %hash, "Market approval sent");
        Ok(hash)
    }

    /// Move `amount` of a market position into OneHop position `position_id`
    pub async fn move_in(&self, position_id: U256, market_symbol: &str, amount: &BigDecimal) -> Result<TxHash, AppError> {
        let from = self.connected_wallet().await?;
        let market = self.market(market_symbol)?;
        let raw = parse_units(amount, market.decimals).map_err(AppError::ValidationError)?;
        if raw.is_zero() {
            return Err(AppError::ValidationError("Amount must be greater than zero".to_string()));
        }
        let holder = self.one_hop.holder_address().await?;

        let hash = self
            .send(from, holder, OneHopAdapter::move_in_calldata(position_id, market.address, raw))
            .await?;
        info!(
            wallet = %from,
            position_id = %position_id,
            market = %market.symbol,
            amount = %amount,
            tx_hash = %hash,
            "Move-in sent"
        );
        Ok(hash)
    }

    /// How much of a market token the holder contract may currently pull
    pub async fn market_allowance(&self, market_symbol: &str) -> Result<TokenBalance, AppError> {
        let owner = self.connected_wallet().await?;
        let market = self.market(market_symbol)?;
        let holder = self.one_hop.holder_address().await?;

        let raw = self.erc20.allowance(market, owner, holder).await?;
        Ok(TokenBalance {
            symbol: market.symbol.clone(),
            balance: format_units(&raw, market.decimals),
            raw_balance: raw,
        })
    }

    /// Balances of every known token and market for the connected wallet
    pub async fn wallet_balances(&self) -> Result<Vec<TokenBalance>, AppError> {
        let owner = self.connected_wallet().await?;
        let tokens: Vec<&Token> = self.registry.tokens().iter().chain(self.registry.markets()).collect();

        let raw = try_join_all(tokens.iter().map(|token| self.erc20.balance_of(token, owner))).await?;

        Ok(tokens
            .into_iter()
            .zip(raw)
            .map(|(token, raw_balance)| TokenBalance {
                symbol: token.symbol.clone(),
                balance: format_units(&raw_balance, token.decimals),
                raw_balance,
            })
            .collect())
    }
}
