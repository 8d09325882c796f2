use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Token;
use crate::utils::math::{format_units, to_fixed};

/// Decimal places shown for rates
pub const RATE_PLACES: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Lending,
    Borrowing,
}

impl PositionSide {
    /// Decimal places shown for balances on this side
    pub fn balance_places(&self) -> i64 {
        match self {
            PositionSide::Lending => 5,
            PositionSide::Borrowing => 6,
        }
    }
}

/// One non-zero balance of a wallet in a money market
#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub token: Token,
    pub side: PositionSide,
    pub balance: BigDecimal,
    pub raw_balance: U256,
    /// Annualised rate in percent
    pub apy: BigDecimal,
}

impl Position {
    pub fn new(token: Token, side: PositionSide, raw_balance: U256, annual_rate: &BigDecimal) -> Self {
        let balance = to_fixed(&format_units(&raw_balance, token.decimals), side.balance_places());

        Self {
            token,
            side,
            balance,
            raw_balance,
            apy: to_fixed(annual_rate, RATE_PLACES),
        }
    }
}

/// Everything the poller knows about a wallet after one refresh
#[derive(Debug, Clone, Default, Serialize)]
pub struct PositionSnapshot {
    pub wallet: Option<Address>,
    pub lending: Vec<Position>,
    pub borrowing: Vec<Position>,
    /// Maker DSR in percent
    pub savings_rate: BigDecimal,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PositionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lending.is_empty() && self.borrowing.is_empty()
    }

    /// Same market data with the wallet's positions removed
    pub fn without_positions(&self) -> Self {
        Self {
            wallet: None,
            lending: Vec::new(),
            borrowing: Vec::new(),
            savings_rate: self.savings_rate.clone(),
            updated_at: Some(Utc::now()),
        }
    }
}
