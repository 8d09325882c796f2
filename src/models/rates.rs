use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::Serialize;

/// Annualised rates of a market, in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestRates {
    pub annual_lend_rate: BigDecimal,
    pub annual_borrow_rate: BigDecimal,
}

impl InterestRates {
    pub fn zero() -> Self {
        Self {
            annual_lend_rate: BigDecimal::zero(),
            annual_borrow_rate: BigDecimal::zero(),
        }
    }
}

/// Raw cToken reads needed for rate computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketState {
    /// 1e18-scaled borrow rate per block
    pub borrow_rate_per_block: U256,
    pub total_borrows: U256,
    pub cash: U256,
}
