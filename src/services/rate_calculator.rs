use alloy::primitives::{Address, U256};
use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use std::sync::Arc;
use tracing::debug;

use crate::adapters::{AdapterError, LendingMarketReader};
use crate::models::{InterestRates, MarketState, TokenRegistry};
use crate::utils::math::{
    format_units, pow_round_down, round_significant, truncate_significant, u256_to_decimal,
    WAD_PRECISION,
};

pub const SECONDS_PER_YEAR: u64 = 60 * 60 * 24 * 365;
pub const DEFAULT_SECONDS_PER_BLOCK: u64 = 15;

/// Decimals of Compound's per-block rate mantissa
const RATE_DECIMALS: u8 = 18;
/// Decimals of Maker's per-second DSR (ray)
const RAY_DECIMALS: u8 = 27;
/// Significant digits the savings rate is presented with
const SAVINGS_RATE_DIGITS: u64 = 2;

/// Annualises Compound per-block rates
#[derive(Debug, Clone)]
pub struct CompoundRateCalculator {
    blocks_per_year: u64,
    reserve_factor: BigDecimal,
}

impl CompoundRateCalculator {
    pub fn new(seconds_per_block: u64) -> Self {
        Self {
            blocks_per_year: SECONDS_PER_YEAR / seconds_per_block.max(1),
            // 10%
            reserve_factor: BigDecimal::new(BigInt::from(1), 1),
        }
    }

    pub fn with_reserve_factor(mut self, reserve_factor: BigDecimal) -> Self {
        self.reserve_factor = reserve_factor;
        self
    }

    pub fn blocks_per_year(&self) -> u64 {
        self.blocks_per_year
    }

    /// `((rate / 1e18 + 1) ^ blocksPerYear - 1) * 100`, rounded down
    pub fn annual_borrow_rate(&self, borrow_rate_per_block: &U256) -> BigDecimal {
        let per_block = format_units(borrow_rate_per_block, RATE_DECIMALS);
        let growth = pow_round_down(&(per_block + BigDecimal::one()), self.blocks_per_year, WAD_PRECISION);

        truncate_significant(&((growth - BigDecimal::one()) * BigDecimal::from(100)), WAD_PRECISION)
    }

    /// `annualBorrowRate * totalBorrows / (totalBorrows + cash) / (1 - reserveFactor)`.
    /// A market with no borrows pays suppliers nothing.
    pub fn annual_lend_rate(&self, annual_borrow_rate: &BigDecimal, total_borrows: &U256, cash: &U256) -> BigDecimal {
        let supplier_share = BigDecimal::one() - &self.reserve_factor;
        if total_borrows.is_zero() || supplier_share <= BigDecimal::zero() {
            return BigDecimal::zero();
        }

        let borrows = u256_to_decimal(total_borrows);
        let supplied = &borrows + u256_to_decimal(cash);
        let earned = truncate_significant(&(annual_borrow_rate * &borrows), WAD_PRECISION);
        let per_supplied = truncate_significant(&(&earned / &supplied), WAD_PRECISION);

        truncate_significant(&(&per_supplied / &supplier_share), WAD_PRECISION)
    }

    pub fn rates(&self, state: &MarketState) -> InterestRates {
        let annual_borrow_rate = self.annual_borrow_rate(&state.borrow_rate_per_block);
        let annual_lend_rate = self.annual_lend_rate(&annual_borrow_rate, &state.total_borrows, &state.cash);

        InterestRates {
            annual_lend_rate,
            annual_borrow_rate,
        }
    }
}

impl Default for CompoundRateCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_SECONDS_PER_BLOCK)
    }
}

/// `((dsr / 1e27) ^ secondsPerYear - 1) * 100` to two significant digits
pub fn annual_savings_rate(dsr_per_second: &U256) -> BigDecimal {
    let per_second = format_units(dsr_per_second, RAY_DECIMALS);
    let growth = pow_round_down(&per_second, SECONDS_PER_YEAR, WAD_PRECISION);

    round_significant(&((growth - BigDecimal::one()) * BigDecimal::from(100)), SAVINGS_RATE_DIGITS)
}

/// Rates of the money market backing an underlying token
pub struct InterestRateService {
    registry: Arc<TokenRegistry>,
    markets: Arc<dyn LendingMarketReader>,
    calculator: CompoundRateCalculator,
}

impl InterestRateService {
    pub fn new(
        registry: Arc<TokenRegistry>,
        markets: Arc<dyn LendingMarketReader>,
        calculator: CompoundRateCalculator,
    ) -> Self {
        Self {
            registry,
            markets,
            calculator,
        }
    }

    /// Zero rates when the token has no market
    pub async fn interest(&self, underlying: Address) -> Result<InterestRates, AdapterError> {
        let Some(market) = self.registry.market_for(underlying) else {
            debug!(token = %underlying, "No market for token, using zero rates");
            return Ok(InterestRates::zero());
        };

        let state = self.markets.market_state(market.address).await?;
        let rates = self.calculator.rates(&state);

        debug!(
            market = %market.symbol,
            protocol = self.markets.protocol_name(),
            lend = %rates.annual_lend_rate,
            borrow = %rates.annual_borrow_rate,
            "Computed market rates"
        );

        Ok(rates)
    }
}
