use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use proptest::prelude::*;

use onehop_migrator::{
    models::{MarketState, Position, PositionSide, Token},
    services::rate_calculator::CompoundRateCalculator,
    utils::math::{format_units, to_fixed},
};

/// Per-block rates up to ~1e-7 (above 20% a year)
fn per_block_rate() -> impl Strategy<Value = u64> {
    0u64..100_000_000_000u64
}

fn market_amount() -> impl Strategy<Value = u128> {
    0u128..1_000_000_000_000_000_000_000_000u128
}

/// (borrows, cash) with utilisation at most 90%, the supplier share after reserves
fn reserve_bounded_market() -> impl Strategy<Value = (u128, u128)> {
    market_amount().prop_flat_map(|cash| (0u128..=cash * 9, Just(cash)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Up to 90% utilisation suppliers never earn more than borrowers pay
    #[test]
    fn test_lend_rate_never_exceeds_borrow_rate(
        rate in per_block_rate(),
        (borrows, cash) in reserve_bounded_market(),
    ) {
        let rates = CompoundRateCalculator::default().rates(&MarketState {
            borrow_rate_per_block: U256::from(rate),
            total_borrows: U256::from(borrows),
            cash: U256::from(cash),
        });

        prop_assert!(rates.annual_lend_rate >= BigDecimal::zero());
        prop_assert!(rates.annual_lend_rate <= rates.annual_borrow_rate);
    }

    /// A higher per-block rate never yields a lower annual rate
    #[test]
    fn test_borrow_rate_is_monotonic(a in per_block_rate(), b in per_block_rate()) {
        let calculator = CompoundRateCalculator::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };

        let low_rate = calculator.annual_borrow_rate(&U256::from(low));
        let high_rate = calculator.annual_borrow_rate(&U256::from(high));
        prop_assert!(low_rate <= high_rate);
    }

    /// Displayed balances are truncated, never rounded up
    #[test]
    fn test_position_balance_is_truncated(raw in market_amount(), decimals in prop::sample::select(vec![6u8, 8, 18])) {
        let token = Token::new("TKN", "Token", decimals, alloy::primitives::Address::ZERO);
        let raw = U256::from(raw);
        let exact = format_units(&raw, decimals);

        for side in [PositionSide::Lending, PositionSide::Borrowing] {
            let position = Position::new(token.clone(), side, raw, &BigDecimal::zero());
            prop_assert!(position.balance <= exact);
            prop_assert_eq!(&position.balance, &to_fixed(&exact, side.balance_places()));
        }
    }
}
