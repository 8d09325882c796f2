mod common;

use bigdecimal::BigDecimal;
use std::str::FromStr;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{poller_harness, MockMarkets, WALLET};
use onehop_migrator::models::PositionSide;
use onehop_migrator::services::{PageVisibility, PollerState};

const INTERVAL: Duration = Duration::from_secs(5);

async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[tokio::test]
async fn test_refresh_without_wallet_is_noop() {
    let harness = poller_harness(MockMarkets::default(), Duration::ZERO, INTERVAL);

    harness.poller.refresh().await.unwrap();

    assert_eq!(harness.savings.calls(), 0);
    assert!(harness.poller.snapshot().await.updated_at.is_none());
}

#[tokio::test]
async fn test_refresh_keeps_only_non_zero_balances() {
    let markets = MockMarkets::default()
        // 1234.5678901234 DAI
        .with_supplied("cDAI", 1_234_567_890_123_400_000_000)
        // 250.5 USDC
        .with_borrowed("cUSDC", 250_500_000);
    let harness = poller_harness(markets, Duration::ZERO, INTERVAL);
    harness.wallet.connect(WALLET).await;

    harness.poller.refresh().await.unwrap();
    let snapshot = harness.poller.snapshot().await;

    assert_eq!(snapshot.wallet, Some(WALLET));
    assert_eq!(snapshot.lending.len(), 1);
    assert_eq!(snapshot.borrowing.len(), 1);

    let lending = &snapshot.lending[0];
    assert_eq!(lending.token.symbol, "DAI");
    assert_eq!(lending.side, PositionSide::Lending);
    assert_eq!(lending.balance, BigDecimal::from_str("1234.56789").unwrap());

    let borrowing = &snapshot.borrowing[0];
    assert_eq!(borrowing.token.symbol, "USDC");
    assert_eq!(borrowing.balance, BigDecimal::from_str("250.5").unwrap());

    // Half utilised market at ~2.12% borrow
    assert_eq!(borrowing.apy, BigDecimal::from_str("2.12").unwrap());
    // 2.1246... * 0.5 / 0.9
    assert_eq!(lending.apy, BigDecimal::from_str("1.18").unwrap());
    assert!(lending.apy <= borrowing.apy);

    assert_eq!(snapshot.savings_rate, BigDecimal::from(5));
}

#[tokio::test]
async fn test_failed_cycle_leaves_snapshot_untouched() {
    let markets = MockMarkets::default().with_supplied("cETH", 1_000_000_000_000_000_000);
    let harness = poller_harness(markets, Duration::ZERO, INTERVAL);
    harness.wallet.connect(WALLET).await;

    harness.poller.refresh().await.unwrap();
    let before = harness.poller.snapshot().await;
    assert_eq!(before.lending.len(), 1);

    harness.markets.fail.store(true, Ordering::SeqCst);
    assert!(harness.poller.refresh().await.is_err());

    let after = harness.poller.snapshot().await;
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(after.lending.len(), 1);
    assert_eq!(harness.poller.state(), PollerState::Idle);
}

#[tokio::test]
async fn test_savings_failure_keeps_previous_rate() {
    let markets = MockMarkets::default().with_supplied("cDAI", 1_000_000_000_000_000_000);
    let harness = poller_harness(markets, Duration::ZERO, INTERVAL);
    harness.wallet.connect(WALLET).await;

    harness.poller.refresh().await.unwrap();
    assert_eq!(harness.poller.snapshot().await.savings_rate, BigDecimal::from(5));

    harness.savings.fail.store(true, Ordering::SeqCst);
    harness.poller.refresh().await.unwrap();

    let snapshot = harness.poller.snapshot().await;
    assert_eq!(snapshot.lending.len(), 1);
    assert_eq!(snapshot.savings_rate, BigDecimal::from(5));
    assert_eq!(harness.savings.calls(), 2);
}

#[tokio::test]
async fn test_savings_failure_still_publishes_positions() {
    let markets = MockMarkets::default().with_borrowed("cUSDC", 250_500_000);
    let harness = poller_harness(markets, Duration::ZERO, INTERVAL);
    harness.savings.fail.store(true, Ordering::SeqCst);
    harness.wallet.connect(WALLET).await;

    harness.poller.refresh().await.unwrap();

    let snapshot = harness.poller.snapshot().await;
    assert_eq!(snapshot.wallet, Some(WALLET));
    assert_eq!(snapshot.borrowing.len(), 1);
    assert!(snapshot.updated_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_cycles_start_on_fixed_cadence() {
    let harness = poller_harness(MockMarkets::default(), Duration::from_secs(1), INTERVAL);
    harness.wallet.connect(WALLET).await;

    let handle = tokio::spawn(harness.poller.clone().run());
    settle(Duration::from_millis(12_500)).await;

    // t = 0, 5, 10 regardless of the 1s cycle time
    assert_eq!(harness.savings.calls(), 3);

    harness.poller.shutdown();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_overrunning_cycle_is_followed_immediately() {
    let harness = poller_harness(MockMarkets::default(), Duration::from_secs(7), INTERVAL);
    harness.wallet.connect(WALLET).await;

    let handle = tokio::spawn(harness.poller.clone().run());
    settle(Duration::from_millis(15_500)).await;

    // t = 0, 7, 14
    assert_eq!(harness.savings.calls(), 3);

    harness.poller.shutdown();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_hidden_page_skips_cycles() {
    let harness = poller_harness(MockMarkets::default(), Duration::ZERO, INTERVAL);
    harness.wallet.connect(WALLET).await;
    harness.poller.on_visibility_change(PageVisibility::Hidden);

    let handle = tokio::spawn(harness.poller.clone().run());
    settle(Duration::from_millis(12_500)).await;
    assert_eq!(harness.savings.calls(), 0);
    assert!(!harness.poller.is_sync_enabled());

    harness.poller.on_visibility_change(PageVisibility::Visible);
    // Next tick at t = 15
    settle(Duration::from_secs(1)).await;
    assert_eq!(harness.savings.calls(), 0);
    settle(Duration::from_secs(2)).await;
    assert_eq!(harness.savings.calls(), 1);

    harness.poller.shutdown();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_scheduling() {
    let harness = poller_harness(MockMarkets::default(), Duration::ZERO, INTERVAL);
    harness.wallet.connect(WALLET).await;

    let handle = tokio::spawn(harness.poller.clone().run());
    settle(Duration::from_secs(1)).await;
    assert_eq!(harness.savings.calls(), 1);

    harness.poller.shutdown();
    handle.await.unwrap();

    settle(Duration::from_secs(30)).await;
    assert_eq!(harness.savings.calls(), 1);
    assert!(harness.poller.is_destroyed());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_mid_cycle_discards_result() {
    let markets = MockMarkets::default().with_supplied("cDAI", 1_000_000_000_000_000_000);
    let harness = poller_harness(markets, Duration::from_secs(3), INTERVAL);
    harness.wallet.connect(WALLET).await;

    let handle = tokio::spawn(harness.poller.clone().run());
    settle(Duration::from_secs(1)).await;
    assert_eq!(harness.poller.state(), PollerState::Syncing);

    harness.poller.shutdown();
    handle.await.unwrap();

    let snapshot = harness.poller.snapshot().await;
    assert!(snapshot.updated_at.is_none());
    assert!(snapshot.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_wallet_connect_triggers_refresh() {
    let markets = MockMarkets::default().with_supplied("cDAI", 1_000_000_000_000_000_000);
    let harness = poller_harness(markets, Duration::ZERO, INTERVAL);

    let handle = tokio::spawn(harness.poller.clone().run());
    settle(Duration::from_secs(1)).await;
    assert_eq!(harness.savings.calls(), 0);

    harness.wallet.connect(WALLET).await;
    settle(Duration::from_millis(100)).await;
    assert_eq!(harness.savings.calls(), 1);
    assert_eq!(harness.poller.snapshot().await.lending.len(), 1);

    harness.wallet.disconnect().await;
    settle(Duration::from_millis(100)).await;
    let snapshot = harness.poller.snapshot().await;
    assert!(snapshot.is_empty());
    assert!(snapshot.wallet.is_none());
    assert_eq!(snapshot.savings_rate, BigDecimal::from(5));

    harness.poller.shutdown();
    handle.await.unwrap();
}
