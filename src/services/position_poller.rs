use alloy::primitives::{Address, U256};
use chrono::Utc;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::adapters::{AdapterError, LendingMarketReader, SavingsRateReader};
use crate::blockchain::{WalletEvent, WalletSession};
use crate::error::AppError;
use crate::models::{Position, PositionSide, PositionSnapshot, Token, TokenRegistry};
use crate::services::rate_calculator::{annual_savings_rate, CompoundRateCalculator, InterestRateService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageVisibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    Idle,
    Syncing,
}

/// Keeps a wallet's money-market positions fresh on a fixed cadence.
///
/// A cycle starts every `interval` measured from the start of the previous
/// one. A cycle that overruns the interval is followed immediately by the
/// next. While the UI is hidden cycles are skipped but the cadence keeps
/// running. A cycle either publishes a whole new snapshot or leaves the
/// previous one untouched.
pub struct PositionPoller {
    wallet: Arc<WalletSession>,
    registry: Arc<TokenRegistry>,
    markets: Arc<dyn LendingMarketReader>,
    savings: Arc<dyn SavingsRateReader>,
    rates: InterestRateService,
    snapshot: RwLock<PositionSnapshot>,
    interval: Duration,
    sync_enabled: AtomicBool,
    syncing: AtomicBool,
    destroyed: watch::Sender<bool>,
}

impl PositionPoller {
    pub fn new(
        wallet: Arc<WalletSession>,
        registry: Arc<TokenRegistry>,
        markets: Arc<dyn LendingMarketReader>,
        savings: Arc<dyn SavingsRateReader>,
        calculator: CompoundRateCalculator,
        interval: Duration,
    ) -> Self {
        let rates = InterestRateService::new(registry.clone(), markets.clone(), calculator);
        let (destroyed, _) = watch::channel(false);

        Self {
            wallet,
            registry,
            markets,
            savings,
            rates,
            snapshot: RwLock::new(PositionSnapshot::default()),
            interval,
            sync_enabled: AtomicBool::new(true),
            syncing: AtomicBool::new(false),
            destroyed,
        }
    }

    pub async fn snapshot(&self) -> PositionSnapshot {
        self.snapshot.read().await.clone()
    }

    pub fn state(&self) -> PollerState {
        if self.syncing.load(Ordering::SeqCst) {
            PollerState::Syncing
        } else {
            PollerState::Idle
        }
    }

    pub fn is_sync_enabled(&self) -> bool {
        self.sync_enabled.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        *self.destroyed.borrow()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn on_visibility_change(&self, visibility: PageVisibility) {
        let enabled = visibility == PageVisibility::Visible;
        let previous = self.sync_enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            info!(?visibility, "Position sync {}", if enabled { "resumed" } else { "paused" });
        }
    }

    /// Stop scheduling cycles. An in-flight cycle finishes but its result is dropped.
    pub fn shutdown(&self) {
        if !self.destroyed.send_replace(true) {
            info!("Position poller shutting down");
        }
    }

    /// Drive cycles until `shutdown` is called
    pub async fn run(self: Arc<Self>) {
        let mut destroyed = self.destroyed.subscribe();
        let mut wallet_events = self.wallet.subscribe();

        info!(interval_ms = self.interval.as_millis() as u64, "Position poller started");

        while !self.is_destroyed() {
            let started = Instant::now();
            self.run_cycle().await;

            let deadline = started + self.interval;
            if Instant::now() >= deadline {
                debug!("Cycle overran the interval, starting the next one now");
                continue;
            }

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {}
                _ = destroyed.changed() => break,
                event = wallet_events.recv() => match event {
                    Ok(WalletEvent::Connected(address)) => {
                        info!(wallet = %address, "Wallet connected, refreshing positions");
                    }
                    Ok(WalletEvent::Disconnected) => {
                        info!("Wallet disconnected, clearing positions");
                        self.clear_positions().await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed wallet events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tokio::select! {
                            _ = tokio::time::sleep_until(deadline) => {}
                            _ = destroyed.changed() => break,
                        }
                    }
                },
            }
        }

        info!("Position poller stopped");
    }

    async fn run_cycle(&self) {
        if !self.is_sync_enabled() {
            debug!("Position sync paused, skipping cycle");
            return;
        }

        if let Err(e) = self.refresh().await {
            error!(error = %e, "Position refresh failed");
        }
    }

    /// One full refresh of the connected wallet. No-op without a wallet.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let Some(owner) = self.wallet.address().await else {
            debug!("No wallet connected, nothing to refresh");
            return Ok(());
        };

        self.syncing.store(true, Ordering::SeqCst);
        let loaded = self.load_snapshot(owner).await;
        self.syncing.store(false, Ordering::SeqCst);
        let snapshot = loaded?;

        if self.is_destroyed() {
            debug!("Poller shut down mid-cycle, discarding result");
            return Ok(());
        }

        if self.wallet.address().await != Some(owner) {
            debug!(wallet = %owner, "Wallet changed mid-cycle, discarding result");
            return Ok(());
        }

        info!(
            wallet = %owner,
            lending = snapshot.lending.len(),
            borrowing = snapshot.borrowing.len(),
            savings_rate = %snapshot.savings_rate,
            "Positions refreshed"
        );

        *self.snapshot.write().await = snapshot;
        Ok(())
    }

    async fn clear_positions(&self) {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = snapshot.without_positions();
    }

    async fn load_snapshot(&self, owner: Address) -> Result<PositionSnapshot, AppError> {
        let markets = self.registry.markets();

        let supplied = try_join_all(
            markets.iter().map(|market| self.markets.supplied_balance(market.address, owner)),
        );
        let borrowed = try_join_all(
            markets.iter().map(|market| self.markets.borrowed_balance(market.address, owner)),
        );

        let positions = async {
            let (supplied, borrowed) = tokio::try_join!(supplied, borrowed)?;
            tokio::try_join!(
                self.attach_rates(markets, supplied, PositionSide::Lending),
                self.attach_rates(markets, borrowed, PositionSide::Borrowing),
            )
        };

        let (positions, dsr) = tokio::join!(positions, self.savings.savings_rate_per_second());
        let (lending, borrowing) = positions?;

        // A failed savings read keeps the last known rate
        let savings_rate = match dsr {
            Ok(dsr) => annual_savings_rate(&dsr),
            Err(e) => {
                warn!(error = %e, "Savings rate read failed, keeping previous value");
                self.snapshot.read().await.savings_rate.clone()
            }
        };

        Ok(PositionSnapshot {
            wallet: Some(owner),
            lending,
            borrowing,
            savings_rate,
            updated_at: Some(Utc::now()),
        })
    }

    /// Turn raw market balances into positions, skipping empty ones
    async fn attach_rates(
        &self,
        markets: &[Token],
        balances: Vec<U256>,
        side: PositionSide,
    ) -> Result<Vec<Position>, AdapterError> {
        let held = markets
            .iter()
            .zip(balances)
            .filter(|(_, raw)| !raw.is_zero())
            .map(|(market, raw)| async move {
                let token = self
                    .registry
                    .underlying_for(market)
                    .cloned()
                    .ok_or_else(|| AdapterError::UnknownToken(market.symbol.clone()))?;

                let rates = self.rates.interest(token.address).await?;
                let rate = match side {
                    PositionSide::Lending => rates.annual_lend_rate,
                    PositionSide::Borrowing => rates.annual_borrow_rate,
                };

                Ok::<_, AdapterError>(Position::new(token, side, raw, &rate))
            });

        try_join_all(held).await
    }
}
