#![allow(dead_code)]

use alloy::primitives::{address, Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use onehop_migrator::{
    adapters::{AdapterError, Erc20Adapter, LendingMarketReader, OneHopAdapter, SavingsRateReader, TransactionSubmitter},
    blockchain::{ContractHandle, EthereumClient, WalletSession},
    config::Settings,
    models::{MarketState, TokenRegistry},
    services::{CompoundRateCalculator, GasPriceOracle, MigrationService, PositionPoller, TransactionService},
    AppState,
};

pub const WALLET: Address = address!("1234567890123456789012345678901234567890");
pub const ONEHOP_TOKEN: Address = address!("e2AeE679e50D2f391517E2f4006bA5aB1e6b1D22");
pub const ONEHOP_HOLDER: Address = address!("563200e2e4Cd1cB8114091174C555c5AE2418Fcf");

/// 5% a year, per second, as a ray
pub fn five_percent_dsr() -> U256 {
    U256::from_str("1000000001547125957863212448").unwrap()
}

pub fn market_address(symbol: &str) -> Address {
    TokenRegistry::mainnet().by_symbol(symbol).unwrap().address
}

#[derive(Default)]
pub struct MockMarkets {
    pub supplied: HashMap<Address, U256>,
    pub borrowed: HashMap<Address, U256>,
    pub state: Option<MarketState>,
    pub fail: AtomicBool,
}

impl MockMarkets {
    pub fn with_supplied(mut self, symbol: &str, raw: u128) -> Self {
        self.supplied.insert(market_address(symbol), U256::from(raw));
        self
    }

    pub fn with_borrowed(mut self, symbol: &str, raw: u128) -> Self {
        self.borrowed.insert(market_address(symbol), U256::from(raw));
        self
    }

    fn check(&self) -> Result<(), AdapterError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(AdapterError::RpcError("node unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LendingMarketReader for MockMarkets {
    fn protocol_name(&self) -> &'static str {
        "mock"
    }

    async fn supplied_balance(&self, market: Address, _owner: Address) -> Result<U256, AdapterError> {
        self.check()?;
        Ok(self.supplied.get(&market).copied().unwrap_or(U256::ZERO))
    }

    async fn borrowed_balance(&self, market: Address, _owner: Address) -> Result<U256, AdapterError> {
        self.check()?;
        Ok(self.borrowed.get(&market).copied().unwrap_or(U256::ZERO))
    }

    async fn market_state(&self, _market: Address) -> Result<MarketState, AdapterError> {
        self.check()?;
        Ok(self.state.unwrap_or(MarketState {
            // 1e-8 per block
            borrow_rate_per_block: U256::from(10_000_000_000u64),
            total_borrows: U256::from(500u64),
            cash: U256::from(500u64),
        }))
    }
}

/// Counts cycles: every refresh reads the savings rate exactly once
pub struct MockSavings {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub fail: AtomicBool,
}

impl MockSavings {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
            fail: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SavingsRateReader for MockSavings {
    async fn savings_rate_per_second(&self) -> Result<U256, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AdapterError::RpcError("pot read failed".to_string()));
        }
        Ok(five_percent_dsr())
    }
}

#[derive(Default)]
pub struct RecordingSubmitter {
    pub sent: Mutex<Vec<TransactionRequest>>,
}

#[async_trait]
impl TransactionSubmitter for RecordingSubmitter {
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, AdapterError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx);
        Ok(TxHash::with_last_byte(sent.len() as u8))
    }

    async fn receipt_status(&self, _hash: TxHash) -> Result<Option<bool>, AdapterError> {
        Ok(Some(true))
    }
}

pub struct Harness {
    pub wallet: Arc<WalletSession>,
    pub markets: Arc<MockMarkets>,
    pub savings: Arc<MockSavings>,
    pub poller: Arc<PositionPoller>,
}

pub fn poller_harness(markets: MockMarkets, savings_delay: Duration, interval: Duration) -> Harness {
    let wallet = Arc::new(WalletSession::new());
    let markets = Arc::new(markets);
    let savings = Arc::new(MockSavings::new(savings_delay));

    let poller = Arc::new(PositionPoller::new(
        wallet.clone(),
        Arc::new(TokenRegistry::mainnet()),
        markets.clone(),
        savings.clone(),
        CompoundRateCalculator::default(),
        interval,
    ));

    Harness {
        wallet,
        markets,
        savings,
        poller,
    }
}

/// Offline migration service: contract handles pre-resolved, transactions recorded
pub fn migration_service(wallet: Arc<WalletSession>) -> (MigrationService, Arc<RecordingSubmitter>, Arc<TransactionService>) {
    let settings = Settings::default();
    let client = EthereumClient::connect_lazy(&settings.blockchain.ethereum_rpc_url).unwrap();
    let submitter = Arc::new(RecordingSubmitter::default());
    let transactions = Arc::new(TransactionService::new(
        submitter.clone(),
        Duration::from_millis(10),
        Duration::from_secs(1),
    ));

    let one_hop = OneHopAdapter::with_handles(
        client.clone(),
        ContractHandle::ready("onehop_token", ONEHOP_TOKEN),
        ContractHandle::ready("onehop_holder", ONEHOP_HOLDER),
    );

    let service = MigrationService::new(
        wallet,
        Arc::new(TokenRegistry::mainnet()),
        one_hop,
        Erc20Adapter::new(client),
        transactions.clone(),
        Arc::new(GasPriceOracle::new(&settings.gas_price).unwrap()),
    );

    (service, submitter, transactions)
}

pub fn app_state(markets: MockMarkets) -> (AppState, Arc<RecordingSubmitter>) {
    let settings = Settings::default();
    let harness = poller_harness(markets, Duration::ZERO, settings.poll_interval());
    let (migrations, submitter, transactions) = migration_service(harness.wallet.clone());

    let state = AppState {
        gas_oracle: Arc::new(GasPriceOracle::new(&settings.gas_price).unwrap()),
        settings,
        registry: Arc::new(TokenRegistry::mainnet()),
        wallet: harness.wallet,
        poller: harness.poller,
        transactions,
        migrations: Arc::new(migrations),
    };

    (state, submitter)
}
