use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub blockchain: BlockchainSettings,
    pub wallet: WalletSettings,
    pub contracts: ContractSettings,
    pub gas_price: GasPriceSettings,
    pub poller: PollerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainSettings {
    pub ethereum_rpc_url: String,
    /// Average block time used to annualise per-block rates.
    pub seconds_per_block: u64,
    pub confirmation_poll_ms: u64,
    pub confirmation_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSettings {
    /// Wallet to connect at startup. The UI can connect one later instead.
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSettings {
    pub mcd_pot_address: String,
    pub holder_address: String,
    pub token_address: String,
    pub init_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasPriceSettings {
    pub primary_url: String,
    pub fallback_url: String,
    pub cors_proxy_url: String,
    pub refresh_interval_seconds: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerSettings {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api: ApiSettings::default(),
            blockchain: BlockchainSettings::default(),
            wallet: WalletSettings::default(),
            contracts: ContractSettings::default(),
            gas_price: GasPriceSettings::default(),
            poller: PollerSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for BlockchainSettings {
    fn default() -> Self {
        BlockchainSettings {
            ethereum_rpc_url: "http://localhost:8545".to_string(),
            seconds_per_block: 15,
            confirmation_poll_ms: 1000,
            confirmation_timeout_seconds: 600,
        }
    }
}

impl Default for WalletSettings {
    fn default() -> Self {
        WalletSettings { address: None }
    }
}

impl Default for ContractSettings {
    fn default() -> Self {
        ContractSettings {
            mcd_pot_address: "0x197E90f9FAD81970bA7976f33CbD77088E5D7cf7".to_string(),
            holder_address: "0x563200e2e4Cd1cB8114091174C555c5AE2418Fcf".to_string(),
            token_address: "0xe2AeE679e50D2f391517E2f4006bA5aB1e6b1D22".to_string(),
            init_timeout_seconds: 300,
        }
    }
}

impl Default for GasPriceSettings {
    fn default() -> Self {
        GasPriceSettings {
            primary_url: "http://gas-price.api.enterprise.1inch.exchange".to_string(),
            fallback_url: "https://gasprice.poa.network".to_string(),
            cors_proxy_url: "https://corsproxy.1inch.exchange/".to_string(),
            refresh_interval_seconds: 30,
            request_timeout_seconds: 10,
        }
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        PollerSettings { interval_ms: 5000 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Flat variable names accepted on top of the `SECTION__KEY` form.
const FLAT_OVERRIDES: &[(&str, &str)] = &[
    ("API_HOST", "api.host"),
    ("API_PORT", "api.port"),
    ("ETHEREUM_RPC_URL", "blockchain.ethereum_rpc_url"),
    ("SECONDS_PER_BLOCK", "blockchain.seconds_per_block"),
    ("WALLET_ADDRESS", "wallet.address"),
    ("MCD_POT_CONTRACT_ADDRESS", "contracts.mcd_pot_address"),
    ("HOLDER_CONTRACT_ADDRESS", "contracts.holder_address"),
    ("TOKEN_CONTRACT_ADDRESS", "contracts.token_address"),
    ("GAS_PRICE_URL", "gas_price.primary_url"),
    ("GAS_PRICE_URL2", "gas_price.fallback_url"),
    ("CORS_PROXY_URL", "gas_price.cors_proxy_url"),
    ("POLL_INTERVAL_MS", "poller.interval_ms"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = config::Config::try_from(&Settings::default())?;

        let mut builder = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in FLAT_OVERRIDES {
            builder = builder.set_override_option(*key, env::var(var).ok())?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        url::Url::parse(&self.blockchain.ethereum_rpc_url).map_err(|e| {
            config::ConfigError::Message(format!("Invalid ETHEREUM_RPC_URL: {}", e))
        })?;

        for (name, value) in [
            ("mcd_pot_address", &self.contracts.mcd_pot_address),
            ("holder_address", &self.contracts.holder_address),
            ("token_address", &self.contracts.token_address),
        ] {
            parse_address(name, value)?;
        }

        if let Some(address) = &self.wallet.address {
            parse_address("wallet.address", address)?;
        }

        for (name, value) in [
            ("blockchain.seconds_per_block", self.blockchain.seconds_per_block),
            ("poller.interval_ms", self.poller.interval_ms),
            ("gas_price.refresh_interval_seconds", self.gas_price.refresh_interval_seconds),
        ] {
            if value == 0 {
                return Err(config::ConfigError::Message(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poller.interval_ms)
    }

    pub fn contract_init_timeout(&self) -> Duration {
        Duration::from_secs(self.contracts.init_timeout_seconds)
    }

    pub fn gas_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.gas_price.refresh_interval_seconds)
    }
}

pub fn parse_address(name: &str, value: &str) -> Result<Address, config::ConfigError> {
    value
        .parse::<Address>()
        .map_err(|e| config::ConfigError::Message(format!("Invalid {}: {}", name, e)))
}
