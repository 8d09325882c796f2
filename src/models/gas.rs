use serde::{Deserialize, Serialize};

const GWEI: u128 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasTier {
    Fast,
    Standard,
    Instant,
}

/// Gas prices in wei for each speed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPrices {
    pub fast: u128,
    pub standard: u128,
    pub instant: u128,
}

impl GasPrices {
    pub fn price(&self, tier: GasTier) -> u128 {
        match tier {
            GasTier::Fast => self.fast,
            GasTier::Standard => self.standard,
            GasTier::Instant => self.instant,
        }
    }
}

impl Default for GasPrices {
    fn default() -> Self {
        Self {
            fast: 6 * GWEI,
            standard: 11 * GWEI,
            instant: 21 * GWEI,
        }
    }
}
