use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::GasPriceSettings;
use crate::error::AppError;
use crate::models::{GasPrices, GasTier};

/// Bump applied on top of the quoted price, in percent
const PRICE_BUMP_PERCENT: u32 = 110;

#[derive(Debug, Clone, Serialize)]
pub struct GasPriceSnapshot {
    #[serde(flatten)]
    pub prices: GasPrices,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Polls public gas stations and keeps the last good quote
pub struct GasPriceOracle {
    client: reqwest::Client,
    primary_url: String,
    fallback_url: String,
    state: RwLock<GasPriceSnapshot>,
}

impl GasPriceOracle {
    pub fn new(settings: &GasPriceSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            primary_url: format!("{}{}", settings.cors_proxy_url, settings.primary_url),
            fallback_url: settings.fallback_url.clone(),
            state: RwLock::new(GasPriceSnapshot {
                prices: GasPrices::default(),
                updated_at: None,
            }),
        })
    }

    pub async fn current(&self) -> GasPriceSnapshot {
        self.state.read().await.clone()
    }

    pub async fn price(&self, tier: GasTier) -> u128 {
        self.state.read().await.prices.price(tier)
    }

    /// Fetch fresh prices. On failure the previous prices stay in place.
    pub async fn refresh(&self) -> Result<GasPrices, AppError> {
        let prices = match self.fetch_primary().await {
            Some(prices) => prices,
            None => {
                let body = self.fetch_json(&self.fallback_url).await?;
                parse_prices(&body)?
            }
        };

        let mut state = self.state.write().await;
        state.prices = prices;
        state.updated_at = Some(Utc::now());

        debug!(
            fast = prices.fast,
            standard = prices.standard,
            instant = prices.instant,
            "Gas prices updated"
        );
        Ok(prices)
    }

    /// `None` when the primary source is unreachable or reports itself unhealthy
    async fn fetch_primary(&self) -> Option<GasPrices> {
        let body = match self.fetch_json(&self.primary_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Primary gas price source failed, using fallback");
                return None;
            }
        };

        if !body.get("health").map(is_truthy).unwrap_or(false) {
            warn!("Primary gas price source unhealthy, using fallback");
            return None;
        }

        match parse_prices(&body) {
            Ok(prices) => Some(prices),
            Err(e) => {
                warn!(error = %e, "Primary gas price response malformed, using fallback");
                None
            }
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Gas price request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Gas price source {} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Invalid gas price response from {}: {}", url, e)))
    }

    /// Refresh now and then on every tick; failures are logged and skipped
    pub fn spawn_refresh_loop(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            info!(interval_secs = interval.as_secs(), "Gas price refresh loop started");

            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "Gas price refresh failed, keeping previous prices");
                }
            }
        })
    }
}

fn parse_prices(body: &Value) -> Result<GasPrices, AppError> {
    Ok(GasPrices {
        fast: tier_price(body, "fast")?,
        standard: tier_price(body, "standard")?,
        instant: tier_price(body, "instant")?,
    })
}

fn tier_price(body: &Value, tier: &str) -> Result<u128, AppError> {
    let gwei = body
        .get(tier)
        .and_then(Value::as_f64)
        .ok_or_else(|| AppError::ExternalServiceError(format!("Gas price response missing `{}`", tier)))?;

    bump_to_wei(gwei)
}

/// `trunc(gwei * 110 * 1e9 / 100)`
pub fn bump_to_wei(gwei: f64) -> Result<u128, AppError> {
    let quoted = Decimal::from_f64(gwei)
        .filter(|d| !d.is_sign_negative())
        .ok_or_else(|| AppError::ExternalServiceError(format!("Invalid gas price {}", gwei)))?;

    let wei = quoted * Decimal::from(PRICE_BUMP_PERCENT) * Decimal::from(1_000_000_000u64) / Decimal::from(100u32);

    wei.trunc()
        .to_u128()
        .ok_or_else(|| AppError::ExternalServiceError(format!("Gas price {} out of range", gwei)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
