use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::ProviderConfig,
    providers::{fetch_json, parse_decimal, traits::PriceProvider},
};

/// Aggregator endpoint returning per-asset USD rates
/// (`{"usd-coin": {"usd": 1.0}, "tether": {"usd": 1.0}}`).
///
/// The pair price is the cross rate base/quote, rounded to 6 decimal places.
pub struct AggregatorProvider {
    client: Client,
    config: ProviderConfig,
    base_asset: String,
    quote_asset: String,
}

impl AggregatorProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Result<Self> {
        let base_asset = config
            .base_asset
            .clone()
            .ok_or_else(|| anyhow!("Aggregator provider '{}' has no base_asset", config.name))?;
        let quote_asset = config
            .quote_asset
            .clone()
            .ok_or_else(|| anyhow!("Aggregator provider '{}' has no quote_asset", config.name))?;

        Ok(Self {
            client,
            config,
            base_asset,
            quote_asset,
        })
    }
}

fn usd_rate(body: &Value, asset: &str) -> Result<f64> {
    let rate = body
        .get(asset)
        .and_then(|entry| entry.get("usd"))
        .ok_or_else(|| anyhow!("Missing {}/USD rate", asset))?;

    let rate = parse_decimal(rate)?;
    if rate <= 0.0 {
        return Err(anyhow!("Non-positive {}/USD rate: {}", asset, rate));
    }
    Ok(rate)
}

pub fn parse_cross_rate(body: &Value, base_asset: &str, quote_asset: &str) -> Result<f64> {
    let base_usd = usd_rate(body, base_asset)?;
    let quote_usd = usd_rate(body, quote_asset)?;

    Ok(round_to(base_usd / quote_usd, 6))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[async_trait]
impl PriceProvider for AggregatorProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch_price(&self) -> Result<f64> {
        debug!(
            "Fetching {}/{} cross rate from {}",
            self.base_asset, self.quote_asset, self.config.name
        );

        let body = fetch_json(&self.client, &self.config.url).await?;
        parse_cross_rate(&body, &self.base_asset, &self.quote_asset)
    }
}
