use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::ProviderConfig,
    providers::{fetch_json, parse_decimal, traits::PriceProvider},
};

/// Exchange ticker endpoint returning `{"price": "<decimal string>"}`.
pub struct TickerProvider {
    client: Client,
    config: ProviderConfig,
}

impl TickerProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

pub fn parse_ticker_price(body: &Value) -> Result<f64> {
    let price = body
        .get("price")
        .ok_or_else(|| anyhow!("Ticker response has no 'price' field"))?;

    parse_decimal(price)
}

#[async_trait]
impl PriceProvider for TickerProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch_price(&self) -> Result<f64> {
        debug!("Fetching ticker price from {}", self.config.name);

        let body = fetch_json(&self.client, &self.config.url).await?;
        parse_ticker_price(&body)
    }
}
