use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::ProviderConfig,
    providers::{fetch_json, parse_decimal, traits::PriceProvider},
};

/// Exchange-rates endpoint returning `{"data": {"rates": {"USDT": "1.0004"}}}`,
/// where rates are quoted per unit of the currency in the request URL.
pub struct ExchangeRatesProvider {
    client: Client,
    config: ProviderConfig,
    quote_symbol: String,
}

impl ExchangeRatesProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Result<Self> {
        let quote_symbol = config
            .quote_asset
            .clone()
            .ok_or_else(|| anyhow!("Exchange-rates provider '{}' has no quote_asset", config.name))?
            .to_uppercase();

        Ok(Self {
            client,
            config,
            quote_symbol,
        })
    }
}

pub fn parse_exchange_rate(body: &Value, quote_symbol: &str) -> Result<f64> {
    let rates = body
        .get("data")
        .and_then(|data| data.get("rates"))
        .ok_or_else(|| anyhow!("Response has no data.rates object"))?;

    let rate = rates
        .get(quote_symbol)
        .ok_or_else(|| anyhow!("{} rate not found in response", quote_symbol))?;

    parse_decimal(rate)
}

#[async_trait]
impl PriceProvider for ExchangeRatesProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch_price(&self) -> Result<f64> {
        debug!("Fetching {} rate from {}", self.quote_symbol, self.config.name);

        let body = fetch_json(&self.client, &self.config.url).await?;
        parse_exchange_rate(&body, &self.quote_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rate() {
        let body = json!({
            "data": {
                "currency": "USDC",
                "rates": {"USDT": "1.0004", "EUR": "0.92"}
            }
        });
        assert_eq!(parse_exchange_rate(&body, "USDT").unwrap(), 1.0004);
    }

    #[test]
    fn test_missing_symbol() {
        let body = json!({"data": {"rates": {"EUR": "0.92"}}});
        assert!(parse_exchange_rate(&body, "USDT").is_err());
    }

    #[test]
    fn test_unexpected_shape() {
        let body = json!({"errors": [{"id": "not_found"}]});
        assert!(parse_exchange_rate(&body, "USDT").is_err());
    }
}
