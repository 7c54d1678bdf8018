pub mod aggregator;
pub mod exchange_rates;
pub mod ticker;
pub mod traits;

pub use aggregator::AggregatorProvider;
pub use exchange_rates::ExchangeRatesProvider;
pub use ticker::TickerProvider;
pub use traits::*;

use anyhow::{anyhow, Result};
use futures::future::join_all;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::{ProviderConfig, ProviderKind},
    types::PriceSnapshot,
};

pub struct ProviderManager {
    providers: Vec<Box<dyn PriceProvider>>,
}

impl ProviderManager {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a provider. Names must be unique ignoring case, since
    /// snapshots key quotes by lowercase name.
    pub fn add_provider(&mut self, provider: Box<dyn PriceProvider>) -> Result<()> {
        let name = provider.name().to_lowercase();
        if self
            .providers
            .iter()
            .any(|existing| existing.name().to_lowercase() == name)
        {
            return Err(anyhow!("Provider '{}' is already registered", provider.name()));
        }

        self.providers.push(provider);
        Ok(())
    }

    /// Query every provider once and collect the results.
    ///
    /// A failing provider is recorded as unavailable; it never fails the
    /// snapshot as a whole.
    pub async fn fetch_snapshot(&self) -> PriceSnapshot {
        let results = join_all(self.providers.iter().map(|provider| provider.fetch_price())).await;

        let mut snapshot = PriceSnapshot::new();
        for (provider, result) in self.providers.iter().zip(results) {
            match result {
                Ok(price) => {
                    debug!("{} quoted {}", provider.name(), price);
                    snapshot.insert(provider.name(), Some(price));
                }
                Err(e) => {
                    warn!("Failed to get price from {}: {}", provider.name(), e);
                    snapshot.insert_unavailable(provider.name());
                }
            }
        }

        snapshot
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_price_providers(client: Client, configs: &[ProviderConfig]) -> Result<ProviderManager> {
    let mut manager = ProviderManager::new();

    for config in configs {
        let provider: Box<dyn PriceProvider> = match config.kind {
            ProviderKind::Ticker => Box::new(TickerProvider::new(client.clone(), config.clone())),
            ProviderKind::Aggregator => {
                Box::new(AggregatorProvider::new(client.clone(), config.clone())?)
            }
            ProviderKind::ExchangeRates => {
                Box::new(ExchangeRatesProvider::new(client.clone(), config.clone())?)
            }
        };
        manager.add_provider(provider)?;
    }

    Ok(manager)
}

/// HTTP client shared by every provider in a run.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

pub(crate) async fn fetch_json(client: &Client, url: &str) -> Result<Value> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| anyhow!("Request to {} failed: {}", url, e))?
        .error_for_status()
        .map_err(|e| anyhow!("Bad status from {}: {}", url, e))?;

    response
        .json::<Value>()
        .await
        .map_err(|e| anyhow!("Malformed JSON from {}: {}", url, e))
}

/// Accepts both `"1.0004"` and `1.0004`.
pub(crate) fn parse_decimal(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| anyhow!("Invalid decimal string '{}': {}", s, e))?,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow!("Number {} is not representable as f64", n))?,
        other => return Err(anyhow!("Expected a decimal, got {}", other)),
    };

    if !parsed.is_finite() {
        return Err(anyhow!("Price is not finite: {}", parsed));
    }

    Ok(parsed)
}
