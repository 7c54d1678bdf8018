use anyhow::{anyhow, Result};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, str::FromStr};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    pub detection: DetectionConfig,
    pub execution: ExecutionConfig,
    pub monitor: MonitorConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `{"price": "<decimal string>"}`
    Ticker,
    /// `{"<asset-id>": {"usd": <number>}, ...}`, priced as a cross rate
    Aggregator,
    /// `{"data": {"rates": {"<symbol>": "<decimal string>"}}}`
    ExchangeRates,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub url: String,
    /// Asset id (aggregator) or symbol (exchange rates) for the base side.
    #[serde(default)]
    pub base_asset: Option<String>,
    #[serde(default)]
    pub quote_asset: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DetectionConfig {
    pub primary: String,
    pub secondary: String,
    pub threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExecutionConfig {
    pub enabled: bool,
    pub trade_amount: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MonitorConfig {
    pub check_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub threshold: f64,
    pub demo_opportunities: bool,
}

pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "binance".to_string(),
            kind: ProviderKind::Ticker,
            url: "https://api.binance.com/api/v3/ticker/price?symbol=USDCUSDT".to_string(),
            base_asset: None,
            quote_asset: None,
        },
        ProviderConfig {
            name: "coinbase".to_string(),
            kind: ProviderKind::Aggregator,
            url: "https://api.coingecko.com/api/v3/simple/price?ids=usd-coin,tether&vs_currencies=usd"
                .to_string(),
            base_asset: Some("usd-coin".to_string()),
            quote_asset: Some("tether".to_string()),
        },
    ]
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut settings = config::Config::builder()
            .set_default("detection.primary", "binance")?
            .set_default("detection.secondary", "coinbase")?
            .set_default("detection.threshold", 0.5)?
            .set_default("execution.enabled", false)?
            .set_default("execution.trade_amount", "10")?
            .set_default("monitor.check_interval_seconds", 30)?
            .set_default("api.host", "127.0.0.1")?
            .set_default("api.port", 5000)?
            .set_default("api.threshold", 0.0001)?
            .set_default("api.demo_opportunities", true)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("ARBITRAGE")
                    .prefix_separator("_")
                    .separator("__"),
            );

        // Hosting platforms hand the listen port over as PORT
        if let Ok(port) = std::env::var("PORT") {
            settings = settings.set_override("api.port", port)?;
        }

        let config: Config = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(anyhow!("At least one price provider must be configured"));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(anyhow!("Provider name cannot be empty"));
            }
            // Snapshot keys are lowercase, so names must be unique ignoring case
            if !seen.insert(provider.name.to_lowercase()) {
                return Err(anyhow!("Duplicate provider name '{}'", provider.name));
            }
            if provider.kind == ProviderKind::Aggregator
                && (provider.base_asset.is_none() || provider.quote_asset.is_none())
            {
                return Err(anyhow!(
                    "Aggregator provider '{}' needs base_asset and quote_asset",
                    provider.name
                ));
            }
            if provider.kind == ProviderKind::ExchangeRates && provider.quote_asset.is_none() {
                return Err(anyhow!(
                    "Exchange-rates provider '{}' needs quote_asset",
                    provider.name
                ));
            }
        }

        if !self.detection.threshold.is_finite() || !self.api.threshold.is_finite() {
            return Err(anyhow!("Spread thresholds must be finite numbers"));
        }

        if self.monitor.check_interval_seconds == 0 {
            return Err(anyhow!("check_interval_seconds must be greater than zero"));
        }

        self.execution.trade_amount()?;
        Ok(())
    }
}

impl ExecutionConfig {
    pub fn trade_amount(&self) -> Result<BigDecimal> {
        let amount = BigDecimal::from_str(&self.trade_amount)
            .map_err(|e| anyhow!("Invalid trade_amount: {}", e))?;

        if amount <= BigDecimal::from(0) {
            return Err(anyhow!("trade_amount must be positive, got {}", amount));
        }

        Ok(amount)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            detection: DetectionConfig {
                primary: "binance".to_string(),
                secondary: "coinbase".to_string(),
                threshold: 0.5,
            },
            execution: ExecutionConfig {
                enabled: false,
                trade_amount: "10".to_string(),
            },
            monitor: MonitorConfig {
                check_interval_seconds: 30,
            },
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                threshold: 0.0001,
                demo_opportunities: true,
            },
        }
    }
}
