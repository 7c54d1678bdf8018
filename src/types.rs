use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub provider: String,
    /// `None` when the provider could not deliver a usable price this cycle.
    pub price: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PriceQuote {
    pub fn is_available(&self) -> bool {
        self.price.is_some()
    }
}

/// One fetch cycle's worth of quotes, keyed by lowercase provider id.
///
/// Prices stored here are always finite and strictly positive; anything else
/// is recorded as unavailable on insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSnapshot {
    quotes: BTreeMap<String, PriceQuote>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: &str, price: Option<f64>) {
        let provider = provider.to_lowercase();
        let price = match price {
            Some(p) if p.is_finite() && p > 0.0 => Some(p),
            Some(p) => {
                warn!("Discarding invalid price {} from {}", p, provider);
                None
            }
            None => None,
        };

        self.quotes.insert(
            provider.clone(),
            PriceQuote {
                provider,
                price,
                timestamp: Utc::now(),
            },
        );
    }

    pub fn insert_unavailable(&mut self, provider: &str) {
        self.insert(provider, None);
    }

    pub fn get(&self, provider: &str) -> Option<&PriceQuote> {
        self.quotes.get(&provider.to_lowercase())
    }

    pub fn price(&self, provider: &str) -> Option<f64> {
        self.get(provider).and_then(|quote| quote.price)
    }

    pub fn quotes(&self) -> impl Iterator<Item = &PriceQuote> {
        self.quotes.values()
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.quotes.keys().map(String::as_str)
    }

    pub fn available_count(&self) -> usize {
        self.quotes.values().filter(|q| q.is_available()).count()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Provider id to price (or null), the shape the CLI prints.
    pub fn to_price_map(&self) -> BTreeMap<String, Option<f64>> {
        self.quotes
            .iter()
            .map(|(name, quote)| (name.clone(), quote.price))
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Option<f64>)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, Option<f64>)>>(iter: I) -> Self {
        let mut snapshot = PriceSnapshot::new();
        for (provider, price) in iter {
            snapshot.insert(provider.as_ref(), price);
        }
        snapshot
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub buy_provider: String,
    pub buy_price: f64,
    pub sell_provider: String,
    pub sell_price: f64,
    pub spread_percentage: f64,
}

impl ArbitrageOpportunity {
    pub fn new(buy_provider: &str, buy_price: f64, sell_provider: &str, sell_price: f64) -> Self {
        Self {
            buy_provider: buy_provider.to_string(),
            buy_price,
            sell_provider: sell_provider.to_string(),
            sell_price,
            spread_percentage: spread_percentage(buy_price, sell_price),
        }
    }

    pub fn price_difference(&self) -> f64 {
        self.sell_price - self.buy_price
    }
}

impl fmt::Display for ArbitrageOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Buy from {} at {:.4}, sell on {} at {:.4} -> Spread: {:.2}%",
            self.buy_provider,
            self.buy_price,
            self.sell_provider,
            self.sell_price,
            self.spread_percentage
        )
    }
}

/// (sell - buy) / buy * 100
pub fn spread_percentage(buy_price: f64, sell_price: f64) -> f64 {
    (sell_price - buy_price) / buy_price * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub provider: String,
    pub side: TradeSide,
    pub amount: BigDecimal,
}
