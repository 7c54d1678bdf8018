use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch one scalar price for the monitored pair.
    async fn fetch_price(&self) -> Result<f64>;
}
