use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::{execution::traits::TradeExecutor, types::TradeOrder};

pub const SIMULATED_PREFIX: &str = "SIMULATED";

/// Dry-run executor. Logs the order and hands back a synthetic id.
pub struct SimulatedExecutor {
    asset: String,
}

impl SimulatedExecutor {
    pub fn new(asset: &str) -> Self {
        Self {
            asset: asset.to_string(),
        }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new("USDC")
    }
}

#[async_trait]
impl TradeExecutor for SimulatedExecutor {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn execute(&self, order: &TradeOrder) -> Result<String> {
        info!(
            "(Dry-run) Would {} {} {} on {}",
            order.side, order.amount, self.asset, order.provider
        );

        Ok(format!("{}-{}", SIMULATED_PREFIX, Uuid::new_v4()))
    }
}
