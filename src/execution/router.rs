use bigdecimal::BigDecimal;
use std::{collections::HashMap, sync::Arc};
use tracing::{error, info, warn};

use crate::{
    execution::{simulated::SimulatedExecutor, traits::TradeExecutor},
    types::{ArbitrageOpportunity, TradeOrder, TradeSide},
};

/// Routes trade signals to the executor registered for each provider.
pub struct ExecutionRouter {
    executors: HashMap<String, Arc<dyn TradeExecutor>>,
    fallback: Arc<dyn TradeExecutor>,
}

/// Transaction ids for both legs of an opportunity; `None` marks a failed leg.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub buy_tx: Option<String>,
    pub sell_tx: Option<String>,
}

impl ExecutionReport {
    pub fn is_complete(&self) -> bool {
        self.buy_tx.is_some() && self.sell_tx.is_some()
    }
}

impl ExecutionRouter {
    pub fn new(fallback: Arc<dyn TradeExecutor>) -> Self {
        Self {
            executors: HashMap::new(),
            fallback,
        }
    }

    /// Every provider goes to the dry-run executor.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedExecutor::default()))
    }

    pub fn register(&mut self, provider: &str, executor: Arc<dyn TradeExecutor>) {
        self.executors.insert(provider.to_lowercase(), executor);
    }

    fn executor_for(&self, provider: &str) -> &Arc<dyn TradeExecutor> {
        self.executors
            .get(&provider.to_lowercase())
            .unwrap_or(&self.fallback)
    }

    /// Submit one leg. Failures are logged and reported as `None`.
    pub async fn execute(&self, provider: &str, side: TradeSide, amount: &BigDecimal) -> Option<String> {
        if *amount <= BigDecimal::from(0) {
            warn!("Refusing to {} non-positive amount {} on {}", side, amount, provider);
            return None;
        }

        let executor = self.executor_for(provider);
        let order = TradeOrder {
            provider: provider.to_lowercase(),
            side,
            amount: amount.clone(),
        };

        match executor.execute(&order).await {
            Ok(tx_id) => {
                info!(
                    "Trade executed via {}: {} {} on {} (tx {})",
                    executor.name(),
                    side,
                    amount,
                    provider,
                    tx_id
                );
                Some(tx_id)
            }
            Err(e) => {
                error!("Trade failed via {} on {}: {}", executor.name(), provider, e);
                None
            }
        }
    }

    /// Buy on the cheap side, then sell on the dear side.
    pub async fn execute_opportunity(
        &self,
        opportunity: &ArbitrageOpportunity,
        amount: &BigDecimal,
    ) -> ExecutionReport {
        let buy_tx = self
            .execute(&opportunity.buy_provider, TradeSide::Buy, amount)
            .await;
        let sell_tx = self
            .execute(&opportunity.sell_provider, TradeSide::Sell, amount)
            .await;

        ExecutionReport { buy_tx, sell_tx }
    }
}
