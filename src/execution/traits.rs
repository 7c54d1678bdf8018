use anyhow::Result;
use async_trait::async_trait;

use crate::types::TradeOrder;

/// Places one side of a trade and reports a transaction identifier.
///
/// Implementations may be dry runs or real ledger submissions; callers do not
/// depend on which.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, order: &TradeOrder) -> Result<String>;
}
