pub mod metrics;
pub mod orchestrator;

pub use metrics::BotMetrics;
pub use orchestrator::{ArbitrageBot, ScanOutcome};
