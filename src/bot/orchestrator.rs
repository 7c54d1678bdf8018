use anyhow::{anyhow, Result};
use bigdecimal::BigDecimal;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::{
    arbitrage::SpreadDetector,
    config::Config,
    execution::{ExecutionReport, ExecutionRouter},
    providers::{build_http_client, create_price_providers, ProviderManager},
    types::{ArbitrageOpportunity, PriceSnapshot},
};

use super::metrics::BotMetrics;

/// Outcome of one fetch-then-detect pass.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub snapshot: PriceSnapshot,
    pub opportunity: Option<ArbitrageOpportunity>,
    pub execution: Option<ExecutionReport>,
}

pub struct ArbitrageBot {
    config: Config,
    provider_manager: ProviderManager,
    detector: SpreadDetector,
    router: ExecutionRouter,
    trade_amount: BigDecimal,
    metrics: BotMetrics,
    is_running: bool,
}

impl ArbitrageBot {
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing spread monitor");

        let client = build_http_client()?;
        let provider_manager = create_price_providers(client, &config.providers)?;
        info!("Price providers initialized: {:?}", provider_manager.provider_names());

        Self::with_components(config, provider_manager, ExecutionRouter::simulated())
    }

    /// Assemble a bot from already-built collaborators.
    pub fn with_components(
        config: Config,
        provider_manager: ProviderManager,
        router: ExecutionRouter,
    ) -> Result<Self> {
        let detector = SpreadDetector::new(&config.detection)?;
        let trade_amount = config.execution.trade_amount()?;

        Ok(Self {
            config,
            provider_manager,
            detector,
            router,
            trade_amount,
            metrics: BotMetrics::new(),
            is_running: false,
        })
    }

    pub async fn fetch_snapshot(&mut self) -> PriceSnapshot {
        let snapshot = self.provider_manager.fetch_snapshot().await;
        self.metrics.record_snapshot(&snapshot);

        if snapshot.available_count() == 0 {
            warn!("No provider returned a usable price this cycle");
        }

        snapshot
    }

    /// Fetch prices, run the two-provider check, and trade if asked to.
    pub async fn run_once(&mut self, threshold: Option<f64>, execute: bool) -> Result<ScanOutcome> {
        let threshold = threshold.unwrap_or_else(|| self.detector.threshold());
        if !threshold.is_finite() {
            return Err(anyhow!("Invalid threshold: {}", threshold));
        }

        let snapshot = self.fetch_snapshot().await;
        debug!("Prices: {:?}", snapshot.to_price_map());

        let opportunity = self.detector.detect_with_threshold(&snapshot, threshold);

        let execution = match &opportunity {
            Some(opp) => {
                self.metrics.record_opportunity(opp);
                if execute {
                    let report = self.router.execute_opportunity(opp, &self.trade_amount).await;
                    self.metrics.record_execution(&report, &self.trade_amount);
                    Some(report)
                } else {
                    None
                }
            }
            None => {
                debug!(
                    "No arbitrage opportunity between {} and {}",
                    self.detector.primary(),
                    self.detector.secondary()
                );
                None
            }
        };

        Ok(ScanOutcome {
            snapshot,
            opportunity,
            execution,
        })
    }

    /// Fetch prices and report every pairwise spread.
    pub async fn run_pairwise(&mut self) -> (PriceSnapshot, Vec<ArbitrageOpportunity>) {
        let snapshot = self.fetch_snapshot().await;
        let opportunities = self.detector.detect_all(&snapshot);

        for opportunity in &opportunities {
            self.metrics.record_opportunity(opportunity);
        }

        (snapshot, opportunities)
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.is_running {
            return Err(anyhow!("Bot is already running"));
        }

        if self.provider_manager.provider_count() == 0 {
            return Err(anyhow!("No price providers configured"));
        }

        info!("Starting spread monitor");
        self.is_running = true;

        self.run_monitoring_loop().await
    }

    pub async fn stop(&mut self) {
        info!("Stopping spread monitor");
        self.is_running = false;
        info!("{}", self.metrics.generate_report());
    }

    async fn run_monitoring_loop(&mut self) -> Result<()> {
        let period = Duration::from_secs(self.config.monitor.check_interval_seconds);
        let mut ticker = interval(period);
        // A slow cycle delays the next one instead of bunching ticks together
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let execute = self.config.execution.enabled;

        info!(
            "Starting monitoring loop with {} second intervals (execution {})",
            self.config.monitor.check_interval_seconds,
            if execute { "enabled" } else { "disabled" }
        );

        while self.is_running {
            ticker.tick().await;
            let cycle = self.metrics.total_cycles_completed + 1;
            debug!("Starting monitoring cycle #{}", cycle);

            match self.run_once(None, execute).await {
                Ok(outcome) => {
                    if let Some(report) = outcome.execution {
                        if !report.is_complete() {
                            error!("Cycle #{}: trade execution incomplete: {:?}", cycle, report);
                        }
                    }
                }
                Err(e) => error!("Error in monitoring cycle #{}: {}", cycle, e),
            }

            if cycle % 100 == 0 {
                info!("{}", self.metrics.generate_report());
            }
        }

        info!("Monitoring loop stopped");
        Ok(())
    }

    pub fn metrics(&self) -> &BotMetrics {
        &self.metrics
    }

    pub fn detector(&self) -> &SpreadDetector {
        &self.detector
    }

    pub fn trade_amount(&self) -> &BigDecimal {
        &self.trade_amount
    }
}
