use anyhow::{anyhow, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

use crate::{
    execution::ExecutionReport,
    types::{ArbitrageOpportunity, PriceSnapshot},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotMetrics {
    pub started_at: DateTime<Utc>,
    pub total_cycles_completed: u64,
    pub total_opportunities_found: u64,
    pub best_spread_percentage: Option<f64>,
    pub trades_submitted: u64,
    pub trades_failed: u64,
    pub total_volume_traded: BigDecimal,
    pub provider_performance: BTreeMap<String, ProviderMetrics>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderMetrics {
    pub total_quotes_fetched: u64,
    pub available_quotes: u64,
    pub unavailable_quotes: u64,
    pub last_price: Option<f64>,
    pub opportunities_as_buy_side: u64,
    pub opportunities_as_sell_side: u64,
}

impl ProviderMetrics {
    pub fn availability(&self) -> f64 {
        if self.total_quotes_fetched == 0 {
            return 0.0;
        }
        self.available_quotes as f64 / self.total_quotes_fetched as f64
    }
}

impl BotMetrics {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            total_cycles_completed: 0,
            total_opportunities_found: 0,
            best_spread_percentage: None,
            trades_submitted: 0,
            trades_failed: 0,
            total_volume_traded: BigDecimal::from(0),
            provider_performance: BTreeMap::new(),
            last_updated: now,
        }
    }

    pub fn record_snapshot(&mut self, snapshot: &PriceSnapshot) {
        for quote in snapshot.quotes() {
            let metrics = self
                .provider_performance
                .entry(quote.provider.clone())
                .or_default();

            metrics.total_quotes_fetched += 1;
            match quote.price {
                Some(price) => {
                    metrics.available_quotes += 1;
                    metrics.last_price = Some(price);
                }
                None => metrics.unavailable_quotes += 1,
            }
        }

        self.total_cycles_completed += 1;
        self.last_updated = Utc::now();
    }

    pub fn record_opportunity(&mut self, opportunity: &ArbitrageOpportunity) {
        self.total_opportunities_found += 1;

        self.provider_performance
            .entry(opportunity.buy_provider.clone())
            .or_default()
            .opportunities_as_buy_side += 1;
        self.provider_performance
            .entry(opportunity.sell_provider.clone())
            .or_default()
            .opportunities_as_sell_side += 1;

        let best = self.best_spread_percentage.unwrap_or(f64::MIN);
        if opportunity.spread_percentage > best {
            self.best_spread_percentage = Some(opportunity.spread_percentage);
        }

        self.last_updated = Utc::now();
    }

    pub fn record_execution(&mut self, report: &ExecutionReport, amount: &BigDecimal) {
        for leg in [&report.buy_tx, &report.sell_tx] {
            if leg.is_some() {
                self.trades_submitted += 1;
                self.total_volume_traded += amount;
            } else {
                self.trades_failed += 1;
            }
        }
        self.last_updated = Utc::now();
    }

    pub fn uptime_seconds(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Spread Monitor Report ===\n");
        report.push_str(&format!("Uptime: {} seconds\n", self.uptime_seconds()));
        report.push_str(&format!("Total Cycles: {}\n", self.total_cycles_completed));
        report.push_str(&format!("Opportunities Found: {}\n", self.total_opportunities_found));
        if let Some(best) = self.best_spread_percentage {
            report.push_str(&format!("Best Spread: {:.4}%\n", best));
        }
        report.push_str(&format!(
            "Trades: {} submitted, {} failed, {} volume\n",
            self.trades_submitted, self.trades_failed, self.total_volume_traded
        ));

        report.push_str("\n=== Provider Availability ===\n");
        for (name, metrics) in &self.provider_performance {
            report.push_str(&format!(
                "{}: {}/{} quotes available ({:.1}%), buy side {}x, sell side {}x\n",
                name,
                metrics.available_quotes,
                metrics.total_quotes_fetched,
                metrics.availability() * 100.0,
                metrics.opportunities_as_buy_side,
                metrics.opportunities_as_sell_side
            ));
        }

        report.push_str(&format!("\nLast Updated: {}\n", self.last_updated));

        report
    }

    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| anyhow!("Could not encode metrics: {}", e))
    }

    /// Dump the metrics as pretty JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.export_json()?)
            .map_err(|e| anyhow!("Could not write metrics to {}: {}", path.display(), e))
    }
}

impl Default for BotMetrics {
    fn default() -> Self {
        Self::new()
    }
}
