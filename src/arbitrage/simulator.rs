use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::ArbitrageOpportunity;

/// Notional the listing profit figures are quoted against.
pub const REFERENCE_NOTIONAL: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub estimated_profit: f64,
    pub net_profit: f64,
    pub gas_estimate: f64,
    pub message: String,
}

/// Demo-backed trade simulation: profit figures scale linearly with the
/// amount from a fixed per-1000 profile. No trade is placed.
pub struct TradeSimulator {
    estimated_profit_per_notional: f64,
    net_profit_per_notional: f64,
    gas_estimate: f64,
}

impl TradeSimulator {
    pub fn new(estimated_profit_per_notional: f64, net_profit_per_notional: f64, gas_estimate: f64) -> Self {
        Self {
            estimated_profit_per_notional,
            net_profit_per_notional,
            gas_estimate,
        }
    }

    pub fn simulate(&self, amount: f64) -> Result<SimulationResult> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(anyhow!("Invalid simulation amount: {}", amount));
        }

        let scale = amount / REFERENCE_NOTIONAL;
        let result = SimulationResult {
            estimated_profit: self.estimated_profit_per_notional * scale,
            net_profit: self.net_profit_per_notional * scale,
            gas_estimate: self.gas_estimate,
            message: "Trade simulated successfully.".to_string(),
        };

        debug!(
            "Simulated trade of {}: estimated={}, net={}, gas={}",
            amount, result.estimated_profit, result.net_profit, result.gas_estimate
        );

        Ok(result)
    }
}

impl Default for TradeSimulator {
    fn default() -> Self {
        Self::new(2.50, 2.10, 0.40)
    }
}

/// Gross profit of trading `notional` units across the opportunity.
pub fn notional_profit(opportunity: &ArbitrageOpportunity, notional: f64) -> f64 {
    opportunity.price_difference() * notional
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_scales_with_amount() {
        let simulator = TradeSimulator::default();

        let result = simulator.simulate(1000.0).unwrap();
        assert!((result.estimated_profit - 2.50).abs() < 1e-9);
        assert!((result.net_profit - 2.10).abs() < 1e-9);
        assert!((result.gas_estimate - 0.40).abs() < 1e-9);

        let result = simulator.simulate(4000.0).unwrap();
        assert!((result.estimated_profit - 10.0).abs() < 1e-9);
        assert!((result.net_profit - 8.4).abs() < 1e-9);
    }

    #[test]
    fn test_simulate_rejects_bad_amount() {
        let simulator = TradeSimulator::default();
        assert!(simulator.simulate(-1.0).is_err());
        assert!(simulator.simulate(f64::NAN).is_err());
    }

    #[test]
    fn test_notional_profit() {
        let opp = ArbitrageOpportunity::new("kraken", 0.9998, "kucoin", 1.0012);
        assert!((notional_profit(&opp, REFERENCE_NOTIONAL) - 1.4).abs() < 1e-9);
    }
}
