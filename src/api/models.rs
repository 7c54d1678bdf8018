use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    arbitrage::{notional_profit, simulator::REFERENCE_NOTIONAL, SimulationResult},
    types::ArbitrageOpportunity,
};

pub const PAIR: &str = "USDC/USDT";
pub const DETECTED_CONFIDENCE: f64 = 95.0;
pub const DEFAULT_SIMULATION_AMOUNT: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityView {
    pub id: String,
    pub description: String,
    pub buy_exchange: String,
    pub buy_price: f64,
    pub sell_exchange: String,
    pub sell_price: f64,
    pub profit: f64,
    pub expected_profit: f64,
    pub confidence: f64,
    pub pair: String,
    pub route: Vec<String>,
}

impl OpportunityView {
    pub fn from_opportunity(id: String, opportunity: &ArbitrageOpportunity, confidence: f64) -> Self {
        let profit = notional_profit(opportunity, REFERENCE_NOTIONAL);

        Self {
            id,
            description: format!(
                "Buy on {} at {}, sell on {} at {}",
                opportunity.buy_provider,
                opportunity.buy_price,
                opportunity.sell_provider,
                opportunity.sell_price
            ),
            buy_exchange: opportunity.buy_provider.clone(),
            buy_price: opportunity.buy_price,
            sell_exchange: opportunity.sell_provider.clone(),
            sell_price: opportunity.sell_price,
            profit,
            expected_profit: profit,
            confidence,
            pair: PAIR.to_string(),
            route: vec![
                opportunity.buy_provider.clone(),
                "USDC".to_string(),
                opportunity.sell_provider.clone(),
            ],
        }
    }
}

/// Fixed listings shown alongside live detections in demo mode.
pub fn demo_opportunities() -> Vec<OpportunityView> {
    vec![
        OpportunityView::from_opportunity(
            "mock_opp_1".to_string(),
            &ArbitrageOpportunity::new("Kraken", 0.9998, "KuCoin", 1.0012),
            92.0,
        ),
        OpportunityView::from_opportunity(
            "mock_opp_2".to_string(),
            &ArbitrageOpportunity::new("Gemini", 1.0001, "Crypto.com", 1.0015),
            88.0,
        ),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunitiesResponse {
    pub success: bool,
    pub opportunities: Vec<OpportunityView>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    #[serde(default)]
    pub suggestion_id: Option<String>,
    /// Outer `None`: field absent. `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub amount: Option<Option<f64>>,
}

impl SimulateRequest {
    /// The requested amount, falling back to the default only when the field
    /// was left out.
    pub fn amount(&self) -> Result<f64> {
        match self.amount {
            None => Ok(DEFAULT_SIMULATION_AMOUNT),
            Some(Some(amount)) => Ok(amount),
            Some(None) => Err(anyhow!("amount must be a number, got null")),
        }
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub success: bool,
    pub simulation: SimulationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
