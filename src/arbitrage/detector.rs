use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use crate::{
    config::DetectionConfig,
    types::{spread_percentage, ArbitrageOpportunity, PriceSnapshot},
};

/// Every unordered provider pair, priced low-to-high.
///
/// Pairs are visited once (i < j) in the snapshot's provider order. The
/// cheaper side is the buy side; equal prices and unavailable quotes yield
/// nothing. No threshold is applied here.
pub fn detect_pairwise(snapshot: &PriceSnapshot) -> Vec<ArbitrageOpportunity> {
    let priced: Vec<(&str, f64)> = snapshot
        .quotes()
        .filter_map(|quote| quote.price.map(|price| (quote.provider.as_str(), price)))
        .collect();

    let mut opportunities = Vec::new();

    for i in 0..priced.len() {
        for j in (i + 1)..priced.len() {
            let (provider1, price1) = priced[i];
            let (provider2, price2) = priced[j];

            if price1 < price2 {
                opportunities.push(ArbitrageOpportunity::new(provider1, price1, provider2, price2));
            } else if price2 < price1 {
                opportunities.push(ArbitrageOpportunity::new(provider2, price2, provider1, price1));
            }
        }
    }

    debug!(
        "Pairwise detection over {} priced providers produced {} opportunities",
        priced.len(),
        opportunities.len()
    );

    opportunities
}

/// Fixed-direction check between two named providers.
///
/// `primary` is always the buy side and `secondary` the sell side; the spread
/// is not mirrored when `primary` is the more expensive quote. Returns `None`
/// when either quote is unavailable or the spread is below `threshold`.
pub fn detect_threshold(
    snapshot: &PriceSnapshot,
    primary: &str,
    secondary: &str,
    threshold: f64,
) -> Option<ArbitrageOpportunity> {
    let (primary_price, secondary_price) = match (snapshot.price(primary), snapshot.price(secondary)) {
        (Some(p), Some(s)) => (p, s),
        _ => {
            debug!(
                "Skipping threshold detection, quote missing for {} or {}",
                primary, secondary
            );
            return None;
        }
    };

    let spread = spread_percentage(primary_price, secondary_price);
    if spread < threshold {
        debug!(
            "Spread {:.4}% between {} and {} is below threshold {}%",
            spread, primary, secondary, threshold
        );
        return None;
    }

    // Only reachable with a non-positive threshold
    if spread <= 0.0 {
        warn!(
            "Reporting non-positive spread {:.4}%: {} is not cheaper than {}",
            spread, primary, secondary
        );
    }

    Some(ArbitrageOpportunity::new(
        &primary.to_lowercase(),
        primary_price,
        &secondary.to_lowercase(),
        secondary_price,
    ))
}

pub struct SpreadDetector {
    primary: String,
    secondary: String,
    threshold: f64,
}

impl SpreadDetector {
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        if !config.threshold.is_finite() {
            return Err(anyhow!("Invalid threshold: {}", config.threshold));
        }
        if config.primary.eq_ignore_ascii_case(&config.secondary) {
            return Err(anyhow!(
                "Primary and secondary providers must differ, both are '{}'",
                config.primary
            ));
        }

        Ok(Self {
            primary: config.primary.to_lowercase(),
            secondary: config.secondary.to_lowercase(),
            threshold: config.threshold,
        })
    }

    pub fn detect(&self, snapshot: &PriceSnapshot) -> Option<ArbitrageOpportunity> {
        self.detect_with_threshold(snapshot, self.threshold)
    }

    pub fn detect_with_threshold(
        &self,
        snapshot: &PriceSnapshot,
        threshold: f64,
    ) -> Option<ArbitrageOpportunity> {
        let opportunity = detect_threshold(snapshot, &self.primary, &self.secondary, threshold);

        if let Some(ref opp) = opportunity {
            info!("Arbitrage opportunity: {}", opp);
        }

        opportunity
    }

    pub fn detect_all(&self, snapshot: &PriceSnapshot) -> Vec<ArbitrageOpportunity> {
        let opportunities = detect_pairwise(snapshot);

        if !opportunities.is_empty() {
            info!("Found {} pairwise spreads", opportunities.len());
        }

        opportunities
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn secondary(&self) -> &str {
        &self.secondary
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(prices: &[(&str, Option<f64>)]) -> PriceSnapshot {
        prices.iter().map(|(name, price)| (*name, *price)).collect()
    }

    fn create_test_config() -> DetectionConfig {
        DetectionConfig {
            primary: "binance".to_string(),
            secondary: "coinbase".to_string(),
            threshold: 0.5,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {} to be close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_pairwise_three_providers() {
        let prices = snapshot(&[("a", Some(1.00)), ("b", Some(1.01)), ("c", Some(0.99))]);

        let opportunities = detect_pairwise(&prices);
        assert_eq!(opportunities.len(), 3);

        assert_eq!(opportunities[0].buy_provider, "a");
        assert_eq!(opportunities[0].sell_provider, "b");
        assert_close(opportunities[0].spread_percentage, 1.0);

        assert_eq!(opportunities[1].buy_provider, "c");
        assert_eq!(opportunities[1].sell_provider, "a");
        assert_close(opportunities[1].spread_percentage, 1.0101);

        assert_eq!(opportunities[2].buy_provider, "c");
        assert_eq!(opportunities[2].sell_provider, "b");
        assert_close(opportunities[2].spread_percentage, 2.0202);

        for opp in &opportunities {
            assert!(opp.buy_price < opp.sell_price);
            assert!(opp.spread_percentage > 0.0);
        }
    }

    #[test]
    fn test_pairwise_distinct_prices_yield_every_pair() {
        let prices = snapshot(&[
            ("p1", Some(1.001)),
            ("p2", Some(0.998)),
            ("p3", Some(1.004)),
            ("p4", Some(0.9995)),
            ("p5", Some(1.0021)),
        ]);

        let opportunities = detect_pairwise(&prices);
        assert_eq!(opportunities.len(), 10);
        assert!(opportunities.iter().all(|o| o.buy_price < o.sell_price));
    }

    #[test]
    fn test_pairwise_equal_prices_skipped() {
        let prices = snapshot(&[("a", Some(1.0)), ("b", Some(1.0)), ("c", Some(1.02))]);

        let opportunities = detect_pairwise(&prices);
        assert_eq!(opportunities.len(), 2);
        assert!(opportunities.iter().all(|o| o.sell_provider == "c"));
    }

    #[test]
    fn test_pairwise_skips_unavailable() {
        let prices = snapshot(&[("a", Some(1.0)), ("b", None), ("c", Some(1.02))]);

        let opportunities = detect_pairwise(&prices);
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].buy_provider, "a");
        assert_eq!(opportunities[0].sell_provider, "c");
    }

    #[test]
    fn test_pairwise_is_deterministic() {
        let prices = snapshot(&[("x", Some(1.003)), ("y", Some(0.997)), ("z", Some(1.0))]);
        assert_eq!(detect_pairwise(&prices), detect_pairwise(&prices));
    }

    #[test]
    fn test_threshold_below_threshold() {
        let prices = snapshot(&[("binance", Some(0.9997)), ("coinbase", Some(1.002))]);
        assert_close(spread_percentage(0.9997, 1.002), 0.2301);
        assert_eq!(detect_threshold(&prices, "binance", "coinbase", 0.5), None);
    }

    #[test]
    fn test_threshold_opportunity() {
        let prices = snapshot(&[("binance", Some(1.00)), ("coinbase", Some(1.05))]);

        let opp = detect_threshold(&prices, "binance", "coinbase", 0.5).unwrap();
        assert_eq!(opp.buy_provider, "binance");
        assert_eq!(opp.buy_price, 1.00);
        assert_eq!(opp.sell_provider, "coinbase");
        assert_eq!(opp.sell_price, 1.05);
        assert_close(opp.spread_percentage, 5.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let prices = snapshot(&[("binance", Some(1.0)), ("coinbase", Some(1.5))]);

        let opp = detect_threshold(&prices, "binance", "coinbase", 50.0).unwrap();
        assert_eq!(opp.spread_percentage, 50.0);
        assert_eq!(detect_threshold(&prices, "binance", "coinbase", 50.0001), None);
    }

    #[test]
    fn test_threshold_missing_quote() {
        let prices = snapshot(&[("binance", Some(1.00)), ("coinbase", None)]);
        assert_eq!(detect_threshold(&prices, "binance", "coinbase", 0.0001), None);

        let prices = snapshot(&[("binance", Some(1.00))]);
        assert_eq!(detect_threshold(&prices, "binance", "coinbase", 0.0001), None);
    }

    #[test]
    fn test_threshold_keeps_fixed_direction() {
        // primary is dearer; pairwise would flip the sides, threshold mode does not
        let prices = snapshot(&[("binance", Some(1.05)), ("coinbase", Some(1.00))]);
        assert_eq!(detect_threshold(&prices, "binance", "coinbase", 0.5), None);

        let opp = detect_threshold(&prices, "binance", "coinbase", -10.0).unwrap();
        assert_eq!(opp.buy_provider, "binance");
        assert!(opp.spread_percentage < 0.0);
    }

    #[test]
    fn test_detector_from_config() {
        let detector = SpreadDetector::new(&create_test_config()).unwrap();
        let prices = snapshot(&[("Binance", Some(1.00)), ("Coinbase", Some(1.05))]);

        assert!(detector.detect(&prices).is_some());
        assert!(detector.detect_with_threshold(&prices, 10.0).is_none());
        assert_eq!(detector.detect(&prices), detector.detect(&prices));
    }

    #[test]
    fn test_detector_rejects_same_provider() {
        let mut config = create_test_config();
        config.secondary = "BINANCE".to_string();
        assert!(SpreadDetector::new(&config).is_err());
    }
}
