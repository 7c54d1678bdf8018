pub mod detector;
pub mod simulator;

pub use detector::{detect_pairwise, detect_threshold, SpreadDetector};
pub use simulator::{notional_profit, SimulationResult, TradeSimulator};
