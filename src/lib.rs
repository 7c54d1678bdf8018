pub mod api;
pub mod arbitrage;
pub mod bot;
pub mod config;
pub mod execution;
pub mod providers;
pub mod types;

pub use config::Config;
pub use types::*;
