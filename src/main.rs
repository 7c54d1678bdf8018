use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stablecoin_arbitrage::{api, bot::ArbitrageBot, config::Config};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stablecoin-arbitrage", about = "USDC/USDT spread detector")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch prices once and check the primary/secondary spread
    Scan {
        /// Minimum spread in percent (defaults to detection.threshold)
        #[arg(long)]
        threshold: Option<f64>,
        /// Submit both legs through the execution router
        #[arg(long)]
        execute: bool,
    },
    /// Fetch prices once and list every pairwise spread
    Pairwise,
    /// Re-scan on a fixed interval until interrupted
    Monitor {
        /// Write the final run metrics as JSON to this file on shutdown
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();

    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    match cli.command {
        Command::Scan { threshold, execute } => {
            let mut bot = ArbitrageBot::new(config)?;

            info!("Fetching stablecoin prices...");
            let outcome = bot.run_once(threshold, execute).await?;
            info!("Prices: {:?}", outcome.snapshot.to_price_map());

            match &outcome.opportunity {
                Some(opportunity) => {
                    info!("Opportunity: {}", opportunity);
                    if let Some(report) = &outcome.execution {
                        info!("Buy leg transaction: {:?}", report.buy_tx);
                        info!("Sell leg transaction: {:?}", report.sell_tx);
                    }
                }
                None => info!("No arbitrage opportunity."),
            }
        }
        Command::Pairwise => {
            let mut bot = ArbitrageBot::new(config)?;
            let (snapshot, opportunities) = bot.run_pairwise().await;

            info!("Prices: {:?}", snapshot.to_price_map());
            if opportunities.is_empty() {
                info!("No pairwise spreads.");
            }
            for opportunity in &opportunities {
                info!("{}", opportunity);
            }
        }
        Command::Monitor { metrics_out } => {
            let mut bot = ArbitrageBot::new(config)?;

            let result = tokio::select! {
                result = bot.start() => result,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    Ok(())
                }
            };

            bot.stop().await;
            if let Some(path) = metrics_out {
                bot.metrics().write_json(&path)?;
                info!("Metrics written to {}", path.display());
            }
            if let Err(e) = result {
                error!("Monitor error: {}", e);
                return Err(e);
            }
        }
        Command::Serve => {
            api::serve(config).await?;
        }
    }

    Ok(())
}
