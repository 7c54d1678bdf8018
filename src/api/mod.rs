pub mod handlers;
pub mod models;

use anyhow::{anyhow, Result};
use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    arbitrage::{SpreadDetector, TradeSimulator},
    config::{ApiConfig, Config},
    providers::{build_http_client, create_price_providers, ProviderManager},
};

pub struct AppState {
    pub provider_manager: ProviderManager,
    pub detector: SpreadDetector,
    pub simulator: TradeSimulator,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(provider_manager: ProviderManager, detector: SpreadDetector, config: ApiConfig) -> Self {
        Self {
            provider_manager,
            detector,
            simulator: TradeSimulator::default(),
            config,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Result<Self> {
        let provider_manager = create_price_providers(client, &config.providers)?;
        let detector = SpreadDetector::new(&config.detection)?;
        Ok(Self::new(provider_manager, detector, config.api.clone()))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/opportunities", get(handlers::get_opportunities))
        .route("/simulate", post(handlers::simulate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port)
        .parse()
        .map_err(|e| anyhow!("Invalid listen address {}:{}: {}", config.api.host, config.api.port, e))?;

    let state = Arc::new(AppState::from_config(&config, build_http_client()?)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
    info!("API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .map_err(|e| anyhow!("API server error: {}", e))
}
