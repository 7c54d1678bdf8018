use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::{
    models::{
        demo_opportunities, ErrorResponse, OpportunitiesResponse, OpportunityView, SimulateRequest,
        SimulateResponse, DETECTED_CONFIDENCE,
    },
    AppState,
};

/// Any handler failure, rendered as a 500 failure envelope.
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("API request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                success: false,
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// GET /opportunities
pub async fn get_opportunities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OpportunitiesResponse>, ApiError> {
    let snapshot = state.provider_manager.fetch_snapshot().await;
    info!("Prices found: {:?}", snapshot.to_price_map());

    let mut opportunities = Vec::new();

    if let Some(opportunity) = state
        .detector
        .detect_with_threshold(&snapshot, state.config.threshold)
    {
        opportunities.push(OpportunityView::from_opportunity(
            format!("real_opp_{}", Uuid::new_v4()),
            &opportunity,
            DETECTED_CONFIDENCE,
        ));
    }

    if state.config.demo_opportunities {
        opportunities.extend(demo_opportunities());
    }

    Ok(Json(OpportunitiesResponse {
        success: true,
        opportunities,
    }))
}

/// POST /simulate
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| anyhow::anyhow!("Invalid request body: {}", e))?;
    let amount = request.amount()?;

    info!(
        "Simulating trade for {} with amount {}",
        request.suggestion_id.as_deref().unwrap_or("<none>"),
        amount
    );

    let simulation = state.simulator.simulate(amount)?;

    Ok(Json(SimulateResponse {
        success: true,
        simulation,
    }))
}
