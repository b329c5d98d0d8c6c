use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::engine::optimizer::{optimize, OptimizationOutcome, OptimizationRequest};
use crate::engine::partition::Strategy;
use crate::engine::scoring::ZoneScoring;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/optimize-routes", get(optimize_routes))
}

#[derive(Deserialize)]
pub struct OptimizeParams {
    pub strategy: Option<String>,
    pub vehicle_count: Option<i64>,
    pub scoring: Option<String>,
}

async fn optimize_routes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OptimizeParams>,
) -> Result<Json<OptimizationOutcome>, AppError> {
    let scoring = match params.scoring.as_deref() {
        None => ZoneScoring::default(),
        Some(label) => ZoneScoring::from_label(label).ok_or_else(|| {
            AppError::BadRequest(format!(
                "unknown scoring: {label}, expected nearest/weighted"
            ))
        })?,
    };

    let request = OptimizationRequest {
        strategy: Strategy::from_label(params.strategy.as_deref().unwrap_or_default()),
        vehicle_count: params
            .vehicle_count
            .unwrap_or(state.settings.default_vehicle_count),
        scoring,
    };

    Ok(Json(optimize(&state, request).await))
}
