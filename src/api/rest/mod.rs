pub mod fleet;
pub mod optimize;
pub mod orders;
pub mod sites;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::engine::scoring::risk;
use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::order::OrderStatus;
use crate::models::route::RiskLabel;
use crate::models::vehicle::VehicleStatus;
use crate::state::AppState;
use crate::store::{Datastore, StoreError};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(orders::router())
        .merge(fleet::router())
        .merge(sites::router())
        .merge(optimize::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/dashboard-stats", get(dashboard_stats))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Listing endpoints answer with an empty list rather than an error when the
/// store cannot be read.
pub(crate) fn or_empty<T>(result: Result<Vec<T>, StoreError>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|err| {
        warn!(error = %err, what, "datastore unavailable; returning empty list");
        Vec::new()
    })
}

pub(crate) fn require_text(field: &str, value: String) -> Result<String, AppError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} cannot be empty")));
    }
    Ok(value)
}

pub(crate) fn require_valid_point(field: &str, point: GeoPoint) -> Result<GeoPoint, AppError> {
    if !point.is_valid() {
        return Err(AppError::BadRequest(format!(
            "{field} must have lat in [-90, 90] and lng in [-180, 180]"
        )));
    }
    Ok(point)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    storage: &'static str,
    road_geometry: bool,
    geocoding: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: if state.store.is_available() {
            "ok"
        } else {
            "degraded"
        },
        storage: state.store.backend(),
        road_geometry: state.road_geometry.is_some(),
        geocoding: state.geocoder.is_some(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}

#[derive(Serialize, Default)]
struct DashboardStats {
    total_orders: usize,
    pending_orders: usize,
    delivered_orders: usize,
    vehicles: usize,
    available_vehicles: usize,
    hubs: usize,
    parking_zones: usize,
    high_risk_zones: usize,
    degraded: bool,
}

fn collect_stats(store: &dyn Datastore) -> Result<DashboardStats, StoreError> {
    let orders = store.orders()?;
    let vehicles = store.vehicles()?;
    let zones = store.parking_zones()?;

    Ok(DashboardStats {
        total_orders: orders.len(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
        delivered_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .count(),
        vehicles: vehicles.len(),
        available_vehicles: vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::Available)
            .count(),
        hubs: store.hubs()?.len(),
        parking_zones: zones.len(),
        high_risk_zones: zones
            .iter()
            .filter(|z| risk(Some(z)) == RiskLabel::HighRisk)
            .count(),
        degraded: false,
    })
}

async fn dashboard_stats(State(state): State<Arc<AppState>>) -> Json<DashboardStats> {
    let stats = state.store_call(collect_stats).await.unwrap_or_else(|err| {
        warn!(error = %err, "datastore unavailable; dashboard stats degraded");
        DashboardStats {
            degraded: true,
            ..DashboardStats::default()
        }
    });

    Json(stats)
}
