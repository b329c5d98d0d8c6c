use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::api::rest::{or_empty, require_text, require_valid_point};
use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::site::{Hub, NewHub, NewParkingZone, ParkingZone};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hubs", get(list_hubs).post(create_hub))
        .route("/parking-zones", get(list_parking_zones).post(create_parking_zone))
}

#[derive(Deserialize)]
pub struct CreateHubRequest {
    pub name: String,
    pub location: GeoPoint,
}

#[derive(Deserialize)]
pub struct CreateParkingZoneRequest {
    pub name: String,
    pub location: GeoPoint,
    pub availability_score: f64,
}

async fn create_hub(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateHubRequest>,
) -> Result<Json<Hub>, AppError> {
    let hub = NewHub {
        name: require_text("name", payload.name)?,
        location: require_valid_point("location", payload.location)?,
    };
    let hub = state.store_call(move |store| store.insert_hub(hub)).await?;

    Ok(Json(hub))
}

async fn list_hubs(State(state): State<Arc<AppState>>) -> Json<Vec<Hub>> {
    Json(or_empty(state.store_call(|store| store.hubs()).await, "hubs"))
}

async fn create_parking_zone(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateParkingZoneRequest>,
) -> Result<Json<ParkingZone>, AppError> {
    if !payload.availability_score.is_finite() || payload.availability_score < 0.0 {
        return Err(AppError::BadRequest(
            "availability_score must be a non-negative number".to_string(),
        ));
    }

    let zone = NewParkingZone {
        name: require_text("name", payload.name)?,
        location: require_valid_point("location", payload.location)?,
        availability_score: payload.availability_score,
    };
    let zone = state
        .store_call(move |store| store.insert_parking_zone(zone))
        .await?;

    Ok(Json(zone))
}

async fn list_parking_zones(State(state): State<Arc<AppState>>) -> Json<Vec<ParkingZone>> {
    Json(or_empty(
        state.store_call(|store| store.parking_zones()).await,
        "parking zones",
    ))
}
