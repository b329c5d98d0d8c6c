use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::api::rest::{or_empty, require_text};
use crate::error::AppError;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/vehicles", get(list_vehicles).post(create_vehicle))
}

#[derive(Deserialize)]
pub struct CreateVehicleRequest {
    pub name: String,
    #[serde(alias = "type")]
    pub vehicle_type: String,
    pub capacity: u32,
    pub status: Option<VehicleStatus>,
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<Json<Vehicle>, AppError> {
    let name = require_text("name", payload.name)?;
    let vehicle_type = require_text("vehicle_type", payload.vehicle_type)?;

    if payload.capacity == 0 {
        return Err(AppError::BadRequest("capacity must be > 0".to_string()));
    }

    let vehicle = NewVehicle {
        name,
        vehicle_type,
        capacity: payload.capacity,
        status: payload.status.unwrap_or(VehicleStatus::Available),
    };
    let vehicle = state
        .store_call(move |store| store.insert_vehicle(vehicle))
        .await?;

    Ok(Json(vehicle))
}

async fn list_vehicles(State(state): State<Arc<AppState>>) -> Json<Vec<Vehicle>> {
    Json(or_empty(
        state.store_call(|store| store.vehicles()).await,
        "vehicles",
    ))
}
