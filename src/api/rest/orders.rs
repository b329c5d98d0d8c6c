use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use crate::api::rest::{or_empty, require_text, require_valid_point};
use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::providers::resolve_location;
use crate::state::AppState;

const DEFAULT_PRIORITY: i32 = 1;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub address: String,
    /// Geocoded from `address` when absent.
    pub location: Option<GeoPoint>,
    pub priority_score: Option<i32>,
    pub time_window: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let customer_name = require_text("customer_name", payload.customer_name)?;
    let address = require_text("address", payload.address)?;
    let explicit = payload
        .location
        .map(|point| require_valid_point("location", point))
        .transpose()?;

    let priority_score = payload.priority_score.unwrap_or(DEFAULT_PRIORITY);
    if priority_score < 0 {
        return Err(AppError::BadRequest(
            "priority_score cannot be negative".to_string(),
        ));
    }

    let location = resolve_location(
        explicit,
        &address,
        state.geocoder.as_deref(),
        state.settings.provider_timeout,
        state.settings.default_point,
    )
    .await;

    let order = NewOrder {
        customer_name,
        address,
        location,
        priority_score,
        time_window: payload
            .time_window
            .map(|window| window.trim().to_string())
            .filter(|window| !window.is_empty()),
    };
    let order = state
        .store_call(move |store| store.insert_order(order))
        .await?;

    info!(order_id = order.id, geocoded = explicit.is_none(), "order created");
    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(or_empty(state.store_call(|store| store.orders()).await, "orders"))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store_call(move |store| store.order(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let status = payload.status;
    let order = state
        .store_call(move |store| store.update_order_status(id, status))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    info!(order_id = id, status = %order.status, "order status updated");
    Ok(Json(order))
}
