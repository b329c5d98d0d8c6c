use serde::{Deserialize, Serialize};

use crate::models::location::GeoPoint;
use crate::models::site::Hub;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    Safe,
    HighRisk,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopKind {
    Hub,
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneRef {
    pub id: i64,
    pub name: String,
    pub availability_score: f64,
    /// Planar distance in degrees between the stop and the zone.
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParkingAssessment {
    pub zone: Option<ZoneRef>,
    /// Only set by the weighted scorer.
    pub fit_score: Option<f64>,
    pub risk: RiskLabel,
    pub suggested_action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stop {
    pub kind: StopKind,
    pub location: GeoPoint,
    pub label: String,
    pub order_id: Option<i64>,
    pub address: Option<String>,
    pub time_window: Option<String>,
    pub priority_score: Option<i32>,
    pub parking: Option<ParkingAssessment>,
}

impl Stop {
    pub fn hub(hub: &Hub) -> Self {
        Self {
            kind: StopKind::Hub,
            location: hub.location,
            label: hub.name.clone(),
            order_id: None,
            address: None,
            time_window: None,
            priority_score: None,
            parking: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegSource {
    Road,
    StraightLine,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Leg {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub path: Vec<GeoPoint>,
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub source: LegSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteMetrics {
    pub stop_count: usize,
    pub total_distance_km: f64,
    pub total_duration_minutes: f64,
    pub fallback_legs: usize,
}

/// A vehicle's tour for one optimization call. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub vehicle_id: String,
    pub vehicle: Option<String>,
    pub color: String,
    pub hub: Hub,
    pub stops: Vec<Stop>,
    pub legs: Vec<Leg>,
    pub geometry: Vec<GeoPoint>,
    pub metrics: RouteMetrics,
}
