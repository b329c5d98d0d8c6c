use serde::{Deserialize, Serialize};

use crate::models::location::{GeoPoint, Located};

/// Depot every route starts from and returns to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hub {
    pub id: i64,
    pub name: String,
    pub location: GeoPoint,
}

impl Located for Hub {
    fn location(&self) -> GeoPoint {
        self.location
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParkingZone {
    pub id: i64,
    pub name: String,
    pub location: GeoPoint,
    /// Availability/quality of parking; lower is worse.
    pub availability_score: f64,
}

impl Located for ParkingZone {
    fn location(&self) -> GeoPoint {
        self.location
    }
}

#[derive(Debug, Clone)]
pub struct NewHub {
    pub name: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone)]
pub struct NewParkingZone {
    pub name: String,
    pub location: GeoPoint,
    pub availability_score: f64,
}
