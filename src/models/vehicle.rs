use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const LARGE_CAPACITY_TYPES: [&str; 3] = ["electric van", "van", "truck"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum VehicleStatus {
    Available,
    OnRoute,
    Maintenance,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VehicleStatus::Available => "Available",
            VehicleStatus::OnRoute => "OnRoute",
            VehicleStatus::Maintenance => "Maintenance",
        };
        f.write_str(label)
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" | "active" | "idle" => Ok(VehicleStatus::Available),
            "onroute" | "on_route" | "on route" => Ok(VehicleStatus::OnRoute),
            "maintenance" => Ok(VehicleStatus::Maintenance),
            other => Err(format!(
                "unknown vehicle status: {other}, expected Available/OnRoute/Maintenance"
            )),
        }
    }
}

impl TryFrom<String> for VehicleStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub name: String,
    pub vehicle_type: String,
    pub capacity: u32,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn is_large_capacity(&self) -> bool {
        let kind = self.vehicle_type.trim().to_ascii_lowercase();
        LARGE_CAPACITY_TYPES.contains(&kind.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub name: String,
    pub vehicle_type: String,
    pub capacity: u32,
    pub status: VehicleStatus,
}
