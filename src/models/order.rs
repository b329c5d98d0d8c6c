use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::location::{GeoPoint, Located};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum OrderStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InTransit => "InTransit",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "intransit" | "in_transit" | "in transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(format!(
                "unknown order status: {other}, expected Pending/InTransit/Delivered/Cancelled"
            )),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub address: String,
    pub location: GeoPoint,
    pub priority_score: i32,
    pub time_window: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Located for Order {
    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// An order as accepted by the store, before an id is assigned.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub address: String,
    pub location: GeoPoint,
    pub priority_score: i32,
    pub time_window: Option<String>,
}
