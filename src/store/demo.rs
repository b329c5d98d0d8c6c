//! Fixed demonstration records around Hamburg's city centre.
//!
//! Used to seed an empty store and as the degraded-mode dataset when the
//! configured store cannot be read.

use chrono::{TimeZone, Utc};

use crate::models::location::GeoPoint;
use crate::models::order::{Order, OrderStatus};
use crate::models::site::{Hub, ParkingZone};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::store::Dataset;

pub const DEFAULT_POINT: GeoPoint = GeoPoint {
    lat: 53.5511,
    lng: 9.9937,
};

const ORDERS: [(&str, &str, f64, f64, i32, &str); 6] = [
    ("Anna Weber", "Spitalerstraße 12", 53.5516, 10.0012, 5, "09:00-11:00"),
    ("Café Elbblick", "Landungsbrücken 3", 53.5458, 9.9686, 2, "10:00-12:00"),
    ("Jonas Krüger", "Grindelallee 80", 53.5682, 9.9837, 4, "11:00-13:00"),
    ("Buchladen Ottensen", "Ottenser Hauptstraße 20", 53.5527, 9.9283, 1, "13:00-15:00"),
    ("Mia Schulz", "Lange Reihe 45", 53.5564, 10.0118, 3, "14:00-16:00"),
    ("Hafencity Office", "Am Sandtorkai 50", 53.5433, 9.9894, 5, "08:00-10:00"),
];

const ZONES: [(&str, f64, f64, f64); 4] = [
    ("Mönckebergstraße Loading Bay", 53.5507, 10.0005, 25.0),
    ("Landungsbrücken Kerbside", 53.5461, 9.9701, 70.0),
    ("Grindel Garage", 53.5671, 9.9851, 85.0),
    ("Hafencity Drop Zone", 53.5440, 9.9910, 45.0),
];

const VEHICLES: [(&str, &str, u32); 3] = [
    ("Van 01", "Electric Van", 120),
    ("Bike 02", "Cargo Bike", 20),
    ("Truck 03", "Truck", 400),
];

pub fn central_hub() -> Hub {
    Hub {
        id: 1,
        name: "Hamburg Central Hub".to_string(),
        location: DEFAULT_POINT,
    }
}

pub fn dataset() -> Dataset {
    let created_at = Utc
        .with_ymd_and_hms(2024, 1, 1, 6, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    let orders = ORDERS
        .iter()
        .zip(1..)
        .map(|(&(customer, address, lat, lng, priority_score, window), id)| Order {
            id,
            customer_name: customer.to_string(),
            address: address.to_string(),
            location: GeoPoint { lat, lng },
            priority_score,
            time_window: Some(window.to_string()),
            status: OrderStatus::Pending,
            created_at,
        })
        .collect();

    let zones = ZONES
        .iter()
        .zip(1..)
        .map(|(&(name, lat, lng, availability_score), id)| ParkingZone {
            id,
            name: name.to_string(),
            location: GeoPoint { lat, lng },
            availability_score,
        })
        .collect();

    let vehicles = VEHICLES
        .iter()
        .zip(1..)
        .map(|(&(name, vehicle_type, capacity), id)| Vehicle {
            id,
            name: name.to_string(),
            vehicle_type: vehicle_type.to_string(),
            capacity,
            status: VehicleStatus::Available,
        })
        .collect();

    Dataset {
        orders,
        zones,
        hubs: vec![central_hub()],
        vehicles,
    }
}
