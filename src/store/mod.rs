//! Datastore port consumed by the HTTP handlers and the optimizer.
//!
//! Reads always come back in id order, which is also arrival order.

pub mod demo;
pub mod memory;
pub mod sqlite;
pub mod unavailable;

use thiserror::Error;

use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::models::site::{Hub, NewHub, NewParkingZone, ParkingZone};
use crate::models::vehicle::{NewVehicle, Vehicle};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use unavailable::UnavailableStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub trait Datastore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// False only for the stand-in used when the configured database failed to open.
    fn is_available(&self) -> bool {
        true
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError>;
    fn pending_orders(&self) -> Result<Vec<Order>, StoreError>;
    fn order(&self, id: i64) -> Result<Option<Order>, StoreError>;
    fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;
    fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError>;
    fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StoreError>;

    fn hubs(&self) -> Result<Vec<Hub>, StoreError>;
    fn insert_hub(&self, hub: NewHub) -> Result<Hub, StoreError>;

    fn parking_zones(&self) -> Result<Vec<ParkingZone>, StoreError>;
    fn insert_parking_zone(&self, zone: NewParkingZone) -> Result<ParkingZone, StoreError>;
}

/// Everything one optimization call reads, fetched together.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub orders: Vec<Order>,
    pub zones: Vec<ParkingZone>,
    pub hubs: Vec<Hub>,
    pub vehicles: Vec<Vehicle>,
}

impl Dataset {
    /// Loads pending orders plus every zone, hub and vehicle.
    pub fn load_pending(store: &dyn Datastore) -> Result<Self, StoreError> {
        Ok(Self {
            orders: store.pending_orders()?,
            zones: store.parking_zones()?,
            hubs: store.hubs()?,
            vehicles: store.vehicles()?,
        })
    }
}
