//! Stand-in installed when the configured database cannot be opened.
//!
//! Every call fails with [`StoreError::Unavailable`], so reads take the
//! degraded paths and writes are refused instead of landing in memory.

use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::models::site::{Hub, NewHub, NewParkingZone, ParkingZone};
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::store::{Datastore, StoreError};

pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

impl Datastore for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        self.fail()
    }

    fn pending_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.fail()
    }

    fn order(&self, _id: i64) -> Result<Option<Order>, StoreError> {
        self.fail()
    }

    fn insert_order(&self, _order: NewOrder) -> Result<Order, StoreError> {
        self.fail()
    }

    fn update_order_status(
        &self,
        _id: i64,
        _status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        self.fail()
    }

    fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        self.fail()
    }

    fn insert_vehicle(&self, _vehicle: NewVehicle) -> Result<Vehicle, StoreError> {
        self.fail()
    }

    fn hubs(&self) -> Result<Vec<Hub>, StoreError> {
        self.fail()
    }

    fn insert_hub(&self, _hub: NewHub) -> Result<Hub, StoreError> {
        self.fail()
    }

    fn parking_zones(&self) -> Result<Vec<ParkingZone>, StoreError> {
        self.fail()
    }

    fn insert_parking_zone(&self, _zone: NewParkingZone) -> Result<ParkingZone, StoreError> {
        self.fail()
    }
}
