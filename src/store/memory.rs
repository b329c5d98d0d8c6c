use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::models::site::{Hub, NewHub, NewParkingZone, ParkingZone};
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::store::{Dataset, Datastore, StoreError};

struct Table<T> {
    rows: DashMap<i64, T>,
    next_id: AtomicI64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn seed(&self, id: i64, row: T) {
        self.rows.insert(id, row);
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
    }

    fn insert_with(&self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn sorted(&self) -> Vec<T> {
        let mut rows: Vec<(i64, T)> = self
            .rows
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        rows.sort_unstable_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

/// Process-local store; contents are lost on restart.
pub struct InMemoryStore {
    orders: Table<Order>,
    vehicles: Table<Vehicle>,
    hubs: Table<Hub>,
    zones: Table<ParkingZone>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            orders: Table::new(),
            vehicles: Table::new(),
            hubs: Table::new(),
            zones: Table::new(),
        }
    }

    /// A store pre-filled with `data`, keeping the records' ids.
    pub fn seeded(data: Dataset) -> Self {
        let store = Self::new();
        for order in data.orders {
            store.orders.seed(order.id, order);
        }
        for vehicle in data.vehicles {
            store.vehicles.seed(vehicle.id, vehicle);
        }
        for hub in data.hubs {
            store.hubs.seed(hub.id, hub);
        }
        for zone in data.zones {
            store.zones.seed(zone.id, zone);
        }
        store
    }
}

impl Datastore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.sorted())
    }

    fn pending_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .sorted()
            .into_iter()
            .filter(|order| order.status == OrderStatus::Pending)
            .collect())
    }

    fn order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.rows.get(&id).map(|entry| entry.value().clone()))
    }

    fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        Ok(self.orders.insert_with(|id| Order {
            id,
            customer_name: order.customer_name,
            address: order.address,
            location: order.location,
            priority_score: order.priority_score,
            time_window: order.time_window,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }))
    }

    fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.rows.get_mut(&id).map(|mut order| {
            order.status = status;
            order.clone()
        }))
    }

    fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self.vehicles.sorted())
    }

    fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StoreError> {
        Ok(self.vehicles.insert_with(|id| Vehicle {
            id,
            name: vehicle.name,
            vehicle_type: vehicle.vehicle_type,
            capacity: vehicle.capacity,
            status: vehicle.status,
        }))
    }

    fn hubs(&self) -> Result<Vec<Hub>, StoreError> {
        Ok(self.hubs.sorted())
    }

    fn insert_hub(&self, hub: NewHub) -> Result<Hub, StoreError> {
        Ok(self.hubs.insert_with(|id| Hub {
            id,
            name: hub.name,
            location: hub.location,
        }))
    }

    fn parking_zones(&self) -> Result<Vec<ParkingZone>, StoreError> {
        Ok(self.zones.sorted())
    }

    fn insert_parking_zone(&self, zone: NewParkingZone) -> Result<ParkingZone, StoreError> {
        Ok(self.zones.insert_with(|id| ParkingZone {
            id,
            name: zone.name,
            location: zone.location,
            availability_score: zone.availability_score,
        }))
    }
}
