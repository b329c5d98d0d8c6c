//! SQLite-backed store.
//!
//! Every statement binds its values through `?N` parameters; user input is
//! never spliced into SQL text.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::models::location::GeoPoint;
use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::models::site::{Hub, NewHub, NewParkingZone, ParkingZone};
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleStatus};
use crate::store::{Dataset, Datastore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_name  TEXT    NOT NULL,
    address        TEXT    NOT NULL,
    latitude       REAL    NOT NULL,
    longitude      REAL    NOT NULL,
    priority_score INTEGER NOT NULL DEFAULT 1,
    time_window    TEXT,
    status         TEXT    NOT NULL DEFAULT 'Pending',
    created_at     TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS vehicles (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name     TEXT    NOT NULL,
    type     TEXT    NOT NULL,
    capacity INTEGER NOT NULL,
    status   TEXT    NOT NULL DEFAULT 'Available'
);
CREATE TABLE IF NOT EXISTS hubs (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL,
    latitude  REAL NOT NULL,
    longitude REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS parking_zones (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    name               TEXT NOT NULL,
    latitude           REAL NOT NULL,
    longitude          REAL NOT NULL,
    availability_score REAL NOT NULL
);
";

const ORDER_COLUMNS: &str = "id, customer_name, address, latitude, longitude, priority_score, \
                             time_window, status, created_at";

pub struct SqliteStore {
    connection: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open(path)?;
        Self::with_connection(connection, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(connection: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
            path,
        })
    }

    /// Accepts `sqlite://path`, `sqlite:path` or a bare path.
    pub fn path_from_url(url: &str) -> &str {
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }

    /// Inserts `data` (with fresh ids) when every table is empty.
    pub fn seed_if_empty(&self, data: &Dataset) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let existing: i64 = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM orders) + (SELECT COUNT(*) FROM vehicles) \
             + (SELECT COUNT(*) FROM hubs) + (SELECT COUNT(*) FROM parking_zones)",
            [],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(false);
        }

        let tx = conn.unchecked_transaction()?;
        for order in &data.orders {
            tx.execute(
                "INSERT INTO orders (customer_name, address, latitude, longitude, priority_score, \
                 time_window, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    order.customer_name,
                    order.address,
                    order.location.lat,
                    order.location.lng,
                    order.priority_score,
                    order.time_window,
                    order.status.as_str(),
                    order.created_at.to_rfc3339(),
                ],
            )?;
        }
        for vehicle in &data.vehicles {
            tx.execute(
                "INSERT INTO vehicles (name, type, capacity, status) VALUES (?1, ?2, ?3, ?4)",
                params![
                    vehicle.name,
                    vehicle.vehicle_type,
                    vehicle.capacity,
                    vehicle.status.to_string(),
                ],
            )?;
        }
        for hub in &data.hubs {
            tx.execute(
                "INSERT INTO hubs (name, latitude, longitude) VALUES (?1, ?2, ?3)",
                params![hub.name, hub.location.lat, hub.location.lng],
            )?;
        }
        for zone in &data.zones {
            tx.execute(
                "INSERT INTO parking_zones (name, latitude, longitude, availability_score) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    zone.name,
                    zone.location.lat,
                    zone.location.lng,
                    zone.availability_score
                ],
            )?;
        }
        tx.commit()?;

        info!(orders = data.orders.len(), "seeded empty sqlite store with demo records");
        Ok(true)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

/// Raw `orders` row before status and timestamp are validated.
struct OrderRow {
    id: i64,
    customer_name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    priority_score: i32,
    time_window: Option<String>,
    status: String,
    created_at: String,
}

impl OrderRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            customer_name: row.get(1)?,
            address: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            priority_score: row.get(5)?,
            time_window: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|err| StoreError::Corrupt(format!("order {}: {err}", row.id)))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|err| StoreError::Corrupt(format!("order {} created_at: {err}", row.id)))?
            .with_timezone(&Utc);

        Ok(Order {
            id: row.id,
            customer_name: row.customer_name,
            address: row.address,
            location: GeoPoint {
                lat: row.latitude,
                lng: row.longitude,
            },
            priority_score: row.priority_score,
            time_window: row.time_window,
            status,
            created_at,
        })
    }
}

fn load_orders(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Order>, StoreError> {
    let mut statement = conn.prepare(sql)?;
    let rows = statement
        .query_map(params, OrderRow::read)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(Order::try_from).collect()
}

fn load_order(conn: &Connection, id: i64) -> Result<Option<Order>, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
            params![id],
            OrderRow::read,
        )
        .optional()?;

    row.map(Order::try_from).transpose()
}

struct VehicleRow {
    id: i64,
    name: String,
    vehicle_type: String,
    capacity: u32,
    status: String,
}

impl VehicleRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            vehicle_type: row.get(2)?,
            capacity: row.get(3)?,
            status: row.get(4)?,
        })
    }
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<VehicleStatus>()
            .map_err(|err| StoreError::Corrupt(format!("vehicle {}: {err}", row.id)))?;

        Ok(Vehicle {
            id: row.id,
            name: row.name,
            vehicle_type: row.vehicle_type,
            capacity: row.capacity,
            status,
        })
    }
}

impl Datastore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        let conn = self.lock()?;
        load_orders(
            &conn,
            &format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"),
            [],
        )
    }

    fn pending_orders(&self) -> Result<Vec<Order>, StoreError> {
        let conn = self.lock()?;
        load_orders(
            &conn,
            &format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 COLLATE NOCASE ORDER BY id"
            ),
            params![OrderStatus::Pending.as_str()],
        )
    }

    fn order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let conn = self.lock()?;
        load_order(&conn, id)
    }

    fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let conn = self.lock()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO orders (customer_name, address, latitude, longitude, priority_score, \
             time_window, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                order.customer_name,
                order.address,
                order.location.lat,
                order.location.lng,
                order.priority_score,
                order.time_window,
                OrderStatus::Pending.as_str(),
                created_at.to_rfc3339(),
            ],
        )?;

        Ok(Order {
            id: conn.last_insert_rowid(),
            customer_name: order.customer_name,
            address: order.address,
            location: order.location,
            priority_score: order.priority_score,
            time_window: order.time_window,
            status: OrderStatus::Pending,
            created_at,
        })
    }

    fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        load_order(&conn, id)
    }

    fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        let conn = self.lock()?;
        let mut statement =
            conn.prepare("SELECT id, name, type, capacity, status FROM vehicles ORDER BY id")?;
        let rows = statement
            .query_map([], VehicleRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO vehicles (name, type, capacity, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                vehicle.name,
                vehicle.vehicle_type,
                vehicle.capacity,
                vehicle.status.to_string(),
            ],
        )?;

        Ok(Vehicle {
            id: conn.last_insert_rowid(),
            name: vehicle.name,
            vehicle_type: vehicle.vehicle_type,
            capacity: vehicle.capacity,
            status: vehicle.status,
        })
    }

    fn hubs(&self) -> Result<Vec<Hub>, StoreError> {
        let conn = self.lock()?;
        let mut statement =
            conn.prepare("SELECT id, name, latitude, longitude FROM hubs ORDER BY id")?;
        let hubs = statement
            .query_map([], |row| {
                Ok(Hub {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    location: GeoPoint {
                        lat: row.get(2)?,
                        lng: row.get(3)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hubs)
    }

    fn insert_hub(&self, hub: NewHub) -> Result<Hub, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO hubs (name, latitude, longitude) VALUES (?1, ?2, ?3)",
            params![hub.name, hub.location.lat, hub.location.lng],
        )?;

        Ok(Hub {
            id: conn.last_insert_rowid(),
            name: hub.name,
            location: hub.location,
        })
    }

    fn parking_zones(&self) -> Result<Vec<ParkingZone>, StoreError> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "SELECT id, name, latitude, longitude, availability_score FROM parking_zones \
             ORDER BY id",
        )?;
        let zones = statement
            .query_map([], |row| {
                Ok(ParkingZone {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    location: GeoPoint {
                        lat: row.get(2)?,
                        lng: row.get(3)?,
                    },
                    availability_score: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(zones)
    }

    fn insert_parking_zone(&self, zone: NewParkingZone) -> Result<ParkingZone, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO parking_zones (name, latitude, longitude, availability_score) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                zone.name,
                zone.location.lat,
                zone.location.lng,
                zone.availability_score
            ],
        )?;

        Ok(ParkingZone {
            id: conn.last_insert_rowid(),
            name: zone.name,
            location: zone.location,
            availability_score: zone.availability_score,
        })
    }
}
