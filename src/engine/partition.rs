//! Splits pending orders into per-vehicle chunks.
//!
//! This is a load-balancing heuristic, not a vehicle routing solver: orders
//! are optionally sorted by a strategy key and then sliced into consecutive
//! chunks of `ceil(len / vehicle_count)`. Travel distance is never minimised.

use std::fmt;

use crate::models::order::Order;

const BALANCED_PALETTE: [&str; 4] = ["#2563eb", "#16a34a", "#9333ea", "#0891b2"];
const SPEED_PALETTE: [&str; 4] = ["#dc2626", "#ea580c", "#d97706", "#be123c"];
const PARKING_PALETTE: [&str; 4] = ["#0d9488", "#4f46e5", "#65a30d", "#0369a1"];
const MIXED_PALETTE: [&str; 6] = [
    "#2563eb", "#dc2626", "#16a34a", "#d97706", "#9333ea", "#0891b2",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Arrival order is kept as-is.
    Balanced,
    /// Latitude ascending, a crude south-to-north sweep.
    Speed,
    /// Priority score descending.
    Parking,
    /// Unrecognised label; ordered like `Balanced`, coloured from the mixed palette.
    Other(String),
}

impl Strategy {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "balanced" => Strategy::Balanced,
            "speed" => Strategy::Speed,
            "parking" => Strategy::Parking,
            _ => Strategy::Other(label.trim().to_string()),
        }
    }

    pub fn palette(&self) -> &'static [&'static str] {
        match self {
            Strategy::Balanced => &BALANCED_PALETTE,
            Strategy::Speed => &SPEED_PALETTE,
            Strategy::Parking => &PARKING_PALETTE,
            Strategy::Other(_) => &MIXED_PALETTE,
        }
    }

    /// Bounded label for metrics; unrecognised strategies share `"other"`.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Speed => "speed",
            Strategy::Parking => "parking",
            Strategy::Other(_) => "other",
        }
    }

    /// Colour for the 1-indexed vehicle slot `V-{slot}`.
    pub fn color_for(&self, slot: usize) -> &'static str {
        let palette = self.palette();
        palette[slot % palette.len()]
    }

    fn order(&self, orders: &mut [Order]) {
        match self {
            Strategy::Speed => orders.sort_by(|a, b| a.location.lat.total_cmp(&b.location.lat)),
            Strategy::Parking => orders.sort_by(|a, b| b.priority_score.cmp(&a.priority_score)),
            Strategy::Balanced | Strategy::Other(_) => {}
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Balanced => f.write_str("balanced"),
            Strategy::Speed => f.write_str("speed"),
            Strategy::Parking => f.write_str("parking"),
            Strategy::Other(label) => f.write_str(label),
        }
    }
}

/// Clamps a requested vehicle count into `1..=order_count`.
pub fn effective_vehicle_count(requested: i64, order_count: usize) -> usize {
    let requested = usize::try_from(requested.max(1)).unwrap_or(usize::MAX);
    requested.min(order_count.max(1))
}

pub fn partition(
    mut orders: Vec<Order>,
    vehicle_count: i64,
    strategy: &Strategy,
) -> Vec<Vec<Order>> {
    if orders.is_empty() {
        return Vec::new();
    }

    let vehicles = effective_vehicle_count(vehicle_count, orders.len());
    let chunk_size = orders.len().div_ceil(vehicles);

    strategy.order(&mut orders);

    orders
        .chunks(chunk_size)
        .map(<[Order]>::to_vec)
        .collect()
}
