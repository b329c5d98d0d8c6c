//! Turns a per-vehicle order chunk into a depot-to-depot route.

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::engine::partition::Strategy;
use crate::engine::scoring::{assess, ZoneScoring};
use crate::geo::{centroid, haversine_km, minutes_at_urban_speed, nearest};
use crate::models::location::GeoPoint;
use crate::models::order::Order;
use crate::models::route::{Leg, LegSource, Route, RouteMetrics, Stop, StopKind};
use crate::models::site::{Hub, ParkingZone};
use crate::models::vehicle::Vehicle;
use crate::providers::RoadGeometryProvider;

/// Everything a chunk is assembled against, shared by all vehicle slots.
pub struct AssemblyContext<'a> {
    pub hubs: &'a [Hub],
    pub fallback_depot: &'a Hub,
    pub zones: &'a [ParkingZone],
    pub vehicles: &'a [Vehicle],
    pub strategy: &'a Strategy,
    pub scoring: ZoneScoring,
}

impl AssemblyContext<'_> {
    /// Hub closest to the chunk's centroid, or the configured fallback.
    pub fn depot_for(&self, chunk: &[Order]) -> &Hub {
        let points: Vec<GeoPoint> = chunk.iter().map(|order| order.location).collect();

        centroid(&points)
            .and_then(|center| nearest(&center, self.hubs))
            .map_or(self.fallback_depot, |(hub, _)| hub)
    }

    /// Vehicle records are cycled over the 1-indexed slots.
    pub fn vehicle_for(&self, slot: usize) -> Option<&Vehicle> {
        if self.vehicles.is_empty() {
            return None;
        }
        self.vehicles
            .get(slot.saturating_sub(1) % self.vehicles.len())
    }
}

pub fn assemble(slot: usize, chunk: &[Order], ctx: &AssemblyContext<'_>) -> Route {
    let depot = ctx.depot_for(chunk);
    let vehicle = ctx.vehicle_for(slot);

    let mut stops = Vec::with_capacity(chunk.len() + 2);
    stops.push(Stop::hub(depot));

    for order in chunk {
        stops.push(Stop {
            kind: StopKind::Stop,
            location: order.location,
            label: order.customer_name.clone(),
            order_id: Some(order.id),
            address: Some(order.address.clone()),
            time_window: order.time_window.clone(),
            priority_score: Some(order.priority_score),
            parking: Some(assess(order, ctx.zones, vehicle, ctx.scoring)),
        });
    }

    stops.push(Stop::hub(depot));

    Route {
        vehicle_id: format!("V-{slot}"),
        vehicle: vehicle.map(|v| v.name.clone()),
        color: ctx.strategy.color_for(slot).to_string(),
        hub: depot.clone(),
        stops,
        legs: Vec::new(),
        geometry: Vec::new(),
        metrics: RouteMetrics {
            stop_count: chunk.len(),
            ..RouteMetrics::default()
        },
    }
}

pub fn straight_leg(from: GeoPoint, to: GeoPoint) -> Leg {
    let distance_km = haversine_km(&from, &to);
    Leg {
        from,
        to,
        path: vec![from, to],
        distance_km,
        duration_minutes: minutes_at_urban_speed(distance_km),
        source: LegSource::StraightLine,
    }
}

async fn road_leg(
    provider: &dyn RoadGeometryProvider,
    from: GeoPoint,
    to: GeoPoint,
    timeout: Duration,
) -> Leg {
    match tokio::time::timeout(timeout, provider.route(from, to)).await {
        Ok(Ok(path)) if path.points.len() >= 2 => Leg {
            from,
            to,
            path: path.points,
            distance_km: path.distance_km,
            duration_minutes: path.duration_minutes,
            source: LegSource::Road,
        },
        Ok(Ok(_)) => {
            debug!("road geometry had fewer than two points; using straight line");
            straight_leg(from, to)
        }
        Ok(Err(err)) => {
            warn!(error = %err, "road geometry failed; using straight line");
            straight_leg(from, to)
        }
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "road geometry timed out; using straight line"
            );
            straight_leg(from, to)
        }
    }
}

/// Fills `legs`, `geometry` and the distance/time metrics of `route`.
///
/// With a provider, every leg of the route is requested concurrently, each
/// under its own timeout. Any leg that fails becomes a two-point straight
/// line; failures never escape this function.
pub async fn attach_geometry(
    route: &mut Route,
    provider: Option<&dyn RoadGeometryProvider>,
    timeout: Duration,
) {
    let pairs: Vec<(GeoPoint, GeoPoint)> = route
        .stops
        .windows(2)
        .map(|pair| (pair[0].location, pair[1].location))
        .collect();

    route.legs = match provider {
        Some(provider) => {
            join_all(
                pairs
                    .into_iter()
                    .map(|(from, to)| road_leg(provider, from, to, timeout)),
            )
            .await
        }
        None => pairs
            .into_iter()
            .map(|(from, to)| straight_leg(from, to))
            .collect(),
    };

    route.geometry = flatten(&route.legs);
    route.metrics.total_distance_km = route.legs.iter().map(|leg| leg.distance_km).sum();
    route.metrics.total_duration_minutes = route.legs.iter().map(|leg| leg.duration_minutes).sum();
    route.metrics.fallback_legs = route
        .legs
        .iter()
        .filter(|leg| leg.source == LegSource::StraightLine)
        .count();
}

fn flatten(legs: &[Leg]) -> Vec<GeoPoint> {
    let mut line: Vec<GeoPoint> = Vec::new();

    for leg in legs {
        for point in &leg.path {
            if line.last() != Some(point) {
                line.push(*point);
            }
        }
    }

    line
}
