//! One optimization call: load, partition, assemble, attach geometry.
//!
//! Nothing is persisted; every call recomputes from the store's current
//! pending orders.

use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::assembler::{assemble, attach_geometry, AssemblyContext};
use crate::engine::partition::{effective_vehicle_count, partition, Strategy};
use crate::engine::scoring::ZoneScoring;
use crate::models::route::{LegSource, Route};
use crate::state::AppState;
use crate::store::{demo, Dataset};

#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub strategy: Strategy,
    pub vehicle_count: i64,
    pub scoring: ZoneScoring,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub run_id: Uuid,
    pub strategy: String,
    pub scoring: String,
    /// Vehicle count after clamping to `1..=pending orders`.
    pub vehicle_count: usize,
    /// True when the store could not be read and demonstration data was used.
    pub degraded: bool,
    pub generated_at: DateTime<Utc>,
    pub routes: Vec<Route>,
}

pub async fn optimize(state: &AppState, request: OptimizationRequest) -> OptimizationOutcome {
    let run_id = Uuid::new_v4();
    let start = Instant::now();

    let (data, degraded) = match state.store_call(Dataset::load_pending).await {
        Ok(data) => (data, false),
        Err(err) => {
            warn!(%run_id, error = %err, "datastore unavailable; optimizing demonstration data");
            state.metrics.store_degraded_total.inc();
            (demo::dataset(), true)
        }
    };

    let order_count = data.orders.len();
    let chunks = partition(data.orders, request.vehicle_count, &request.strategy);

    let fallback_depot = state.fallback_depot();
    let ctx = AssemblyContext {
        hubs: &data.hubs,
        fallback_depot: &fallback_depot,
        zones: &data.zones,
        vehicles: &data.vehicles,
        strategy: &request.strategy,
        scoring: request.scoring,
    };

    let mut routes: Vec<Route> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| assemble(index + 1, chunk, &ctx))
        .collect();

    let provider = state.road_geometry.as_deref();
    let timeout = state.settings.provider_timeout;
    join_all(
        routes
            .iter_mut()
            .map(|route| attach_geometry(route, provider, timeout)),
    )
    .await;

    record_metrics(state, &request, &routes, order_count, degraded, start);

    info!(
        %run_id,
        strategy = %request.strategy,
        scoring = %request.scoring,
        orders = order_count,
        routes = routes.len(),
        degraded,
        "routes optimized"
    );

    OptimizationOutcome {
        run_id,
        strategy: request.strategy.to_string(),
        scoring: request.scoring.to_string(),
        vehicle_count: if order_count == 0 {
            0
        } else {
            effective_vehicle_count(request.vehicle_count, order_count)
        },
        degraded,
        generated_at: Utc::now(),
        routes,
    }
}

fn record_metrics(
    state: &AppState,
    request: &OptimizationRequest,
    routes: &[Route],
    order_count: usize,
    degraded: bool,
    start: Instant,
) {
    let metrics = &state.metrics;
    let outcome = if degraded { "degraded" } else { "ok" };

    metrics
        .optimizations_total
        .with_label_values(&[request.strategy.metric_label()])
        .inc();
    metrics
        .optimization_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    metrics.orders_routed.set(order_count as i64);

    for leg in routes.iter().flat_map(|route| &route.legs) {
        let source = match leg.source {
            LegSource::Road => "road",
            LegSource::StraightLine => "straight_line",
        };
        metrics.routing_legs_total.with_label_values(&[source]).inc();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::{optimize, OptimizationRequest};
    use crate::engine::partition::Strategy;
    use crate::engine::scoring::ZoneScoring;
    use crate::models::route::StopKind;
    use crate::state::AppState;
    use crate::store::{demo, InMemoryStore, UnavailableStore};

    fn request(strategy: &str, vehicle_count: i64) -> OptimizationRequest {
        OptimizationRequest {
            strategy: Strategy::from_label(strategy),
            vehicle_count,
            scoring: ZoneScoring::Nearest,
        }
    }

    #[tokio::test]
    async fn every_pending_order_lands_on_exactly_one_route() {
        let state = AppState::new(Arc::new(InMemoryStore::seeded(demo::dataset())));

        let outcome = optimize(&state, request("speed", 4)).await;

        assert!(!outcome.degraded);
        assert_eq!(outcome.vehicle_count, 4);
        let ids: Vec<i64> = outcome
            .routes
            .iter()
            .flat_map(|route| route.stops.iter().filter_map(|stop| stop.order_id))
            .collect();
        let unique: HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(unique.len(), 6);
    }

    #[tokio::test]
    async fn routes_start_and_end_at_the_same_hub() {
        let state = AppState::new(Arc::new(InMemoryStore::seeded(demo::dataset())));

        let outcome = optimize(&state, request("balanced", 2)).await;

        for route in &outcome.routes {
            let first = route.stops.first().unwrap();
            let last = route.stops.last().unwrap();
            assert_eq!(first.kind, StopKind::Hub);
            assert_eq!(last.kind, StopKind::Hub);
            assert_eq!(first.location, last.location);
            assert_eq!(route.legs.len(), route.stops.len() - 1);
        }
    }

    #[tokio::test]
    async fn broken_store_degrades_to_demo_data() {
        let state = AppState::new(Arc::new(UnavailableStore::new("down")));

        let outcome = optimize(&state, request("parking", 3)).await;

        assert!(outcome.degraded);
        assert_eq!(outcome.routes.len(), 3);
        assert_eq!(state.metrics.store_degraded_total.get(), 1);
    }

    #[tokio::test]
    async fn no_pending_orders_yields_no_routes() {
        let state = AppState::new(Arc::new(InMemoryStore::new()));

        let outcome = optimize(&state, request("balanced", 3)).await;

        assert!(outcome.routes.is_empty());
        assert_eq!(outcome.vehicle_count, 0);
        assert!(!outcome.degraded);
    }

    #[tokio::test]
    async fn unrecognised_strategies_share_one_metric_series() {
        let state = AppState::new(Arc::new(InMemoryStore::seeded(demo::dataset())));

        for label in ["junk-1", "junk-2", "scenic"] {
            optimize(&state, request(label, 2)).await;
        }
        optimize(&state, request("speed", 2)).await;

        let counter = &state.metrics.optimizations_total;
        assert_eq!(counter.with_label_values(&["other"]).get(), 3);
        assert_eq!(counter.with_label_values(&["speed"]).get(), 1);

        let exposition = state.metrics.encode().unwrap();
        let series = exposition
            .lines()
            .filter(|line| line.starts_with("optimizations_total{"))
            .count();
        assert_eq!(series, 2);
        assert!(!exposition.contains("junk-1"));
    }

    #[tokio::test]
    async fn unrecognised_strategy_is_echoed_back() {
        let state = AppState::new(Arc::new(InMemoryStore::seeded(demo::dataset())));

        let outcome = optimize(&state, request("scenic", 1)).await;

        assert_eq!(outcome.strategy, "scenic");
        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(
            outcome.routes[0].color,
            Strategy::from_label("scenic").color_for(1)
        );
    }
}
