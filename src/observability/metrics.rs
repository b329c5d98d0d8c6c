use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub optimizations_total: IntCounterVec,
    pub optimization_latency_seconds: HistogramVec,
    pub routing_legs_total: IntCounterVec,
    pub orders_routed: IntGauge,
    pub store_degraded_total: IntCounter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let optimizations_total = IntCounterVec::new(
            Opts::new("optimizations_total", "Total optimization runs by strategy"),
            &["strategy"],
        )
        .expect("valid optimizations_total metric");

        let optimization_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "optimization_latency_seconds",
                "Latency of optimization runs in seconds",
            ),
            &["outcome"],
        )
        .expect("valid optimization_latency_seconds metric");

        let routing_legs_total = IntCounterVec::new(
            Opts::new("routing_legs_total", "Route legs by geometry source"),
            &["source"],
        )
        .expect("valid routing_legs_total metric");

        let orders_routed = IntGauge::new(
            "orders_routed",
            "Pending orders placed on routes by the latest optimization run",
        )
        .expect("valid orders_routed metric");

        let store_degraded_total = IntCounter::new(
            "store_degraded_total",
            "Optimization runs served from demonstration data because the store failed",
        )
        .expect("valid store_degraded_total metric");

        registry
            .register(Box::new(optimizations_total.clone()))
            .expect("register optimizations_total");
        registry
            .register(Box::new(optimization_latency_seconds.clone()))
            .expect("register optimization_latency_seconds");
        registry
            .register(Box::new(routing_legs_total.clone()))
            .expect("register routing_legs_total");
        registry
            .register(Box::new(orders_routed.clone()))
            .expect("register orders_routed");
        registry
            .register(Box::new(store_degraded_total.clone()))
            .expect("register store_degraded_total");

        Self {
            registry,
            optimizations_total,
            optimization_latency_seconds,
            routing_legs_total,
            orders_routed,
            store_degraded_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
