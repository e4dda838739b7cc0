use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub dispatches_total: IntCounterVec,
    pub dispatch_latency_seconds: HistogramVec,
    pub rides_ongoing: IntGauge,
    pub drivers_registered: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let dispatches_total = IntCounterVec::new(
            Opts::new("dispatches_total", "Total ride dispatch attempts by outcome"),
            &["outcome"],
        )
        .expect("valid dispatches_total metric");

        let dispatch_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of ride dispatch in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let rides_ongoing = IntGauge::new("rides_ongoing", "Current number of ongoing rides")
            .expect("valid rides_ongoing metric");

        let drivers_registered =
            IntGauge::new("drivers_registered", "Number of registered drivers")
                .expect("valid drivers_registered metric");

        registry
            .register(Box::new(dispatches_total.clone()))
            .expect("register dispatches_total");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(rides_ongoing.clone()))
            .expect("register rides_ongoing");
        registry
            .register(Box::new(drivers_registered.clone()))
            .expect("register drivers_registered");

        Self {
            registry,
            dispatches_total,
            dispatch_latency_seconds,
            rides_ongoing,
            drivers_registered,
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
