//! Prometheus collectors describing watcher activity.
//!
//! Collectors are process-wide; applications expose them by registering them
//! on their own [`Registry`] with [`register_custom_metrics`].

use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;
use tracing::warn;


lazy_static! {
    /// Debounce decisions per category and outcome
    pub static ref TRIGGER_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("sentinel_watch_triggers_total", "Sentinel triggers by category and debounce outcome"),
        &["category", "outcome"]
    )
    .expect("metric can not be created");

    pub static ref CONNECT_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("sentinel_watch_connect_failures_total", "Failed connection attempts per Sentinel"),
        &["endpoint"]
    )
    .expect("metric can not be created");

    pub static ref LIVE_CONNECTIONS: IntGauge = IntGauge::new(
        "sentinel_watch_live_connections",
        "Sentinel pub/sub connections currently held"
    )
    .expect("metric can not be created");

    pub static ref REFRESH_RUNS: IntCounter = IntCounter::new(
        "sentinel_watch_refresh_runs_total",
        "Topology refresh actions executed"
    )
    .expect("metric can not be created");
}

pub fn register_custom_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(TRIGGER_OUTCOMES.clone()))?;
    registry.register(Box::new(CONNECT_FAILURES.clone()))?;
    registry.register(Box::new(LIVE_CONNECTIONS.clone()))?;
    registry.register(Box::new(REFRESH_RUNS.clone()))?;
    Ok(())
}

/// Text exposition of everything gathered by `registry`.
pub fn metrics_body(registry: &Registry) -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        warn!("could not encode custom metrics: {}", e);
    }
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            warn!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
