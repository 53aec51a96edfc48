use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Arc::new(Metrics::build().expect("static metric definitions are valid"))
    }).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Bootstrap metrics
    pub token_fetch_requests: IntCounter,
    pub token_fetch_failures: IntCounterVec,
    pub token_fetch_duration: Histogram,
    /// 0 unset, 1 absent, 2 value
    pub token_state: IntGauge,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("csrfbootstrap".into()), None)?;

        let metrics = Self {
            token_fetch_requests: IntCounter::new("token_fetch_requests_total", "Total csrf token fetch attempts")?,
            token_fetch_failures: IntCounterVec::new(Opts::new("token_fetch_failures_total", "Csrf token fetch failures by reason"), &["reason"])?,
            token_fetch_duration: Histogram::with_opts(HistogramOpts::new("token_fetch_duration_seconds", "Csrf token fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]))?,
            token_state: IntGauge::new("token_state", "Csrf token slot: 0 unset, 1 absent, 2 value")?,

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup")?,
            up: IntGauge::new("up", "1 if service is healthy")?,

            registry,
        };

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_fetch_requests.clone()))?;
        reg.register(Box::new(metrics.token_fetch_failures.clone()))?;
        reg.register(Box::new(metrics.token_fetch_duration.clone()))?;
        reg.register(Box::new(metrics.token_state.clone()))?;
        reg.register(Box::new(metrics.config_validation_errors.clone()))?;
        reg.register(Box::new(metrics.up.clone()))?;

        Ok(metrics)
    }
}
