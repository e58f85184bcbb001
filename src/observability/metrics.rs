use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Relay metrics
    pub relay_requests: IntCounterVec,
    pub relay_duration: HistogramVec,

    // Credential metrics
    pub token_refreshes: IntCounterVec,
    pub token_expiry_unix: IntGauge,

    // Config/runtime
    pub config_parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("catalogrelay".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Relay
            relay_requests: IntCounterVec::new(Opts::new("relay_requests_total", "Upstream relay calls by resource and outcome"),&["resource", "outcome"],).unwrap(),
            relay_duration: HistogramVec::new(HistogramOpts::new("relay_request_duration_seconds", "Upstream relay call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["resource"],).unwrap(),

            // Credential
            token_refreshes: IntCounterVec::new(Opts::new("token_refresh_total", "Client-credentials exchanges by outcome"),&["outcome"],).unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Effective expiry of the cached credential").unwrap(),

            // Config/runtime
            config_parse_failures: IntCounter::new("config_parse_failures_total", "Config files that failed to parse").unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.relay_requests.clone())).unwrap();
        reg.register(Box::new(metrics.relay_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.config_parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
