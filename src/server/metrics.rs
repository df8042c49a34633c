use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Metric name prefix for all catalog server metrics
const PREFIX: &str = "openmusic";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Cache Metrics
    pub static ref CACHE_LOOKUPS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_cache_lookups_total"), "Cache lookups by key namespace and outcome"),
        &["namespace", "outcome"]
    ).expect("Failed to create cache_lookups_total metric");

    pub static ref CACHE_INVALIDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_cache_invalidations_total"), "Cache invalidations issued"),
        &["kind"]
    ).expect("Failed to create cache_invalidations_total metric");

    // Playlist Metrics
    pub static ref ACTIVITY_RECORDING_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_activity_recording_failures_total"),
            "Playlist activities that could not be recorded"
        ),
        &["action"]
    ).expect("Failed to create activity_recording_failures_total metric");

    pub static ref EXPORT_DISPATCH_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_export_dispatch_total"), "Playlist export requests by outcome"),
        &["outcome"]
    ).expect("Failed to create export_dispatch_total metric");

    // Catalog Metrics
    pub static ref CATALOG_ITEMS_TOTAL: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_catalog_items_total"), "Total items in catalog"),
        &["type"]
    ).expect("Failed to create catalog_items_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(CACHE_LOOKUPS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CACHE_INVALIDATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ACTIVITY_RECORDING_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(EXPORT_DISPATCH_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_ITEMS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn init_catalog_metrics(num_albums: usize, num_songs: usize, num_playlists: usize) {
    CATALOG_ITEMS_TOTAL
        .with_label_values(&["album"])
        .set(num_albums as f64);
    CATALOG_ITEMS_TOTAL
        .with_label_values(&["song"])
        .set(num_songs as f64);
    CATALOG_ITEMS_TOTAL
        .with_label_values(&["playlist"])
        .set(num_playlists as f64);
}

/// `kind` is one of "album", "song" or "playlist".
pub fn record_catalog_item_added(kind: &str) {
    CATALOG_ITEMS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_catalog_item_removed(kind: &str) {
    CATALOG_ITEMS_TOTAL.with_label_values(&[kind]).dec();
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// `outcome` is one of "hit", "miss" or "error".
pub fn record_cache_lookup(namespace: &str, outcome: &str) {
    CACHE_LOOKUPS_TOTAL
        .with_label_values(&[namespace, outcome])
        .inc();
}

pub fn record_cache_invalidation(kind: &str) {
    CACHE_INVALIDATIONS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_activity_failure(action: &str) {
    ACTIVITY_RECORDING_FAILURES_TOTAL
        .with_label_values(&[action])
        .inc();
}

pub fn record_export_dispatch(outcome: &str) {
    EXPORT_DISPATCH_TOTAL.with_label_values(&[outcome]).inc();
}

/// Collapses ids out of a request path so it can be used as a label,
/// e.g. `/albums/album-abc/likes` becomes `/albums/{id}/likes`.
pub fn categorize_endpoint(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_id = ["album-", "song-", "playlist-"]
                .iter()
                .any(|prefix| segment.starts_with(prefix));
            if is_id {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
