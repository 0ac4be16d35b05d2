use anyhow::{Context, Result};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Once;
use std::time::Duration;
use tracing::info;

/// Metric name prefix for all metrics of this server
const PREFIX: &str = "vidshare";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    pub static ref AUTH_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_auth_attempts_total"), "Registration and login attempts"),
        &["action", "outcome"]
    ).expect("Failed to create auth_attempts_total metric");

    pub static ref VIDEO_ENGAGEMENT_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_video_engagement_total"), "Likes, dislikes and views"),
        &["kind"]
    ).expect("Failed to create video_engagement_total metric");
}

static INIT: Once = Once::new();

/// Registers all metrics, safe to call more than once.
pub fn init_metrics() {
    INIT.call_once(|| {
        let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
        let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
        let _ = REGISTRY.register(Box::new(AUTH_ATTEMPTS_TOTAL.clone()));
        let _ = REGISTRY.register(Box::new(VIDEO_ENGAGEMENT_TOTAL.clone()));
        info!("Metrics system initialized");
    });
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_auth_attempt(action: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    AUTH_ATTEMPTS_TOTAL
        .with_label_values(&[action, outcome])
        .inc();
}

pub fn record_video_engagement(kind: &str) {
    VIDEO_ENGAGEMENT_TOTAL.with_label_values(&[kind]).inc();
}

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
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

/// Serves `GET /metrics` on its own port.
pub async fn run_metrics_server(port: u16) -> Result<()> {
    let app = Router::new().route("/metrics", get(metrics_handler));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", port))?;
    Ok(axum::serve(listener, app).await?)
}
