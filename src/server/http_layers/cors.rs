use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Allows browser calls from the frontend origin only.
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer> {
    let origin = frontend_url
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid frontend url {:?}", frontend_url))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
