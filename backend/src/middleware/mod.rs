//! General-purpose middleware for the API.
//!
//! Request tracing and the CORS layer. The route guard lives with the rest
//! of the authentication code in `auth::middleware`.

use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::CorsLayer;
use tracing::{info, Instrument};

pub async fn request_tracing(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        route = %request.uri().path(),
    );
    let started = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
    });
    response
}

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}
