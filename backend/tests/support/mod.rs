#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use fitcoach_adapters::BackendApi;
use fitcoach_backend::{app, config::Config, state::AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub fn router_with(backend: Arc<dyn BackendApi>) -> Router {
    router_with_config(backend, Config::from_lookup(|_| None).expect("default config"))
}

pub fn router_with_config(backend: Arc<dyn BackendApi>, config: Config) -> Router {
    app(AppState::new(config, backend))
}

/// State and router sharing it, for tests that inspect what a request left behind.
pub fn state_and_router(backend: Arc<dyn BackendApi>) -> (Arc<AppState>, Router) {
    let state = AppState::new(Config::from_lookup(|_| None).expect("default config"), backend);
    (Arc::clone(&state), app(state))
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    post_raw(uri, body.to_string(), cookie)
}

pub fn post_raw(uri: &str, body: String, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).expect("request")
}

pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().expect("ascii cookie").to_string())
        .collect()
}
