//! Defines the HTTP routes of the resource API.

use std::sync::Arc;

use axum::{routing::get, Router};

use super::handlers::{fetch_resource, mutate_resource};
use crate::state::AppState;

pub fn resource_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/resource/*path", get(fetch_resource).post(mutate_resource))
}
