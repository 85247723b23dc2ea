//! Handler functions for the resource API.
//!
//! Responses are the backend's envelope as-is. A `status_code` other than 200
//! inside the body is a failure even though the HTTP status is 200.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use fitcoach_adapters::Envelope;
use serde_json::Value;

use crate::{
    auth::read_credential,
    errors::AppError,
    services::{cache::KeyMatcher, invalidation::apply_mutation},
    state::AppState,
};

/// Canonical form of a wildcard resource path. Empty and `.` segments are
/// dropped; `..` is refused so a request cannot climb out of the API root.
fn resource_path(raw: &str) -> Result<String, AppError> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(AppError::MalformedPayload(format!("invalid resource path {raw}"))),
            segment => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return Err(AppError::MalformedPayload("empty resource path".to_string()));
    }
    Ok(segments.join("/"))
}

pub async fn fetch_resource(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(path): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let credential = read_credential(&jar).ok_or(AppError::Unauthenticated)?;
    let path = resource_path(&path)?;
    let cache = state.caches.for_credential(&credential);

    let entry = cache.get(&path).await?;
    if entry.envelope.is_success() {
        state.caches.retain(&credential, &cache);
    }

    Ok(Json(Envelope::clone(&entry.envelope)))
}

pub async fn mutate_resource(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(path): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let credential = read_credential(&jar).ok_or(AppError::Unauthenticated)?;
    let path = resource_path(&path)?;
    let Json(body) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;
    let cache = state.caches.for_credential(&credential);

    let envelope = apply_mutation(
        &cache,
        &path,
        body,
        KeyMatcher::related(&path),
        &state.config.invalidation,
    )
    .await?;
    if envelope.is_success() {
        state.caches.retain(&credential, &cache);
    }

    Ok(Json(envelope))
}
