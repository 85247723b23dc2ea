//! Handler functions for the draft workflow API.
//!
//! Every draft belongs to the session cookie that opened it. Requests
//! without a session are rejected, and drafts of other sessions look missing.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use fitcoach_adapters::Envelope;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    auth::{read_credential, SessionCredential},
    errors::AppError,
    forms::{validate_stage_with, FieldPresence, FormAction, FormMode},
    state::AppState,
};

fn parse<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::MalformedPayload(e.body_text()))
}

fn session_owner(jar: &CookieJar) -> Result<SessionCredential, AppError> {
    read_credential(jar).ok_or(AppError::Unauthenticated)
}

pub async fn open_draft(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<FormMode>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let owner = session_owner(&jar)?;
    let mode = parse(payload)?;
    let (id, context) = state.drafts.open(&owner, mode);
    let draft = context.state().map_err(|e| AppError::from_context(id, e))?;

    Ok(Json(Envelope::success(
        "Draft opened",
        Some(json!({ "id": id, "state": draft })),
    )))
}

pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<u64>,
) -> Result<Json<Envelope>, AppError> {
    let owner = session_owner(&jar)?;
    let draft = state
        .drafts
        .get(&owner, id)?
        .state()
        .map_err(|e| AppError::from_context(id, e))?;

    Ok(Json(Envelope::success("Draft fetched", Some(json!({ "id": id, "state": draft })))))
}

/// Applies one `{type, payload}` record. Unrecognised records change nothing.
pub async fn dispatch_action(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let owner = session_owner(&jar)?;
    let record = parse(payload)?;
    let draft = state
        .drafts
        .get(&owner, id)?
        .dispatch_record(record)
        .map_err(|e| AppError::from_context(id, e))?;

    Ok(Json(Envelope::success("Draft updated", Some(json!({ "id": id, "state": draft })))))
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub required: Vec<String>,
    pub next_stage: i64,
    #[serde(default)]
    pub presence: FieldPresence,
}

pub async fn advance_stage(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<u64>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let owner = session_owner(&jar)?;
    let request = parse(payload)?;
    let context = state.drafts.get(&owner, id)?;
    let current = context.state().map_err(|e| AppError::from_context(id, e))?;

    let check = validate_stage_with(&current, &request.required, |value| request.presence.is_set(value));
    if !check.is_complete() {
        return Ok(Json(Envelope::success(
            "Stage incomplete",
            Some(json!({ "id": id, "check": check, "state": current })),
        )));
    }

    let draft = context
        .dispatch(FormAction::SetCurrentStage(request.next_stage))
        .map_err(|e| AppError::from_context(id, e))?;

    Ok(Json(Envelope::success(
        "Stage advanced",
        Some(json!({ "id": id, "check": check, "state": draft })),
    )))
}

pub async fn close_draft(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<u64>,
) -> Result<Json<Envelope>, AppError> {
    let owner = session_owner(&jar)?;
    state.drafts.close(&owner, id)?;

    Ok(Json(Envelope::success("Draft closed", None)))
}
