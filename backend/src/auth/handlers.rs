//! Handler functions for authentication-related API endpoints.
//!
//! Login stores the refresh token as the session cookie, logout removes it,
//! the session endpoint runs the bootstrap check for a role, and the OAuth
//! endpoints serve the redirect capture page.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use fitcoach_adapters::Envelope;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{
    errors::AuthError,
    models::{LoginRequest, LoginResponse, Role, SessionCredential, TOKEN_COOKIE, USER_ID_COOKIE, USER_TYPE_COOKIE},
    oauth::parse_fragment,
    service::{expired_cookie, marker_cookie, session_cookie},
    session::{read_credential, SessionGate},
};
use crate::{errors::AppError, state::AppState};

pub const LOGIN_OK: &str = "Logged in successfully";
pub const LOGOUT_OK: &str = "Logged out successfully";

fn credential_from(
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(SessionCredential, LoginRequest), AuthError> {
    let Json(request) = payload.map_err(|e| AuthError::InvalidPayload(e.body_text()))?;
    let credential = SessionCredential::new(request.refresh_token.as_str()).ok_or(AuthError::MissingRefreshToken)?;
    Ok((credential, request))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> (CookieJar, Json<LoginResponse>) {
    match credential_from(payload) {
        Ok((credential, request)) => {
            info!("Session issued");
            let secure = state.config.is_production();
            let mut jar = jar.add(session_cookie(credential.as_str().to_string(), secure));

            if let Some(user_id) = request.user_id.filter(|id| !id.is_empty()) {
                jar = jar.add(marker_cookie(USER_ID_COOKIE, user_id, secure));
            }
            if let Some(role) = request.user_type {
                jar = jar.add(marker_cookie(USER_TYPE_COOKIE, role.marker().to_string(), secure));
            }

            (jar, Json(LoginResponse::ok(LOGIN_OK)))
        }
        Err(e) => {
            warn!("Login failed: {e}");
            (jar, Json(LoginResponse::failed(e)))
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Json<LoginResponse>) {
    if let Some(credential) = read_credential(&jar) {
        state.caches.remove(&credential);
        state.drafts.close_all(&credential);
        info!("Session closed");
    }

    let jar = [TOKEN_COOKIE, USER_ID_COOKIE, USER_TYPE_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| jar.remove(expired_cookie(name)));

    (jar, Json(LoginResponse::ok(LOGOUT_OK)))
}

pub async fn session_status(Path(role): Path<String>, jar: CookieJar) -> Result<Json<Envelope>, AppError> {
    let role: Role = role.parse().map_err(AppError::MalformedPayload)?;

    let mut gate = SessionGate::new(role);
    gate.resolve(&jar);

    Ok(Json(Envelope::success(
        "Session checked",
        Some(json!({
            "role": gate.role(),
            "validating": gate.is_validating(),
            "session": gate.phase(),
        })),
    )))
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub fragment: String,
}

pub async fn oauth_callback(payload: Result<Json<OAuthCallback>, JsonRejection>) -> Result<Json<Envelope>, AppError> {
    let Json(callback) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;
    let parsed = parse_fragment(&callback.fragment).map_err(|e| AppError::MalformedPayload(e.to_string()))?;

    Ok(Json(Envelope::success("Authorization captured", Some(json!(parsed)))))
}

pub async fn oauth_client(State(state): State<Arc<AppState>>) -> Json<Envelope> {
    Json(Envelope::success(
        "OAuth client",
        Some(json!({ "client_id": state.config.oauth_client_id })),
    ))
}
