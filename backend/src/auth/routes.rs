//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle login, logout, the session bootstrap check and the
//! OAuth redirect capture. They are merged into the main Axum router.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{login, logout, oauth_callback, oauth_client, session_status};
use crate::state::AppState;

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/session/:role", get(session_status))
        .route("/api/oauth/callback", post(oauth_callback))
        .route("/api/oauth/client", get(oauth_client))
}
