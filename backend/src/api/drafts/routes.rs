//! Defines the HTTP routes of the draft workflow API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{advance_stage, close_draft, dispatch_action, get_draft, open_draft};
use crate::state::AppState;

pub fn drafts_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/drafts", post(open_draft))
        .route("/api/drafts/:id", get(get_draft).delete(close_draft))
        .route("/api/drafts/:id/actions", post(dispatch_action))
        .route("/api/drafts/:id/advance", post(advance_stage))
}
