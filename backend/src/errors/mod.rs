//! Global application error types and handlers.
//!
//! Every API failure is rendered as the same `{status_code, message}` envelope
//! the backend uses, so clients have a single failure shape to inspect.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fitcoach_adapters::{AdapterError, Envelope};
use thiserror::Error;

use crate::{config::ConfigError, forms::ContextError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Draft {0} not found")]
    DraftNotFound(u64),

    #[error("Draft {0} was closed")]
    DraftClosed(u64),

    #[error("Backend request failed: {0}")]
    Backend(#[from] AdapterError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::DraftNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DraftClosed(_) => StatusCode::GONE,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The envelope a client receives for this error.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::failure(self.status().as_u16(), self.to_string())
    }

    pub fn from_context(id: u64, err: ContextError) -> Self {
        match err {
            ContextError::Disposed => AppError::DraftClosed(id),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = self.to_envelope();

        // Backend failures reach the client as a logical failure over HTTP 200.
        let status = match self {
            AppError::Backend(_) => StatusCode::OK,
            _ => self.status(),
        };

        (status, Json(envelope)).into_response()
    }
}
