//! Custom error types specific to authentication failures.
//!
//! None of these become HTTP error statuses: login failures are reported in
//! a 200 body and authorization failures are redirects.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Refresh token is missing")]
    MissingRefreshToken,

    #[error("{0}")]
    InvalidPayload(String),

    #[error("Access token is missing from the redirect")]
    MissingAccessToken,

    #[error("Authorization was denied: {0}")]
    Denied(String),
}
