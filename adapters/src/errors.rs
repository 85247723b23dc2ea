//! Custom error types specific to the `adapters` crate.
//!
//! These cover transport-level failures only. A backend that answered with a
//! failure envelope is not an error at this layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend answered with HTTP {0}")]
    Status(u16),
}
