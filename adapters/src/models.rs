//! Generic data models for the `adapters` crate.
//!
//! The backend wraps every response in the same envelope. Its `status_code`
//! field, not the HTTP status, decides whether an operation succeeded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_OK: u16 = 200;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status_code: STATUS_OK,
            message: message.into(),
            data,
        }
    }

    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}
