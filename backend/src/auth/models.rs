//! Data structures for authentication-related entities.
//!
//! This module defines the session credential, user roles, access classes of
//! request paths, guard decisions and the login payloads.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub const TOKEN_COOKIE: &str = "token";
pub const USER_ID_COOKIE: &str = "user_id";
pub const USER_TYPE_COOKIE: &str = "user_type";

/// Opaque session token. Only its presence is ever inspected.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Returns `None` for an empty token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessClass {
    Public,
    CoachProtected,
    ClientProtected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Coach,
    Client,
}

impl Role {
    /// Value of the user-type marker for this role.
    pub fn marker(self) -> &'static str {
        match self {
            Role::Coach => "coach",
            Role::Client => "client",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coach" => Ok(Role::Coach),
            "client" => Ok(Role::Client),
            other => Err(format!("unknown role {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub refresh_token: String,
    /// Optional identity markers. When present, login stores them as the
    /// `user_id` / `user_type` cookies the session bootstrap reads.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_type: Option<Role>,
}

/// Body of the login and logout endpoints.
///
/// Failures carry no `status_code` and are sent with HTTP 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub message: String,
}

impl LoginResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status_code: Some(200),
            message: message.into(),
        }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            status_code: None,
            message: format!("{error} . Please try again later!"),
        }
    }
}
