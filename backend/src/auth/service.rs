//! Core authorization logic: path classification and the access decision.
//!
//! `decide` is the single authorization function. The request-time
//! middleware and the session bootstrap both call it, and the prefix table
//! below is the only place protected paths are declared.

use std::time::Duration;

use axum_extra::extract::cookie::Cookie;

use super::models::{AccessClass, GuardDecision, Role, TOKEN_COOKIE};

pub const COACH_LOGIN: &str = "/login";
pub const CLIENT_LOGIN: &str = "/client/login";
pub const COACH_DASHBOARD: &str = "/coach/dashboard";
pub const CLIENT_DASHBOARD: &str = "/client/app/dashboard";

pub const COACH_PREFIX: &str = "/coach";
pub const CLIENT_APP_PREFIX: &str = "/client/app";

/// Paths the request-time guard intercepts. Anything else bypasses it.
pub const GUARDED_PREFIXES: [&str; 2] = [COACH_PREFIX, "/client"];

pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

impl Role {
    pub fn login_path(self) -> &'static str {
        match self {
            Role::Coach => COACH_LOGIN,
            Role::Client => CLIENT_LOGIN,
        }
    }

    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Coach => COACH_DASHBOARD,
            Role::Client => CLIENT_DASHBOARD,
        }
    }

    pub fn protected_prefix(self) -> &'static str {
        match self {
            Role::Coach => COACH_PREFIX,
            Role::Client => CLIENT_APP_PREFIX,
        }
    }
}

pub fn classify(path: &str) -> AccessClass {
    if path.starts_with(Role::Coach.protected_prefix()) {
        AccessClass::CoachProtected
    } else if path.starts_with(Role::Client.protected_prefix()) {
        AccessClass::ClientProtected
    } else {
        AccessClass::Public
    }
}

/// Whether the request-time guard runs for `path` at all.
pub fn guard_applies(path: &str) -> bool {
    path == COACH_LOGIN
        || GUARDED_PREFIXES.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
}

pub fn decide(path: &str, has_credential: bool) -> GuardDecision {
    for role in [Role::Coach, Role::Client] {
        if has_credential && path == role.login_path() {
            return GuardDecision::Redirect(role.dashboard_path().to_string());
        }
    }

    match (classify(path), has_credential) {
        (AccessClass::CoachProtected, false) => GuardDecision::Redirect(Role::Coach.login_path().to_string()),
        (AccessClass::ClientProtected, false) => GuardDecision::Redirect(Role::Client.login_path().to_string()),
        _ => GuardDecision::Allow,
    }
}

/// The `token` cookie issued on login.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(SESSION_TTL.as_secs() as i64))
        .build()
}

/// Identity marker read back by the session bootstrap. Scripts may read it,
/// so unlike the token it is not `HttpOnly`.
pub fn marker_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(SESSION_TTL.as_secs() as i64))
        .build()
}

pub fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}
