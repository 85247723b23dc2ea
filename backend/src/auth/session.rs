//! Session bootstrap: the client-side re-check of session presence.
//!
//! Signals are read through an injected [`SessionStore`] and the verdict
//! comes from the same [`decide`] function the request-time guard uses, so
//! the two checks cannot drift apart. Any missing or mismatched signal
//! produces a redirect. The `user_id` / `user_type` markers are written by
//! login when the request carries them; otherwise the client sets them.

use std::collections::HashMap;

use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::{
    models::{GuardDecision, Role, SessionCredential, TOKEN_COOKIE, USER_ID_COOKIE, USER_TYPE_COOKIE},
    service::decide,
};

/// Read access to locally persisted session signals.
pub trait SessionStore {
    fn read(&self, key: &str) -> Option<String>;
}

impl SessionStore for CookieJar {
    fn read(&self, key: &str) -> Option<String> {
        self.get(key).map(|cookie| cookie.value().to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

pub fn read_credential(store: &dyn SessionStore) -> Option<SessionCredential> {
    store.read(TOKEN_COOKIE).and_then(SessionCredential::new)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSignals {
    pub user_id: Option<String>,
    pub user_type: Option<String>,
}

impl SessionSignals {
    pub fn read(store: &dyn SessionStore) -> Self {
        Self {
            user_id: store.read(USER_ID_COOKIE),
            user_type: store.read(USER_TYPE_COOKIE),
        }
    }

    pub fn authenticates(&self, role: Role) -> bool {
        let has_identity = self.user_id.as_deref().is_some_and(|id| !id.is_empty());
        has_identity && self.user_type.as_deref() == Some(role.marker())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GatePhase {
    Validating,
    Render,
    Redirect { target: String },
}

pub struct SessionGate {
    role: Role,
    phase: GatePhase,
}

impl SessionGate {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            phase: GatePhase::Validating,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> &GatePhase {
        &self.phase
    }

    /// True until [`resolve`](Self::resolve) ran; callers show a placeholder meanwhile.
    pub fn is_validating(&self) -> bool {
        self.phase == GatePhase::Validating
    }

    pub fn resolve(&mut self, store: &dyn SessionStore) -> &GatePhase {
        let signals = SessionSignals::read(store);
        let authenticated = signals.authenticates(self.role);

        self.phase = match decide(self.role.protected_prefix(), authenticated) {
            GuardDecision::Allow => GatePhase::Render,
            GuardDecision::Redirect(target) => GatePhase::Redirect { target },
        };
        &self.phase
    }
}
