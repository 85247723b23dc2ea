//! Module for core services.
//!
//! This module holds the session-scoped server-state cache, the policy that
//! refreshes it after mutations, and the registry of draft form workflows.

pub mod cache;
pub mod drafts;
pub mod invalidation;
