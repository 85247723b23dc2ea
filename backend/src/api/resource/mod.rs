//! Module for the generic resource API.
//!
//! Reads go through the caller's session cache; writes are forwarded to the
//! backend and refresh the related cache keys afterwards.

pub mod handlers;
pub mod routes;
