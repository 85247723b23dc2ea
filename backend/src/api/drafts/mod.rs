//! Module for the draft workflow API.
//!
//! Multi-stage forms kept server-side: clients open a draft, dispatch
//! `{type, payload}` action records to it, ask to advance a stage once the
//! stage's required fields are set, and close it when done.

pub mod handlers;
pub mod routes;
