//! Core `adapters` crate for abstracting the external coaching backend.
//!
//! This crate defines the `BackendApi` trait, which outlines the generic data
//! fetch and mutation calls the web layer makes against the backend, and
//! provides the concrete implementations (HTTP, in-memory).

pub mod errors;
pub mod http;
pub mod memory;
pub mod models;

use async_trait::async_trait;
use serde_json::Value;

pub use errors::AdapterError;
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use models::Envelope;

/// Generic request surface of the external backend.
///
/// Implementations return `Ok` whenever the transport succeeded, even if the
/// backend reported a logical failure inside the envelope. Callers must check
/// [`Envelope::is_success`] before treating the operation as done.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Fetches the resource at `path`, authenticated with `credential` when given.
    async fn fetch(&self, path: &str, credential: Option<&str>) -> Result<Envelope, AdapterError>;

    /// Submits a mutation of the resource at `path`.
    async fn mutate(
        &self,
        path: &str,
        body: Value,
        credential: Option<&str>,
    ) -> Result<Envelope, AdapterError>;
}
