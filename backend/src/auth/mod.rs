//! Authentication module for sessions and access control.
//!
//! This module provides the route access guard, the login and logout
//! endpoints, the session bootstrap check and OAuth redirect parsing.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod service;
pub mod session;

// Re-exports for convenience
pub use errors::*;
pub use middleware::*;
pub use models::*;
pub use oauth::*;
pub use routes::*;
pub use service::*;
pub use session::*;
