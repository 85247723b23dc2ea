//! Central module for organizing the application's main API endpoints.
//!
//! This module groups the generic resource proxy and the draft workflow API,
//! excluding authentication routes which are handled separately.

pub mod drafts;
pub mod resource;
