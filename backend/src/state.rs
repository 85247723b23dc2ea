//! Shared application state handed to every handler.

use std::sync::Arc;

use fitcoach_adapters::{BackendApi, HttpBackend};

use crate::{
    config::Config,
    services::{cache::SessionCaches, drafts::DraftRegistry},
};

pub struct AppState {
    pub config: Config,
    pub caches: SessionCaches,
    pub drafts: DraftRegistry,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn BackendApi>) -> Arc<Self> {
        Arc::new(Self {
            config,
            caches: SessionCaches::new(backend),
            drafts: DraftRegistry::new(),
        })
    }

    pub fn from_config(config: Config) -> Arc<Self> {
        let backend = Arc::new(HttpBackend::new(config.api_url.clone()));
        Self::new(config, backend)
    }
}
