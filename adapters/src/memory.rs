//! In-memory implementation of [`BackendApi`].
//!
//! Stores resources by path and counts fetches per path. Used for local
//! development without a backend and by the test suites of dependent crates.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{errors::AdapterError, models::Envelope, BackendApi};

#[derive(Default)]
pub struct MemoryBackend {
    resources: Mutex<HashMap<String, Value>>,
    rejections: Mutex<HashMap<String, Envelope>>,
    fetches: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call, so tests can observe overlapping requests. Fetches
    /// read their data before the delay.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, path: &str, data: Value) {
        self.resources.lock().insert(normalize(path), data);
    }

    pub fn remove(&self, path: &str) -> Option<Value> {
        self.resources.lock().remove(&normalize(path))
    }

    /// Makes every mutation of `path` answer with a logical failure.
    pub fn reject(&self, path: &str, status_code: u16, message: &str) {
        self.rejections
            .lock()
            .insert(normalize(path), Envelope::failure(status_code, message));
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.lock().get(&normalize(path)).copied().unwrap_or(0)
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl BackendApi for MemoryBackend {
    async fn fetch(&self, path: &str, _credential: Option<&str>) -> Result<Envelope, AdapterError> {
        let path = normalize(path);
        *self.fetches.lock().entry(path.clone()).or_insert(0) += 1;

        // The answer reflects the data at request time, however late it arrives.
        let data = self.resources.lock().get(&path).cloned();
        self.wait().await;

        Ok(match data {
            Some(data) => Envelope::success("Fetched successfully", Some(data)),
            None => Envelope::failure(404, format!("{path} not found")),
        })
    }

    async fn mutate(
        &self,
        path: &str,
        body: Value,
        _credential: Option<&str>,
    ) -> Result<Envelope, AdapterError> {
        let path = normalize(path);

        self.wait().await;

        if let Some(rejection) = self.rejections.lock().get(&path) {
            return Ok(rejection.clone());
        }

        self.resources.lock().insert(path, body.clone());
        Ok(Envelope::success("Saved successfully", Some(body)))
    }
}
