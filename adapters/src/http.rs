//! HTTP implementation of [`BackendApi`] on top of `reqwest`.
//!
//! The base URL comes straight from configuration and is used as an opaque
//! prefix; it is not validated here.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{errors::AdapterError, models::Envelope, BackendApi};

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send(&self, request: RequestBuilder, credential: Option<&str>) -> Result<Envelope, AdapterError> {
        let request = match credential {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        // Failure envelopes may arrive with any HTTP status.
        match serde_json::from_slice::<Envelope>(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => Err(AdapterError::Decode(e)),
            Err(_) => {
                warn!("Backend answered {status} without an envelope");
                Err(AdapterError::Status(status.as_u16()))
            }
        }
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn fetch(&self, path: &str, credential: Option<&str>) -> Result<Envelope, AdapterError> {
        let url = self.url_for(path);
        debug!("GET {url}");

        self.send(self.client.get(url), credential).await
    }

    async fn mutate(
        &self,
        path: &str,
        body: Value,
        credential: Option<&str>,
    ) -> Result<Envelope, AdapterError> {
        let url = self.url_for(path);
        debug!("POST {url}");

        self.send(self.client.post(url).json(&body), credential).await
    }
}
