//! Transport backed by `reqwest`.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{RequestOptions, Transport};
use crate::PistonError;

/// Transport built on `reqwest`, for hosts with a regular HTTP client stack.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing `reqwest::Client`, e.g. one with a proxy configured.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn prepare(&self, mut request: reqwest::RequestBuilder, options: &RequestOptions) -> reqwest::RequestBuilder {
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, PistonError> {
        if !response.status().is_success() {
            log::warn!("Piston server answered {} for {}", response.status(), response.url());
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Value, PistonError> {
        log::debug!("GET {}", url);
        let response = self.prepare(self.client.get(url), options).send().await?;
        Self::read_json(response).await
    }

    async fn post(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Value, PistonError> {
        log::debug!("POST {}", url);
        let payload = serde_json::to_vec(body)?;
        let response = self
            .prepare(self.client.post(url), options)
            .body(payload)
            .send()
            .await?;
        Self::read_json(response).await
    }
}
