//! Network adapters the client core delegates I/O to.

use async_trait::async_trait;
use serde_json::Value;

use crate::PistonError;

pub mod http;
pub mod socket;

pub use http::HttpTransport;
pub use socket::SocketTransport;

/// Headers attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// The options the client sends with every call.
    pub fn json() -> Self {
        Self {
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// One GET and one POST returning parsed JSON.
///
/// Implementations fail on network errors and on bodies that are not JSON,
/// and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Value, PistonError>;

    async fn post(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Value, PistonError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Value, PistonError> {
        (**self).get(url, options).await
    }

    async fn post(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Value, PistonError> {
        (**self).post(url, body, options).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Value, PistonError> {
        (**self).get(url, options).await
    }

    async fn post(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Value, PistonError> {
        (**self).post(url, body, options).await
    }
}
