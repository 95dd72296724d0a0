//! The client core: configuration, runtime caching, and the two API calls.

use piston_types::{ExecuteRequest, ExecuteResponse, Runtime};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::RuntimeCache;
use crate::config::{ClientConfig, ClientSettings};
use crate::transport::{HttpTransport, RequestOptions, SocketTransport, Transport};
use crate::PistonError;

/// Client for a Piston server, generic over the transport doing the I/O.
///
/// The runtime listing is cached for the configured cache time. Executions
/// are never cached. Every operation returns a `Result`; nothing panics on a
/// bad server or network.
///
/// ```no_run
/// use piston_client::{ClientConfig, ExecuteFile, ExecuteRequest, PistonClient};
///
/// # async fn run() -> Result<(), piston_client::PistonError> {
/// let client = PistonClient::http(ClientConfig::default());
/// let request = ExecuteRequest::new("node-js", "*", vec![ExecuteFile::new("console.log(1)")]);
/// let response = client.execute(&request).await?;
/// if let Some(result) = response.completed() {
///     println!("{}", result.run.stdout);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PistonClient<T: Transport> {
    settings: ClientSettings,
    transport: T,
    cache: RuntimeCache,
}

impl<T: Transport> PistonClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let settings = ClientSettings::from(config);
        let cache = RuntimeCache::new(settings.cache_time);
        Self {
            settings,
            transport,
            cache,
        }
    }

    /// API root all endpoint URLs are built from.
    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    pub fn cache_time(&self) -> Duration {
        self.settings.cache_time
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runtimes supported by the server.
    ///
    /// Served from cache while the last successful listing is younger than
    /// the cache time. A failed fetch leaves the cache as it was, so the next
    /// call goes to the network again.
    pub async fn runtimes(&self) -> Result<Arc<Vec<Runtime>>, PistonError> {
        if let Some(runtimes) = self.cache.get().await {
            log::debug!("Serving {} runtimes from cache", runtimes.len());
            return Ok(runtimes);
        }

        let url = format!("{}/runtimes", self.settings.base_url);
        log::debug!("Runtime cache miss, fetching {}", url);

        match self.fetch::<Vec<Runtime>>(&url).await {
            Ok(runtimes) => {
                let runtimes = Arc::new(runtimes);
                self.cache.store(runtimes.clone()).await;
                log::info!(
                    "Cached {} runtimes for {:?}",
                    runtimes.len(),
                    self.settings.cache_time
                );
                Ok(runtimes)
            }
            Err(e) => {
                log::warn!("Failed to fetch runtimes from {}: {}", url, e);
                Err(e)
            }
        }
    }

    /// First runtime whose language or one of whose aliases is `name`.
    pub async fn resolve_runtime(&self, name: &str) -> Result<Option<Runtime>, PistonError> {
        let runtimes = self.runtimes().await?;
        Ok(runtimes.iter().find(|runtime| runtime.matches(name)).cloned())
    }

    /// Forget the cached listing so the next [`Self::runtimes`] call fetches.
    pub async fn invalidate_runtimes(&self) {
        log::debug!("Runtime cache invalidated");
        self.cache.clear().await;
    }

    /// Run code on the server.
    ///
    /// The request goes out unvalidated. A refusal from the server, such as an
    /// unknown language, comes back as [`ExecuteResponse::Rejected`]; any other
    /// JSON body comes back as [`ExecuteResponse::Other`].
    pub async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, PistonError> {
        let url = format!("{}/execute", self.settings.base_url);
        let body = serde_json::to_value(request)?;

        let value = self
            .transport
            .post(&url, &body, &RequestOptions::json())
            .await
            .inspect_err(|e| log::warn!("Execution request to {} failed: {}", url, e))?;

        let response: ExecuteResponse = serde_json::from_value(value)?;
        match &response {
            ExecuteResponse::Completed(_) => {}
            ExecuteResponse::Rejected(rejection) => {
                log::debug!("Server rejected execution: {}", rejection.message)
            }
            ExecuteResponse::Other(body) => log::warn!("Unrecognised execute response from {}: {}", url, body),
        }
        Ok(response)
    }

    async fn fetch<R: DeserializeOwned>(&self, url: &str) -> Result<R, PistonError> {
        let value: Value = self.transport.get(url, &RequestOptions::json()).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl PistonClient<HttpTransport> {
    /// Client over `reqwest`.
    pub fn http(config: ClientConfig) -> Self {
        Self::new(HttpTransport::new(), config)
    }
}

impl PistonClient<SocketTransport> {
    /// Client over raw TCP/TLS sockets.
    pub fn socket(config: ClientConfig) -> Result<Self, PistonError> {
        Ok(Self::new(SocketTransport::new()?, config))
    }
}

impl PistonClient<Box<dyn Transport>> {
    /// Client over a transport chosen at runtime.
    pub fn boxed(transport: Box<dyn Transport>, config: ClientConfig) -> Self {
        Self::new(transport, config)
    }
}
