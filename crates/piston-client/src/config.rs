//! Client configuration and the server URL rules derived from it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The public Piston deployment.
pub const PUBLIC_SERVER: &str = "https://emkc.org";

/// How long a runtime listing stays valid when no cache time is configured.
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(60 * 60 * 24);

/// Construction-time options for [`crate::PistonClient`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the Piston server; defaults to [`PUBLIC_SERVER`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Lifetime of a cached runtime listing; defaults to [`DEFAULT_CACHE_TIME`].
    #[serde(
        default,
        rename = "cacheTimeMs",
        with = "duration_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub cache_time: Option<Duration>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = Some(cache_time);
        self
    }
}

/// Normalised form of [`ClientConfig`], fixed for the client's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientSettings {
    pub base_url: String,
    pub cache_time: Duration,
}

impl From<ClientConfig> for ClientSettings {
    fn from(config: ClientConfig) -> Self {
        let server = config.server.as_deref().unwrap_or(PUBLIC_SERVER);
        Self {
            base_url: base_url_for(server),
            cache_time: config.cache_time.unwrap_or(DEFAULT_CACHE_TIME),
        }
    }
}

/// API root for `server`. The public deployment mounts the API under
/// `/api/v2/piston`; self-hosted servers serve it from `/api/v2`.
pub fn base_url_for(server: &str) -> String {
    let server = server.strip_suffix('/').unwrap_or(server);
    if server == PUBLIC_SERVER {
        format!("{}/api/v2/piston", server)
    } else {
        format!("{}/api/v2", server)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_u64(duration.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
