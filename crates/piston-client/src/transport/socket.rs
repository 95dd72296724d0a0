//! Transport that opens its own TCP (or TLS) socket per request.
//!
//! HTTP/1.1 framing is handled by a `hyper` client connection driven over the
//! socket, so only connection setup lives here.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::header::{ACCEPT, CONNECTION, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::{self, pki_types::ServerName, ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use url::{Host, Url};

use super::{RequestOptions, Transport};
use crate::PistonError;

/// Transport over raw sockets, for hosts that only offer TCP/TLS primitives.
///
/// Each request opens a fresh connection, sends `Connection: close`, and
/// parses the whole response body as JSON once it has been received. `http`
/// URLs use plain TCP, `https` URLs go through TLS.
#[derive(Clone)]
pub struct SocketTransport {
    tls: TlsConnector,
}

impl std::fmt::Debug for SocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketTransport").finish_non_exhaustive()
    }
}

impl SocketTransport {
    /// Create a transport trusting the Mozilla root set for `https` URLs.
    pub fn new() -> Result<Self, PistonError> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(Self::with_tls_config(config))
    }

    /// Create a transport with a caller-supplied TLS configuration.
    pub fn with_tls_config(config: ClientConfig) -> Self {
        Self {
            tls: TlsConnector::from(Arc::new(config)),
        }
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        options: &RequestOptions,
    ) -> Result<Value, PistonError> {
        let url = Url::parse(url)?;
        let host = url
            .host()
            .ok_or(PistonError::InvalidUrl(url::ParseError::EmptyHost))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| PistonError::UnsupportedScheme(url.scheme().to_string()))?;

        let request = build_request(method, &url, body, options)?;
        log::debug!("{} {} over raw socket", request.method(), url);

        let (status, body) = match url.scheme() {
            "http" => send(connect(&host, port).await?, request).await?,
            "https" => {
                let stream = connect(&host, port).await?;
                let stream = self.tls.connect(server_name(&host)?, stream).await?;
                send(stream, request).await?
            }
            other => return Err(PistonError::UnsupportedScheme(other.to_string())),
        };

        if !status.is_success() {
            log::warn!("Piston server answered {} for {}", status, url);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Value, PistonError> {
        self.request(Method::GET, url, None, options).await
    }

    async fn post(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Value, PistonError> {
        let payload = serde_json::to_vec(body)?;
        self.request(Method::POST, url, Some(payload), options).await
    }
}

async fn connect(host: &Host<&str>, port: u16) -> Result<TcpStream, PistonError> {
    let stream = match host {
        Host::Domain(domain) => TcpStream::connect((*domain, port)).await?,
        Host::Ipv4(ip) => TcpStream::connect((*ip, port)).await?,
        Host::Ipv6(ip) => TcpStream::connect((*ip, port)).await?,
    };
    Ok(stream)
}

fn server_name(host: &Host<&str>) -> Result<ServerName<'static>, PistonError> {
    match host {
        Host::Domain(domain) => {
            ServerName::try_from(domain.to_string()).map_err(|e| PistonError::Tls(e.to_string()))
        }
        Host::Ipv4(ip) => Ok(ServerName::IpAddress(IpAddr::V4(*ip).into())),
        Host::Ipv6(ip) => Ok(ServerName::IpAddress(IpAddr::V6(*ip).into())),
    }
}

fn build_request(
    method: Method,
    url: &Url,
    body: Option<Vec<u8>>,
    options: &RequestOptions,
) -> Result<Request<Full<Bytes>>, PistonError> {
    let target = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let host = url.host_str().unwrap_or_default();
    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut builder = Request::builder()
        .method(method)
        .uri(target)
        .header(HOST, authority)
        .header(CONNECTION, "close");
    for (name, value) in &options.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if options.header("Accept").is_none() {
        builder = builder.header(ACCEPT, "application/json");
    }

    let body = body.map(Bytes::from).unwrap_or_default();
    Ok(builder.body(Full::new(body))?)
}

async fn send<S>(stream: S, request: Request<Full<Bytes>>) -> Result<(StatusCode, Bytes), PistonError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::Builder::new()
        .title_case_headers(true)
        .handshake(TokioIo::new(stream))
        .await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::debug!("Socket connection ended with error: {}", e);
        }
    });

    let response = sender.send_request(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();
    Ok((status, body))
}
