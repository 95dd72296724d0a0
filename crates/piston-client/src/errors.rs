//! Failure modes of a Piston request.
//!
//! Only transport and decoding failures are errors. A server that answers with
//! a well-formed JSON refusal has still answered, and that answer is returned
//! to the caller as data.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PistonError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("HTTP exchange failed: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("Invalid HTTP request: {0}")]
    InvalidRequest(#[from] hyper::http::Error),
    #[error("Failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PistonError {
    /// True for failures that happened before a response body was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PistonError::Http(_)
                | PistonError::Io(_)
                | PistonError::Tls(_)
                | PistonError::InvalidUrl(_)
                | PistonError::UnsupportedScheme(_)
        ) || matches!(self, PistonError::Hyper(e) if !e.is_parse())
    }
}

impl From<rustls::Error> for PistonError {
    fn from(err: rustls::Error) -> Self {
        PistonError::Tls(err.to_string())
    }
}
