//! Client for the Piston remote code execution API
//!
//! A [`PistonClient`] submits source files to a Piston server and returns the
//! captured output, and lists the language runtimes the server supports. The
//! listing is cached in memory for a configurable time. Network I/O is
//! delegated to a [`Transport`]; two are provided, one on `reqwest`
//! ([`HttpTransport`]) and one on raw TCP/TLS sockets ([`SocketTransport`]).
//! The caller picks which one a client is built with.

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod transport;

pub use client::PistonClient;
pub use config::{ClientConfig, DEFAULT_CACHE_TIME, PUBLIC_SERVER};
pub use errors::PistonError;
pub use transport::{HttpTransport, RequestOptions, SocketTransport, Transport};

pub use piston_types::*;
