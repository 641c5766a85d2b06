// crates/novyra-preflight/src/probe.rs
// ============================================================================
// Module: Network Probes
// Description: Opt-in reachability checks for the assistant API and database.
// Purpose: Confirm credentials and connectivity before a deploy.
// Dependencies: reqwest, novyra-config
// ============================================================================

//! ## Overview
//! Probes are the only part of the preflight that touches the network, and
//! they run only when requested. The assistant probe issues one bounded
//! `GET {base}/models` with the configured key; it never sends chat content.
//! The database probe opens and drops a TCP connection.
//!
//! Security posture: redirects are never followed, so the bearer key cannot be
//! forwarded to another origin. Errors never carry the key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

use novyra_config::SecretValue;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by network probes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// HTTP client could not be constructed.
    #[error("probe client error: {0}")]
    Client(String),
    /// Request or connection failed before a response arrived.
    #[error("probe transport error: {0}")]
    Transport(String),
    /// Host name did not resolve.
    #[error("probe resolution error: {0}")]
    Resolve(String),
}

// ============================================================================
// SECTION: Assistant Probe
// ============================================================================

/// User agent sent by the assistant probe.
pub const PROBE_USER_AGENT: &str = concat!("novyra-deploy/", env!("CARGO_PKG_VERSION"));

/// Classified response of the assistant probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantProbeStatus {
    /// 2xx: the key was accepted.
    Accepted(u16),
    /// 401 or 403: the key was rejected.
    Rejected(u16),
    /// Any other status.
    Unexpected(u16),
}

impl AssistantProbeStatus {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Accepted(status),
            401 | 403 => Self::Rejected(status),
            _ => Self::Unexpected(status),
        }
    }
}

/// Credential check against the assistant API.
///
/// # Invariants
/// - Redirects are not followed.
/// - The request lifecycle is bounded by the configured timeout.
pub struct AssistantProbe {
    /// HTTP client used for the probe.
    client: Client,
}

impl AssistantProbe {
    /// Builds a probe with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Client`] when the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(PROBE_USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|_| ProbeError::Client("http client build failed".to_string()))?;
        Ok(Self {
            client,
        })
    }

    /// Sends `GET models_url` with the key as a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] when no response is received.
    pub fn check(
        &self,
        models_url: &str,
        api_key: &SecretValue,
    ) -> Result<AssistantProbeStatus, ProbeError> {
        let response = self
            .client
            .get(models_url)
            .bearer_auth(api_key.expose())
            .send()
            .map_err(|err| ProbeError::Transport(transport_label(&err)))?;
        Ok(AssistantProbeStatus::from_status(response.status().as_u16()))
    }
}

/// Describes a request failure without echoing headers.
fn transport_label(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_builder() {
        "invalid request url".to_string()
    } else {
        "request failed".to_string()
    }
}

// ============================================================================
// SECTION: Database Probe
// ============================================================================

/// Opens a TCP connection to `host:port`, trying each resolved address.
///
/// # Errors
///
/// Returns [`ProbeError::Resolve`] when the host does not resolve and
/// [`ProbeError::Transport`] when no address accepts a connection in time.
pub fn probe_tcp(host: &str, port: u16, timeout: Duration) -> Result<SocketAddr, ProbeError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| ProbeError::Resolve(format!("{host} did not resolve")))?
        .collect();
    if addrs.is_empty() {
        return Err(ProbeError::Resolve(format!("{host} did not resolve")));
    }
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return Ok(addr),
            Err(err) => last_error = Some(err),
        }
    }
    Err(ProbeError::Transport(last_error.map_or_else(
        || "connection failed".to_string(),
        |err| format!("{host}:{port} refused or timed out ({})", err.kind()),
    )))
}
