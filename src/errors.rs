//! Error taxonomy shared by the credential manager, the relay and startup.
//!
//! Core operations return these typed errors; process plumbing (`main`,
//! config loading) wraps them in `anyhow`.

use reqwest::StatusCode;
use thiserror::Error;

/// Fatal startup problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing client credentials: {fields}")]
    MissingCredentials { fields: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("http client could not be constructed")]
    HttpClient(#[source] reqwest::Error),
}

/// Client-credentials exchange failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("client credentials are not configured")]
    MissingCredentials,

    #[error("token endpoint rejected the exchange with status {status}")]
    Rejected { status: StatusCode },

    #[error("token endpoint unreachable")]
    Transport(#[source] reqwest::Error),

    #[error("token endpoint returned an unexpected body: {0}")]
    MalformedBody(String),
}

/// Why an upstream call did not produce a usable response.
#[derive(Debug, Error)]
pub enum UpstreamCause {
    #[error("status {0}")]
    Status(StatusCode),

    #[error("transport error")]
    Transport(#[source] reqwest::Error),
}

/// Relay failures, one per way an authenticated fetch can go wrong.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no valid upstream credential")]
    Unauthenticated(#[source] AuthError),

    #[error("upstream request failed: {0}")]
    UpstreamFailure(#[source] UpstreamCause),

    #[error("upstream response has an unexpected shape: {0}")]
    MalformedResponse(String),
}

impl RelayError {
    /// Upstream HTTP status, when the failure carried one.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            RelayError::UpstreamFailure(UpstreamCause::Status(status)) => Some(*status),
            _ => None,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Unauthenticated(_) => "unauthenticated",
            RelayError::UpstreamFailure(UpstreamCause::Status(_)) => "upstream_status",
            RelayError::UpstreamFailure(UpstreamCause::Transport(_)) => "upstream_transport",
            RelayError::MalformedResponse(_) => "malformed",
        }
    }
}
