use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};

/// Cached bearer token with its effective expiry.
///
/// `expires_at` already has the safety margin subtracted, so the token is
/// usable strictly before that instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Credential for a freshly granted token: `now + expires_in - safety_margin`.
    ///
    /// Returns `None` when the resulting instant is not representable.
    pub fn from_grant(
        token: String,
        expires_in_seconds: u64,
        safety_margin_seconds: u64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let lifetime = i64::try_from(expires_in_seconds).ok()?;
        let margin = i64::try_from(safety_margin_seconds).ok()?;
        let delta = TimeDelta::try_seconds(lifetime.checked_sub(margin)?)?;
        let expires_at = now.checked_add_signed(delta)?;
        Some(Self { token, expires_at })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Client identifier and secret used for the client-credentials exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientSecrets {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// `Basic base64("{id}:{secret}")`
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }

    /// First characters of the client id, safe to log.
    pub fn client_id_hint(&self) -> String {
        let hint: String = self.client_id.chars().take(5).collect();
        format!("{}...", hint)
    }
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id_hint())
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
