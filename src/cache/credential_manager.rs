use http::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::credential::{ClientSecrets, Credential};
use crate::errors::AuthError;
use crate::helpers::time::now;
use crate::observability::metrics::{get_metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS};

const GRANT_TYPE: [(&str, &str); 1] = [("grant_type", "client_credentials")];

/// Token endpoint response; fields beyond these are ignored.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    expires_in: u64,
}

/// Owns the single cached upstream credential.
///
/// Reads go through `credential`; the check-then-refresh sequence is
/// serialized by `refresh_lock`, so at most one exchange is in flight.
#[derive(Debug)]
pub struct CredentialManager {
    client: Client,
    token_url: String,
    secrets: Option<ClientSecrets>,
    safety_margin_seconds: u64,
    credential: RwLock<Option<Credential>>,
    refresh_lock: Mutex<()>,
}

impl CredentialManager {
    /// `secrets` is `None` when the service was started without credentials;
    /// every [`get_token`](Self::get_token) then fails with
    /// [`AuthError::MissingCredentials`].
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        secrets: Option<ClientSecrets>,
        safety_margin_seconds: u64,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            secrets,
            safety_margin_seconds,
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Seed the cache, e.g. with a credential obtained elsewhere.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = RwLock::new(Some(credential));
        self
    }

    pub fn has_secrets(&self) -> bool {
        self.secrets.is_some()
    }

    /// Snapshot of the cached credential, valid or not.
    pub async fn current(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    /// Return a currently valid bearer token, exchanging client credentials when
    /// the cache is empty or stale.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // another caller may have refreshed while we waited
        if let Some(token) = self.cached_token().await {
            debug!("credential refreshed by a concurrent caller");
            return Ok(token);
        }

        let metrics = get_metrics().await;
        match self.exchange().await {
            Ok(credential) => {
                metrics.token_refreshes.with_label_values(&[OUTCOME_SUCCESS]).inc();
                metrics.token_expiry_unix.set(credential.expires_at.timestamp());
                info!("obtained upstream access token, usable until {}", credential.expires_at.to_rfc3339());
                let token = credential.token.clone();
                *self.credential.write().await = Some(credential);
                Ok(token)
            }
            Err(err) => {
                metrics.token_refreshes.with_label_values(&[OUTCOME_FAILURE]).inc();
                error!("client-credentials exchange failed: {}", err);
                Err(err)
            }
        }
    }

    async fn cached_token(&self) -> Option<String> {
        let now = now();
        self.credential
            .read()
            .await
            .as_ref()
            .filter(|credential| credential.is_valid_at(now))
            .map(|credential| credential.token.clone())
    }

    /// One POST to the token endpoint. Does not touch the cache.
    async fn exchange(&self) -> Result<Credential, AuthError> {
        let secrets = self.secrets.as_ref().ok_or(AuthError::MissingCredentials)?;
        info!("requesting upstream token with client id {}", secrets.client_id_hint());

        let response = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, secrets.basic_auth_header())
            .form(&GRANT_TYPE)
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("token endpoint answered {}: {}", status, body);
            return Err(AuthError::Rejected { status });
        }

        let body = response.text().await.map_err(AuthError::Transport)?;
        let grant: TokenGrant = serde_json::from_str(&body)
            .map_err(|err| AuthError::MalformedBody(err.to_string()))?;

        Credential::from_grant(grant.access_token, grant.expires_in, self.safety_margin_seconds, now())
            .ok_or_else(|| AuthError::MalformedBody(format!("expires_in {} out of range", grant.expires_in)))
    }
}
