use std::sync::Arc;

use http::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::credential_manager::CredentialManager;
use crate::errors::{RelayError, UpstreamCause};
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, OUTCOME_SUCCESS};

/// Authenticated GETs against the upstream catalog API.
#[derive(Debug, Clone)]
pub struct Relay {
    client: Client,
    api_base: String,
    credentials: Arc<CredentialManager>,
}

impl Relay {
    pub fn new(client: Client, api_base: impl Into<String>, credentials: Arc<CredentialManager>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_owned();
        Self { client, api_base, credentials }
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    pub fn url_for(&self, resource_path: &str) -> String {
        format!("{}/{}", self.api_base, resource_path.trim_start_matches('/'))
    }

    /// Fetch `{api_base}/{resource_path}` and return the JSON body untouched.
    ///
    /// No network call is made when no token can be obtained.
    pub async fn fetch(&self, resource_path: &str) -> Result<Value, RelayError> {
        let metrics = get_metrics().await;
        let resource = resource_label(resource_path);
        let start = get_instant();

        let result = self.fetch_authenticated(resource_path).await;

        metrics
            .relay_duration
            .with_label_values(&[resource])
            .observe(start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => OUTCOME_SUCCESS,
            Err(err) => {
                warn!("relay {} failed: {}", resource_path, error_chain(err));
                err.kind()
            }
        };
        metrics.relay_requests.with_label_values(&[resource, outcome]).inc();
        result
    }

    async fn fetch_authenticated(&self, resource_path: &str) -> Result<Value, RelayError> {
        let token = self
            .credentials
            .get_token()
            .await
            .map_err(RelayError::Unauthenticated)?;

        let url = self.url_for(resource_path);
        debug!("relay GET {}", url);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|err| RelayError::UpstreamFailure(UpstreamCause::Transport(err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamFailure(UpstreamCause::Status(status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| RelayError::UpstreamFailure(UpstreamCause::Transport(err)))?;
        serde_json::from_slice(&body).map_err(|err| RelayError::MalformedResponse(err.to_string()))
    }
}

/// First path segment, e.g. `tracks` for `tracks/{id}` and `search` for `search?q=..`.
fn resource_label(resource_path: &str) -> &str {
    resource_path
        .trim_start_matches('/')
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
