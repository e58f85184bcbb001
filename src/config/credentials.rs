use tracing::{info, warn};

use crate::cache::credential::ClientSecrets;
use crate::config::settings::ServiceConfig;
use crate::errors::ConfigError;
use crate::utils::constants::{
    ENV_CLIENT_ID, ENV_CLIENT_SECRET, PLACEHOLDER_CLIENT_ID, PLACEHOLDER_CLIENT_SECRET,
};

/// Resolve the client secrets according to the startup policy.
///
/// `Ok(None)` means credentials are missing and the policy allows a degraded start.
pub fn resolve_client_secrets(config: &ServiceConfig) -> Result<Option<ClientSecrets>, ConfigError> {
    let client_id = usable(config.credentials.client_id.as_deref(), PLACEHOLDER_CLIENT_ID);
    let client_secret = usable(config.credentials.client_secret.as_deref(), PLACEHOLDER_CLIENT_SECRET);

    if let (Some(client_id), Some(client_secret)) = (client_id, client_secret) {
        let secrets = ClientSecrets::new(client_id, client_secret);
        info!("client credentials configured, client id {}", secrets.client_id_hint());
        return Ok(Some(secrets));
    }

    let mut missing = Vec::new();
    if client_id.is_none() {
        missing.push(ENV_CLIENT_ID);
    }
    if client_secret.is_none() {
        missing.push(ENV_CLIENT_SECRET);
    }
    let fields = missing.join(", ");

    if config.settings.startup.require_credentials {
        return Err(ConfigError::MissingCredentials { fields });
    }

    warn!(
        "client credentials missing ({}); starting anyway, catalog routes will fail until they are set",
        fields
    );
    Ok(None)
}

fn usable<'a>(value: Option<&'a str>, placeholder: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != placeholder)
}
