use reqwest::Client;

use crate::config::settings::UpstreamConfig;
use crate::errors::ConfigError;
use crate::helpers::time::millis;

/// Shared outbound client; the timeout bounds both token exchanges and relay calls.
pub fn build_http_client(upstream: &UpstreamConfig) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(millis(upstream.timeout_ms))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ConfigError::HttpClient)
}
