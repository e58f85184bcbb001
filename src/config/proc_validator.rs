use tracing::error;

use crate::config::settings::ServiceConfig;
use crate::errors::ConfigError;
use crate::observability::metrics::get_metrics;

const RESERVED_PATHS: [&str; 7] = ["/", "/health", "/track", "/features", "/analysis", "/complete", "/search"];

pub async fn validate_service_config(config: &ServiceConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_url("upstream.api_base", &config.upstream.api_base, &mut errors);
    validate_url("upstream.token_url", &config.upstream.token_url, &mut errors);

    if config.upstream.timeout_ms == 0 {
        errors.push("upstream.timeout_ms must be greater than 0".to_owned());
    }
    if config.settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_owned());
    }
    if config.settings.metrics.is_enabled {
        let path = config.settings.metrics.path.as_str();
        if !path.starts_with('/') {
            errors.push(format!("settings.metrics.path '{}' must start with '/'", path));
        } else if RESERVED_PATHS.iter().any(|reserved| path == *reserved || path.starts_with(&format!("{}/", reserved))) {
            errors.push(format!("settings.metrics.path '{}' collides with a catalog route", path));
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    let metrics = get_metrics().await;
    for err in &errors {
        error!("config validation: {}", err);
        metrics.config_validation_errors.inc();
    }
    Err(ConfigError::Invalid(errors.join("; ")))
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<String>) {
    let has_scheme = value.starts_with("http://") || value.starts_with("https://");
    let has_host = value
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty())
        .unwrap_or(false);
    if !has_scheme || !has_host {
        errors.push(format!("{} '{}' must be an absolute http(s) URL", field, value));
    }
}
