use std::{fs, path::Path};
use crate::config::proc_validator;
use crate::config::settings::{LoggingConfig, ServiceConfig};
use crate::observability::metrics::get_metrics;
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, error};

/// Used when no config file exists on disk.
pub const DEFAULT_CONFIG: &str = r#"
settings:
  server:
    host: ${HOST:0.0.0.0}
    port: ${PORT:5050}
  metrics:
    is_enabled: ${METRICS_ENABLED:false}
    path: /metrics
  startup:
    require_credentials: ${REQUIRE_CREDENTIALS:true}
  logging:
    level: info
    format: ${LOG_FORMAT:compact}
upstream:
  api_base: ${SPOTIFY_API_BASE:https://api.spotify.com/v1}
  token_url: ${SPOTIFY_TOKEN_URL:https://accounts.spotify.com/api/token}
  timeout_ms: 10000
  safety_margin_seconds: 60
credentials:
  client_id: "${SPOTIFY_CLIENT_ID}"
  client_secret: "${SPOTIFY_CLIENT_SECRET}"
"#;

/// Load config from a YAML file, falling back to [`DEFAULT_CONFIG`] when the file is absent.
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = if path.exists() {
        debug!("loading config from {}", path.display());
        fs::read_to_string(path)?
    } else {
        debug!("config {} not found, using built-in defaults", path.display());
        DEFAULT_CONFIG.to_owned()
    };

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_parse_failures.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }
    service_config.upstream.api_base = service_config.upstream.api_base.trim_end_matches('/').to_owned();

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config).await?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with values from the process environment.
pub fn expand_env_vars(input: &str) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("placeholder regex is valid")
    });
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    })
    .to_string()
}
