#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use crate::config::credentials::resolve_client_secrets;
    use crate::config::settings::LogFormat;
    use crate::errors::ConfigError;
    use crate::utils::config_loader;
    use crate::utils::constants::{DEFAULT_API_BASE, DEFAULT_PORT, DEFAULT_TOKEN_URL};

    fn clear_env() {
        for var in [
            "SPOTIFY_CLIENT_ID",
            "SPOTIFY_CLIENT_SECRET",
            "SPOTIFY_API_BASE",
            "SPOTIFY_TOKEN_URL",
            "HOST",
            "PORT",
            "METRICS_ENABLED",
            "REQUIRE_CREDENTIALS",
            "LOG_FORMAT",
        ] {
            std::env::remove_var(var);
        }
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[tokio::test]
    #[serial]
    async fn missing_file_falls_back_to_builtin_defaults() {
        clear_env();
        std::env::set_var("SPOTIFY_CLIENT_ID", "abc123");
        std::env::set_var("SPOTIFY_CLIENT_SECRET", "s3cret");

        let config = config_loader::run("/nonexistent/catalog-relay.yaml").await.unwrap();

        assert_eq!(config.settings.server.port, DEFAULT_PORT);
        assert_eq!(config.upstream.api_base, DEFAULT_API_BASE);
        assert_eq!(config.upstream.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.upstream.timeout_ms, 10_000);
        assert_eq!(config.upstream.safety_margin_seconds, 60);
        assert!(config.settings.startup.require_credentials);
        assert!(!config.settings.metrics.is_enabled);
        assert_eq!(config.settings.logging.as_ref().unwrap().format, LogFormat::Compact);

        let secrets = resolve_client_secrets(&config).unwrap().unwrap();
        assert_eq!(secrets.client_id, "abc123");
        assert_eq!(secrets.client_secret, "s3cret");
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn unset_secrets_fail_startup_by_default() {
        clear_env();
        let config = config_loader::run("/nonexistent/catalog-relay.yaml").await.unwrap();

        let err = resolve_client_secrets(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
    }

    #[tokio::test]
    #[serial]
    async fn degraded_start_can_be_enabled_from_environment() {
        clear_env();
        std::env::set_var("REQUIRE_CREDENTIALS", "false");

        let config = config_loader::run("/nonexistent/catalog-relay.yaml").await.unwrap();

        assert!(!config.settings.startup.require_credentials);
        assert!(resolve_client_secrets(&config).unwrap().is_none());
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn yaml_file_with_env_placeholders() {
        clear_env();
        std::env::set_var("CATALOG_RELAY_TEST_PORT", "8088");
        let file = write_config(
            r#"
settings:
  server:
    host: 127.0.0.1
    port: ${CATALOG_RELAY_TEST_PORT:5050}
  metrics:
    is_enabled: true
  logging:
    level: debug
    format: json
upstream:
  api_base: http://localhost:9000/v1/
  token_url: http://localhost:9000/api/token
  timeout_ms: 2500
credentials:
  client_id: "id-from-file"
  client_secret: "${CATALOG_RELAY_TEST_SECRET:fallback-secret}"
"#,
        );

        let config = config_loader::run(file.path().to_str().unwrap()).await.unwrap();

        assert_eq!(config.settings.server.host, "127.0.0.1");
        assert_eq!(config.settings.server.port, 8088);
        assert!(config.settings.metrics.is_enabled);
        assert_eq!(config.settings.metrics.path, "/metrics");
        assert_eq!(config.settings.logging.as_ref().unwrap().format, LogFormat::Json);
        // trailing slash trimmed
        assert_eq!(config.upstream.api_base, "http://localhost:9000/v1");
        assert_eq!(config.upstream.timeout_ms, 2500);
        assert_eq!(config.upstream.safety_margin_seconds, 60);
        assert_eq!(config.credentials.client_secret.as_deref(), Some("fallback-secret"));

        std::env::remove_var("CATALOG_RELAY_TEST_PORT");
    }

    #[tokio::test]
    #[serial]
    async fn invalid_values_are_rejected() {
        clear_env();
        let file = write_config(
            r#"
upstream:
  api_base: ftp://catalog.example.com
  timeout_ms: 0
"#,
        );

        let err = config_loader::run(file.path().to_str().unwrap()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("upstream.api_base"), "{message}");
        assert!(message.contains("timeout_ms"), "{message}");
    }

    #[tokio::test]
    #[serial]
    async fn malformed_yaml_is_an_error() {
        clear_env();
        let file = write_config("settings: [unterminated");
        assert!(config_loader::run(file.path().to_str().unwrap()).await.is_err());
    }
}
