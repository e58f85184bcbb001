use std::sync::Arc;

use anyhow::Result;
use catalog_relay::cache::credential_manager::CredentialManager;
use catalog_relay::config::credentials::resolve_client_secrets;
use catalog_relay::observability::metrics::get_metrics;
use catalog_relay::relay::client::build_http_client;
use catalog_relay::relay::relay::Relay;
use catalog_relay::server;
use catalog_relay::server::server::AppState;
use catalog_relay::utils::config_loader;
use catalog_relay::utils::logging;
use catalog_relay::utils::logging::LogLevel;
use clap::Parser;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "catalog-relay.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Start even when client credentials are missing (catalog routes then fail)
    #[arg(long, env = "ALLOW_MISSING_CREDENTIALS")]
    allow_missing_credentials: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    //
    // read .env, then args
    // -------------------------------

    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config
    // -------------------------------

    let mut service_config = config_loader::run(&args.config).await?;
    if args.allow_missing_credentials {
        service_config.settings.startup.require_credentials = false;
    }
    logging::run(&service_config, args.log_level);
    if let Ok(path) = dotenv {
        debug!("loaded environment from {}", path.display());
    }

    // -------------------------------
    // 3. Resolve client credentials
    // -------------------------------

    let secrets = resolve_client_secrets(&service_config)?;

    // -------------------------------
    // 4. Create request client, credential manager and relay
    // -------------------------------

    let upstream = &service_config.upstream;
    let client = build_http_client(upstream)?;
    let credentials = Arc::new(CredentialManager::new(
        client.clone(),
        upstream.token_url.clone(),
        secrets,
        upstream.safety_margin_seconds,
    ));
    let relay = Relay::new(client, upstream.api_base.clone(), credentials);

    // -------------------------------
    // 5. Start http server
    // -------------------------------

    let metrics = get_metrics().await;
    let state = AppState::new(metrics, relay);
    info!("Service starting...");
    server::server::start(&service_config, state).await
}
