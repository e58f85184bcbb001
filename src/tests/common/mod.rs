// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::Arc;

use httpmock::prelude::*;
use httpmock::Mock;
use reqwest::Client;

use crate::cache::credential::{ClientSecrets, Credential};
use crate::cache::credential_manager::CredentialManager;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::relay::relay::Relay;
use crate::server::server::{router, AppState};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const TOKEN_PATH: &str = "/api/token";
pub const API_PREFIX: &str = "/v1";
pub const TRACK_ID: &str = "4iV5W9uYEdYUVa79Axb7Rh";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn secrets() -> ClientSecrets {
    ClientSecrets::new(CLIENT_ID, CLIENT_SECRET)
}

pub fn credential_manager(server: &MockServer, secrets: Option<ClientSecrets>) -> CredentialManager {
    CredentialManager::new(build_reqwest_client(), server.url(TOKEN_PATH), secrets, 60)
}

/// Credential valid for another ten minutes.
pub fn fresh_credential(token: &str) -> Credential {
    Credential::new(token.to_owned(), chrono::Utc::now() + chrono::TimeDelta::minutes(10))
}

pub fn relay(server: &MockServer, credentials: CredentialManager) -> Relay {
    Relay::new(build_reqwest_client(), server.url(API_PREFIX), Arc::new(credentials))
}

/// Router wired to `server` for both the token endpoint and the API.
pub async fn app(server: &MockServer) -> Router {
    app_with(server, credential_manager(server, Some(secrets())), &SettingsConfig::default()).await
}

pub async fn app_with(server: &MockServer, credentials: CredentialManager, settings: &SettingsConfig) -> Router {
    let state = AppState::new(get_metrics().await, relay(server, credentials));
    router(state, settings)
}

pub async fn token_mock<'a>(server: &'a MockServer, token: &str, expires_in: u64) -> Mock<'a> {
    let body = json!({"access_token": token, "token_type": "Bearer", "expires_in": expires_in});
    server
        .mock_async(|when, then| {
            when.method(POST).path(TOKEN_PATH);
            then.status(200).header("content-type", "application/json").json_body(body.clone());
        })
        .await
}

pub fn upstream_track(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "New Noise",
        "artists": [{"id": "a1", "name": "Refused"}],
        "album": {"id": "al1", "name": "The Shape of Punk to Come"},
        "duration_ms": 311000,
        "popularity": 61,
        "preview_url": "https://p.scdn.co/mp3-preview/abc",
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)},
        "explicit": false
    })
}
