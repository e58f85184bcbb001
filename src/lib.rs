//! # Catalog Relay Library
//!
//! Hides a music-catalog API's client-credentials flow and verbose schema
//! behind a handful of convenience endpoints.
//!
//! Modules:
//! - `config` — service configuration, env expansion and validation
//! - `cache` — the cached upstream credential and its manager
//! - `relay` — authenticated upstream fetches and identifier normalization
//! - `server` — axum router, route handlers and response shaping
//! - `observability` — prometheus metrics and their route

pub mod config;
pub mod cache;
pub mod relay;
pub mod errors;
pub mod observability;
pub mod server;
pub mod helpers;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::config::settings::ServiceConfig;
pub use crate::cache::credential_manager::CredentialManager;
pub use crate::relay::relay::Relay;
pub use crate::relay::identifier::normalize;
