//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

// Values shipped in sample .env files; treated the same as unset.
pub const PLACEHOLDER_CLIENT_ID: &str = "your_client_id_here";
pub const PLACEHOLDER_CLIENT_SECRET: &str = "your_client_secret_here";

pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";

pub const SEARCH_LIMIT_DEFAULT: u32 = 10;
pub const SEARCH_LIMIT_MIN: u32 = 1;
pub const SEARCH_LIMIT_MAX: u32 = 50;

pub const EXAMPLE_TRACK_ID: &str = "4iV5W9uYEdYUVa79Axb7Rh";
