use std::num::IntErrorKind;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::relay::identifier::normalize;
use crate::server::api_error::ApiError;
use crate::server::server::AppState;
use crate::server::shape::{self, CompleteTrack, SearchResults, TrackSummary};
use crate::utils::constants::{
    EXAMPLE_TRACK_ID, SEARCH_LIMIT_DEFAULT, SEARCH_LIMIT_MAX, SEARCH_LIMIT_MIN,
};

/// Static API documentation.
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Music Catalog Relay API",
        "endpoints": {
            "/track/<track_id_or_url>": "Get basic track info",
            "/features/<track_id_or_url>": "Get audio features for a track",
            "/analysis/<track_id_or_url>": "Get detailed audio analysis for a track",
            "/complete/<track_id_or_url>": "Get track info, features, and analysis combined",
            "/search?q=<query>&limit=<1-50>": "Search for tracks"
        },
        "example_track_id": EXAMPLE_TRACK_ID,
        "example_usage": format!("/features/{}", EXAMPLE_TRACK_ID)
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> ApiError {
    ApiError::endpoint_not_found()
}

pub async fn track(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<TrackSummary>, ApiError> {
    const CONTEXT: &str = "Failed to fetch track data";
    let path = resource_path("tracks", &normalize(&identifier))?;
    let data = state
        .relay
        .fetch(&path)
        .await
        .map_err(|e| ApiError::from_relay(e, CONTEXT))?;
    shape::track_summary(data)
        .map(Json)
        .map_err(|e| ApiError::from_relay(e, CONTEXT))
}

pub async fn features(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let path = resource_path("audio-features", &normalize(&identifier))?;
    state
        .relay
        .fetch(&path)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_relay(e, "Failed to fetch audio features"))
}

pub async fn analysis(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let path = resource_path("audio-analysis", &normalize(&identifier))?;
    state
        .relay
        .fetch(&path)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_relay(e, "Failed to fetch audio analysis"))
}

/// Track, features and analysis fetched concurrently; the first failure
/// drops the other in-flight calls and fails the whole request with 500,
/// including when one part is missing upstream.
pub async fn complete(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<CompleteTrack>, ApiError> {
    const CONTEXT: &str = "Failed to fetch complete track data";
    let id = normalize(&identifier);
    let track_path = resource_path("tracks", &id)?;
    let features_path = resource_path("audio-features", &id)?;
    let analysis_path = resource_path("audio-analysis", &id)?;

    let (track, features, analysis) = tokio::try_join!(
        state.relay.fetch(&track_path),
        state.relay.fetch(&features_path),
        state.relay.fetch(&analysis_path),
    )
    .map_err(|e| ApiError::internal(e, CONTEXT))?;

    shape::complete_track(track, features, analysis)
        .map(Json)
        .map_err(|e| ApiError::internal(e, CONTEXT))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let query = search_query(params.q.as_deref())?;
    let limit = parse_limit(params.limit.as_deref())?;
    info!("search q={:?} limit={}", query, limit);

    let resource_path = search_path(query, limit);
    let data = state
        .relay
        .fetch(&resource_path)
        .await
        .map_err(|e| ApiError::from_relay(e, "Failed to search tracks"))?;
    shape::search_results(data)
        .map(Json)
        .map_err(|e| ApiError::from_relay(e, "Failed to search tracks"))
}

/// The identifier is escaped as one path segment so it can never reach
/// another upstream endpoint or add query parameters.
pub fn resource_path(resource: &str, id: &str) -> Result<String, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::bad_request("Invalid track identifier"));
    }
    Ok(format!("{}/{}", resource, urlencoding::encode(id)))
}

/// Blank queries are rejected; anything else is forwarded as sent.
pub fn search_query(raw: Option<&str>) -> Result<&str, ApiError> {
    raw.filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'q' is required"))
}

/// Absent or empty → default; otherwise clamped to the allowed range.
pub fn parse_limit(raw: Option<&str>) -> Result<u32, ApiError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(SEARCH_LIMIT_DEFAULT),
        Some(raw) => raw,
    };
    let limit = match raw.parse::<i64>() {
        Ok(limit) => limit,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => SEARCH_LIMIT_MAX as i64,
            IntErrorKind::NegOverflow => SEARCH_LIMIT_MIN as i64,
            _ => return Err(ApiError::bad_request("Query parameter 'limit' must be an integer")),
        },
    };
    let clamped = limit.clamp(SEARCH_LIMIT_MIN as i64, SEARCH_LIMIT_MAX as i64);
    Ok(clamped as u32)
}

pub fn search_path(query: &str, limit: u32) -> String {
    format!("search?q={}&type=track&limit={}", urlencoding::encode(query), limit)
}
