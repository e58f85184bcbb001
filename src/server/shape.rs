//! Upstream payloads and the simplified shapes served to callers.
//!
//! The `*Dto` types mirror only the upstream fields that are read;
//! everything else in the upstream JSON is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::RelayError;

/// Analysis arrays replaced by their lengths in the combined payload.
pub const ANALYSIS_COUNTED_FIELDS: [&str; 5] = ["bars", "beats", "sections", "segments", "tatums"];

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistDto {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumDto {
    pub name: String,
}

/// `GET tracks/{id}` and search items.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistDto>,
    pub album: AlbumDto,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDto {
    pub tracks: TrackPageDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPageDto {
    #[serde(default)]
    pub items: Vec<Option<TrackDto>>,
    #[serde(default)]
    pub total: u64,
}

/// Body of `/track/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
    pub popularity: u32,
    pub preview_url: Option<String>,
    pub external_urls: Value,
}

impl From<TrackDto> for TrackSummary {
    fn from(dto: TrackDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            artists: dto.artists.into_iter().map(|a| a.name).collect(),
            album: dto.album.name,
            duration_ms: dto.duration_ms,
            popularity: dto.popularity,
            preview_url: dto.preview_url,
            external_urls: dto.external_urls,
        }
    }
}

/// One entry of `/search`; no duration.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchItem {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub popularity: u32,
    pub preview_url: Option<String>,
    pub external_urls: Value,
}

impl From<TrackDto> for SearchItem {
    fn from(dto: TrackDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            artists: dto.artists.into_iter().map(|a| a.name).collect(),
            album: dto.album.name,
            popularity: dto.popularity,
            preview_url: dto.preview_url,
            external_urls: dto.external_urls,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResults {
    pub tracks: Vec<SearchItem>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompleteTrack {
    pub track_info: TrackSummary,
    pub audio_features: Value,
    pub audio_analysis: Value,
}

pub fn track_summary(value: Value) -> Result<TrackSummary, RelayError> {
    decode::<TrackDto>(value).map(TrackSummary::from)
}

pub fn search_results(value: Value) -> Result<SearchResults, RelayError> {
    let search = decode::<SearchDto>(value)?;
    Ok(SearchResults {
        // the catalog occasionally returns null entries in item lists
        tracks: search.tracks.items.into_iter().flatten().map(SearchItem::from).collect(),
        total: search.tracks.total,
    })
}

/// Keep `meta` and `track`, replace the bulky arrays with their lengths.
pub fn analysis_summary(analysis: &Value) -> Value {
    let mut summary = Map::new();
    for key in ["meta", "track"] {
        let section = analysis
            .get(key)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        summary.insert(key.to_owned(), section);
    }
    for key in ANALYSIS_COUNTED_FIELDS {
        let count = analysis.get(key).and_then(Value::as_array).map_or(0, Vec::len);
        summary.insert(key.to_owned(), Value::from(count));
    }
    Value::Object(summary)
}

pub fn complete_track(track: Value, features: Value, analysis: Value) -> Result<CompleteTrack, RelayError> {
    Ok(CompleteTrack {
        track_info: track_summary(track)?,
        audio_features: features,
        audio_analysis: analysis_summary(&analysis),
    })
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, RelayError> {
    serde_json::from_value(value).map_err(|err| RelayError::MalformedResponse(err.to_string()))
}
