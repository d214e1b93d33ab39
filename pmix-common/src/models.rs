//! Upstream data model
//!
//! Shapes follow the music service's JSON so records handed over by the
//! fetching layer deserialize directly. Every field is optional because
//! upstream data may be incomplete; consumers substitute defaults.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Prefix of the identity URI used as dedup key
pub const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Artist credit on a track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Track metadata as returned by the playlist-items endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Credited artists, primary artist first
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl Track {
    /// Identity URI (`spotify:track:<id>`), None when the track has no id
    pub fn uri(&self) -> Option<String> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}{}", TRACK_URI_PREFIX, id))
    }

    /// Primary artist id, empty string when unknown
    pub fn primary_artist_id(&self) -> &str {
        self.artists
            .first()
            .and_then(|a| a.id.as_deref())
            .unwrap_or("")
    }
}

/// Raw audio-feature record for one track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    /// Beats per minute
    #[serde(default)]
    pub tempo: Option<f64>,
    /// Integrated loudness in dB (typically -60..0)
    #[serde(default)]
    pub loudness: Option<f64>,
    #[serde(default)]
    pub acousticness: Option<f64>,
    #[serde(default)]
    pub speechiness: Option<f64>,
}

/// One source playlist, tracks in fetch order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceList {
    /// Upstream playlist id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Fully materialized input for one mix run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixInput {
    pub sources: Vec<SourceList>,
    #[serde(default)]
    pub audio_features: Vec<AudioFeatures>,
}

impl MixInput {
    /// Load input from a JSON file written by the fetching layer
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Build the audio-feature lookup for this input
    pub fn feature_index(&self) -> FeatureIndex {
        FeatureIndex::from_records(self.audio_features.iter().cloned())
    }
}

/// Audio features keyed by track id
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    by_id: HashMap<String, AudioFeatures>,
}

impl FeatureIndex {
    /// Build index from raw records
    ///
    /// Records without an id are skipped; a later record for an id replaces
    /// an earlier one.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = AudioFeatures>,
    {
        let mut by_id = HashMap::new();
        for record in records {
            if let Some(id) = record.id.clone().filter(|id| !id.is_empty()) {
                by_id.insert(id, record);
            }
        }
        Self { by_id }
    }

    /// Look up features for a track
    pub fn get(&self, track: &Track) -> Option<&AudioFeatures> {
        track.id.as_deref().and_then(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
