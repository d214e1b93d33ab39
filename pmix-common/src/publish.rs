//! Publish contract
//!
//! What the publishing layer needs to create the output playlist and fill
//! it, plus the batch limits the music service imposes on bulk requests.

use crate::{CurveProfile, MixMode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Max URIs per "add tracks" request
pub const UPLOAD_BATCH_SIZE: usize = 100;

/// Max ids per audio-features request
pub const FEATURE_BATCH_SIZE: usize = 100;

/// Playlist name used when the caller gives none
pub const DEFAULT_PLAYLIST_NAME: &str = "Roadtrip mix ✨";

/// Playlist to be created by the publisher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub mode: MixMode,
    pub curve: CurveProfile,
    /// Track URIs in playback order
    pub uris: Vec<String>,
}

impl PlaylistDraft {
    /// Build a private playlist draft for a finished mix
    ///
    /// Blank names fall back to [`DEFAULT_PLAYLIST_NAME`].
    pub fn new(name: Option<&str>, mode: MixMode, curve: CurveProfile, uris: Vec<String>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PLAYLIST_NAME)
            .to_string();
        let description = format!(
            "SpotifyMixer ({}, {}) • {} tracks",
            mode.as_str(),
            curve.as_str(),
            uris.len()
        );

        Self {
            name,
            description,
            public: false,
            mode,
            curve,
            uris,
        }
    }

    /// URIs split into upload requests, order preserved
    pub fn upload_batches(&self) -> impl Iterator<Item = &[String]> {
        self.uris.chunks(UPLOAD_BATCH_SIZE)
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

/// Split track ids into audio-feature requests
///
/// Duplicate ids are requested once; first-seen order is preserved.
pub fn feature_request_batches<'a, I>(ids: I) -> Vec<Vec<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let unique: Vec<&str> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
    unique
        .chunks(FEATURE_BATCH_SIZE)
        .map(|chunk| chunk.to_vec())
        .collect()
}
