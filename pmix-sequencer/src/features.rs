//! Feature vectorization
//!
//! Turns a track and its (possibly missing) audio-feature record into a
//! bounded vector where every component lies in [0.0, 1.0], so distances
//! between tracks are comparable across features.

use pmix_common::models::{AudioFeatures, Track};

/// Fallback for energy, valence, danceability and acousticness
pub const DEFAULT_UNIT_FEATURE: f64 = 0.5;
pub const DEFAULT_SPEECHINESS: f64 = 0.33;
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
pub const DEFAULT_LOUDNESS_DB: f64 = -12.0;
pub const DEFAULT_DURATION_MS: u64 = 180_000;

/// Tempo range mapped onto [0, 1] (bpm)
pub const TEMPO_RANGE: (f64, f64) = (60.0, 180.0);
/// Loudness range mapped onto [0, 1] (dB)
pub const LOUDNESS_RANGE: (f64, f64) = (-30.0, 0.0);
/// Duration range mapped onto [0, 1] (seconds, 2 to 7 minutes)
pub const DURATION_RANGE: (f64, f64) = (120.0, 420.0);

/// Normalized feature vector, all components in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub energy: f64,
    pub valence: f64,
    pub danceability: f64,
    pub tempo: f64,
    pub loudness: f64,
    pub duration: f64,
    pub acousticness: f64,
    pub speechiness: f64,
}

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Linearly map `x` from [lo, hi] onto [0, 1], clamping outside values
pub fn rescale(x: f64, (lo, hi): (f64, f64)) -> f64 {
    clamp01((x - lo) / (hi - lo))
}

/// Build the feature vector for a track
///
/// Never fails: absent track fields or a missing feature record fall back
/// to fixed defaults before rescaling.
pub fn vectorize(track: &Track, features: Option<&AudioFeatures>) -> FeatureVector {
    let raw = |get: fn(&AudioFeatures) -> Option<f64>, default: f64| {
        features.and_then(get).unwrap_or(default)
    };

    let duration_ms = track.duration_ms.unwrap_or(DEFAULT_DURATION_MS);

    FeatureVector {
        energy: clamp01(raw(|f| f.energy, DEFAULT_UNIT_FEATURE)),
        valence: clamp01(raw(|f| f.valence, DEFAULT_UNIT_FEATURE)),
        danceability: clamp01(raw(|f| f.danceability, DEFAULT_UNIT_FEATURE)),
        tempo: rescale(raw(|f| f.tempo, DEFAULT_TEMPO_BPM), TEMPO_RANGE),
        loudness: rescale(raw(|f| f.loudness, DEFAULT_LOUDNESS_DB), LOUDNESS_RANGE),
        duration: rescale(duration_ms as f64 / 1000.0, DURATION_RANGE),
        acousticness: clamp01(raw(|f| f.acousticness, DEFAULT_UNIT_FEATURE)),
        speechiness: clamp01(raw(|f| f.speechiness, DEFAULT_SPEECHINESS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_defaults_without_features() {
        let v = vectorize(&Track::default(), None);
        assert_eq!(v.energy, 0.5);
        assert_eq!(v.valence, 0.5);
        assert_eq!(v.danceability, 0.5);
        assert_eq!(v.acousticness, 0.5);
        assert_eq!(v.speechiness, 0.33);
        // 120 bpm in [60, 180]
        assert!(approx(v.tempo, 0.5));
        // -12 dB in [-30, 0]
        assert!(approx(v.loudness, 0.6));
        // 180 s in [120, 420]
        assert!(approx(v.duration, 0.2));
    }

    #[test]
    fn test_copies_and_rescales_present_features() {
        let track = Track {
            duration_ms: Some(270_000),
            ..Default::default()
        };
        let features = AudioFeatures {
            energy: Some(0.9),
            valence: Some(0.1),
            danceability: Some(0.7),
            tempo: Some(150.0),
            loudness: Some(-6.0),
            acousticness: Some(0.05),
            speechiness: Some(0.04),
            ..Default::default()
        };

        let v = vectorize(&track, Some(&features));
        assert_eq!(v.energy, 0.9);
        assert_eq!(v.valence, 0.1);
        assert_eq!(v.danceability, 0.7);
        assert!(approx(v.tempo, 0.75));
        assert!(approx(v.loudness, 0.8));
        assert!(approx(v.duration, 0.5));
        assert_eq!(v.acousticness, 0.05);
        assert_eq!(v.speechiness, 0.04);
    }

    #[test]
    fn test_partial_record_mixes_defaults() {
        let features = AudioFeatures {
            energy: Some(0.2),
            ..Default::default()
        };
        let v = vectorize(&Track::default(), Some(&features));
        assert_eq!(v.energy, 0.2);
        assert_eq!(v.valence, 0.5);
        assert!(approx(v.tempo, 0.5));
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let track = Track {
            duration_ms: Some(30_000),
            ..Default::default()
        };
        let features = AudioFeatures {
            tempo: Some(220.0),
            loudness: Some(-45.0),
            ..Default::default()
        };
        let v = vectorize(&track, Some(&features));
        assert_eq!(v.tempo, 1.0);
        assert_eq!(v.loudness, 0.0);
        assert_eq!(v.duration, 0.0);

        let long = Track {
            duration_ms: Some(900_000),
            ..Default::default()
        };
        assert_eq!(vectorize(&long, None).duration, 1.0);
    }
}
