//! Transition cost
//!
//! Scores placing a candidate at a given step. Lower is better; every term
//! is non-negative, so the total is too.
//!
//! # Terms
//! - Transition distance to previous pick (weighted L1), or an initial bias
//!   toward the curve start when nothing has been picked yet
//! - Distance to the curve target at this step
//! - Same primary artist as previous pick (if enabled)
//! - Same source as previous pick
//! - Fairness: picks above the source's proportional share (flex only)
//! - Duration jump from previous pick (if enabled)

use crate::features::FeatureVector;
use crate::pool::Candidate;
use crate::state::SequencerState;
use pmix_common::{CurveProfile, MixMode, MixOptions, ScoringWeights};

/// Scoring function for one run
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    curve: CurveProfile,
    mode: MixMode,
    avoid_same_artist: bool,
    prefer_similar_duration: bool,
    max_tracks: usize,
    num_sources: usize,
}

impl Scorer {
    pub fn new(options: &MixOptions, weights: ScoringWeights, num_sources: usize) -> Self {
        Self {
            weights,
            curve: options.curve,
            mode: options.mode,
            avoid_same_artist: options.avoid_same_artist,
            prefer_similar_duration: options.prefer_similar_duration,
            max_tracks: options.max_tracks,
            num_sources,
        }
    }

    /// Curve position for a step
    ///
    /// Progresses over the requested output length, not over the number
    /// of candidates actually available.
    pub fn position(&self, step: usize) -> f64 {
        if self.max_tracks <= 1 {
            0.0
        } else {
            step as f64 / (self.max_tracks - 1) as f64
        }
    }

    /// Weighted L1 distance between two vectors
    pub fn transition_distance(&self, a: &FeatureVector, b: &FeatureVector) -> f64 {
        let w = &self.weights.transition;
        w.energy * (a.energy - b.energy).abs()
            + w.valence * (a.valence - b.valence).abs()
            + w.tempo * (a.tempo - b.tempo).abs()
            + w.loudness * (a.loudness - b.loudness).abs()
            + w.duration * (a.duration - b.duration).abs()
            + w.danceability * (a.danceability - b.danceability).abs()
    }

    /// Distance from the curve target at position `t`
    pub fn curve_penalty(&self, vector: &FeatureVector, t: f64) -> f64 {
        let target = self.curve.target_at(t);
        self.weights.target_energy * (vector.energy - target.energy).abs()
            + self.weights.target_valence * (vector.valence - target.valence).abs()
    }

    /// Total cost of placing `candidate` at `step`
    pub fn score(&self, candidate: &Candidate, step: usize, state: &SequencerState) -> f64 {
        let t = self.position(step);
        let previous = state.last();

        let mut score = match previous {
            Some(prev) => self.transition_distance(&prev.vector, &candidate.vector),
            None => self.weights.initial_bias * self.curve_penalty(&candidate.vector, 0.0),
        };

        score += self.curve_penalty(&candidate.vector, t);

        if let Some(prev) = previous {
            score += self.artist_penalty(prev, candidate);
            score += self.source_penalty(prev, candidate);
            score += self.duration_penalty(prev, candidate);
        }
        score += self.fairness_penalty(candidate.source, step, state);

        score
    }

    fn artist_penalty(&self, prev: &Candidate, candidate: &Candidate) -> f64 {
        // Unknown artists never match
        if self.avoid_same_artist
            && !prev.artist_id.is_empty()
            && prev.artist_id == candidate.artist_id
        {
            self.weights.artist_repeat
        } else {
            0.0
        }
    }

    fn source_penalty(&self, prev: &Candidate, candidate: &Candidate) -> f64 {
        if prev.source == candidate.source {
            self.weights.source_repeat
        } else {
            0.0
        }
    }

    fn duration_penalty(&self, prev: &Candidate, candidate: &Candidate) -> f64 {
        if self.prefer_similar_duration {
            self.weights.duration_jump * (prev.vector.duration - candidate.vector.duration).abs()
        } else {
            0.0
        }
    }

    fn fairness_penalty(&self, source: usize, step: usize, state: &SequencerState) -> f64 {
        if self.mode != MixMode::Flex || self.num_sources == 0 {
            return 0.0;
        }
        let expected = (step + 1) as f64 / self.num_sources as f64;
        let over = (state.count(source) as f64 - expected).max(0.0);
        self.weights.fairness * over
    }
}
