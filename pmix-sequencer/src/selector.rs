//! Selection policies
//!
//! A selector looks at the pools and proposes the next pick; it never
//! mutates anything. The sequencer commits the pick into its state.
//!
//! Only a bounded window at the front of each pool is scored, keeping the
//! per-step cost constant regardless of pool size. Since pools are shuffled
//! at construction, the window is a random sample of what remains.

use crate::pool::Pool;
use crate::scoring::Scorer;
use crate::state::SequencerState;
use pmix_common::{MixMode, SelectionWindows};

/// Proposed pick: pool entry `index` of pool `source`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub source: usize,
    pub index: usize,
    pub score: f64,
}

/// Policy choosing the next candidate
pub trait Selector {
    /// Propose the best pick for `step`, or None when every pool is exhausted
    fn select(
        &self,
        pools: &[Pool],
        step: usize,
        state: &SequencerState,
        scorer: &Scorer,
    ) -> Option<Pick>;

    fn name(&self) -> &'static str;
}

/// Round-robin: the step decides the source, the scorer decides the track
#[derive(Debug, Clone, Copy)]
pub struct StrictSelector {
    pub window: usize,
}

impl Selector for StrictSelector {
    fn select(
        &self,
        pools: &[Pool],
        step: usize,
        state: &SequencerState,
        scorer: &Scorer,
    ) -> Option<Pick> {
        let n = pools.len();
        if n == 0 {
            return None;
        }
        let preferred = step % n;

        // Preferred source first, then the rest in round-robin order
        (0..n)
            .map(|offset| (preferred + offset) % n)
            .find_map(|source| best_in_pool(pools, source, self.window, step, state, scorer))
    }

    fn name(&self) -> &'static str {
        "strict"
    }
}

/// Global greedy: best candidate across the windows of all pools
#[derive(Debug, Clone, Copy)]
pub struct FlexSelector {
    pub window: usize,
}

impl Selector for FlexSelector {
    fn select(
        &self,
        pools: &[Pool],
        step: usize,
        state: &SequencerState,
        scorer: &Scorer,
    ) -> Option<Pick> {
        (0..pools.len())
            .filter_map(|source| best_in_pool(pools, source, self.window, step, state, scorer))
            .fold(None, |best: Option<Pick>, pick| match best {
                // Strictly lower only: earlier sources win ties
                Some(b) if pick.score >= b.score => Some(b),
                _ => Some(pick),
            })
    }

    fn name(&self) -> &'static str {
        "flex"
    }
}

/// Selector for a mix mode
pub fn selector_for(mode: MixMode, windows: &SelectionWindows) -> Box<dyn Selector> {
    match mode {
        MixMode::Strict => Box::new(StrictSelector {
            window: windows.strict,
        }),
        MixMode::Flex => Box::new(FlexSelector {
            window: windows.flex,
        }),
    }
}

/// Lowest-scoring candidate among the first `window` unused entries of a pool
///
/// Ties go to the entry nearest the front.
fn best_in_pool(
    pools: &[Pool],
    source: usize,
    window: usize,
    step: usize,
    state: &SequencerState,
    scorer: &Scorer,
) -> Option<Pick> {
    let pool = pools.get(source)?;
    let mut best: Option<Pick> = None;

    for (index, candidate) in pool
        .iter()
        .enumerate()
        .filter(|(_, c)| !state.is_used(c))
        .take(window)
    {
        let score = scorer.score(candidate, step, state);
        if best.map_or(true, |b| score < b.score) {
            best = Some(Pick {
                source,
                index,
                score,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Candidate;
    use pmix_common::models::{Artist, AudioFeatures, Track};
    use pmix_common::{MixOptions, ScoringWeights};

    fn candidate(id: &str, source: usize, energy: f64) -> Candidate {
        let track = Track {
            id: Some(id.to_string()),
            name: None,
            artists: vec![Artist {
                id: Some(format!("artist-{}", id)),
                name: None,
            }],
            duration_ms: Some(180_000),
        };
        let features = AudioFeatures {
            energy: Some(energy),
            valence: Some(0.6),
            ..Default::default()
        };
        Candidate::new(track, source, Some(&features))
    }

    fn scorer(mode: MixMode, num_sources: usize) -> Scorer {
        let options = MixOptions {
            mode,
            max_tracks: 10,
            ..Default::default()
        };
        Scorer::new(&options, ScoringWeights::default(), num_sources)
    }

    #[test]
    fn test_strict_uses_turn_source() {
        let pools = vec![
            Pool::new(vec![candidate("a", 0, 0.1)]),
            Pool::new(vec![candidate("b", 1, 0.6)]),
        ];
        let state = SequencerState::new(2);
        let selector = StrictSelector { window: 30 };

        // Step 0 must pick from source 0 even though source 1 fits the curve better
        let pick = selector.select(&pools, 0, &state, &scorer(MixMode::Strict, 2)).unwrap();
        assert_eq!((pick.source, pick.index), (0, 0));

        let pick = selector.select(&pools, 1, &state, &scorer(MixMode::Strict, 2)).unwrap();
        assert_eq!(pick.source, 1);
    }

    #[test]
    fn test_strict_picks_best_within_source() {
        let pools = vec![Pool::new(vec![
            candidate("far", 0, 0.1),
            candidate("near", 0, 0.6),
            candidate("also-near", 0, 0.6),
        ])];
        let state = SequencerState::new(1);
        let pick = StrictSelector { window: 30 }
            .select(&pools, 0, &state, &scorer(MixMode::Strict, 1))
            .unwrap();
        // Tie between "near" and "also-near" goes to the earlier entry
        assert_eq!(pick.index, 1);
    }

    #[test]
    fn test_strict_window_bounds_search() {
        let pools = vec![Pool::new(vec![
            candidate("far", 0, 0.1),
            candidate("farther", 0, 0.0),
            candidate("best", 0, 0.6),
        ])];
        let state = SequencerState::new(1);
        let pick = StrictSelector { window: 2 }
            .select(&pools, 0, &state, &scorer(MixMode::Strict, 1))
            .unwrap();
        assert_eq!(pick.index, 0);
    }

    #[test]
    fn test_strict_falls_through_exhausted_sources() {
        let pools = vec![
            Pool::default(),
            Pool::default(),
            Pool::new(vec![candidate("c", 2, 0.5)]),
        ];
        let state = SequencerState::new(3);
        let pick = StrictSelector { window: 30 }
            .select(&pools, 0, &state, &scorer(MixMode::Strict, 3))
            .unwrap();
        assert_eq!(pick.source, 2);

        // Next source in round-robin order is tried first, even when a later one fits better
        let pools = vec![
            Pool::default(),
            Pool::new(vec![candidate("b", 1, 0.1)]),
            Pool::new(vec![candidate("c", 2, 0.6)]),
        ];
        let s = scorer(MixMode::Strict, 3);
        let b = s.score(pools[1].get(0).unwrap(), 0, &state);
        let c = s.score(pools[2].get(0).unwrap(), 0, &state);
        assert!(c < b);
        let pick = StrictSelector { window: 30 }.select(&pools, 0, &state, &s).unwrap();
        assert_eq!((pick.source, pick.index), (1, 0));

        // Wraps around: at step 2 the order is 2, 0, 1
        let pools = vec![
            Pool::new(vec![candidate("a", 0, 0.1)]),
            Pool::new(vec![candidate("b", 1, 0.6)]),
            Pool::default(),
        ];
        let pick = StrictSelector { window: 30 }.select(&pools, 2, &state, &s).unwrap();
        assert_eq!(pick.source, 0);

        let empty = vec![Pool::default(), Pool::default()];
        assert!(StrictSelector { window: 30 }
            .select(&empty, 0, &SequencerState::new(2), &scorer(MixMode::Strict, 2))
            .is_none());
    }

    #[test]
    fn test_flex_picks_global_minimum() {
        let pools = vec![
            Pool::new(vec![candidate("a", 0, 0.1)]),
            Pool::new(vec![candidate("b", 1, 0.3), candidate("c", 1, 0.6)]),
        ];
        let state = SequencerState::new(2);
        let pick = FlexSelector { window: 20 }
            .select(&pools, 0, &state, &scorer(MixMode::Flex, 2))
            .unwrap();
        assert_eq!((pick.source, pick.index), (1, 1));
    }

    #[test]
    fn test_flex_ties_go_to_earlier_source() {
        let pools = vec![
            Pool::new(vec![candidate("a", 0, 0.6)]),
            Pool::new(vec![candidate("b", 1, 0.6)]),
        ];
        let state = SequencerState::new(2);
        let pick = FlexSelector { window: 20 }
            .select(&pools, 0, &state, &scorer(MixMode::Flex, 2))
            .unwrap();
        assert_eq!(pick.source, 0);

        assert!(FlexSelector { window: 20 }
            .select(&[], 0, &state, &scorer(MixMode::Flex, 2))
            .is_none());
    }

    #[test]
    fn test_used_keys_are_skipped() {
        // Same track in both pools (dedup disabled); once placed, its twin is skipped
        let mut pools = vec![
            Pool::new(vec![candidate("dup", 0, 0.6)]),
            Pool::new(vec![candidate("dup", 1, 0.6), candidate("other", 1, 0.2)]),
        ];
        let mut state = SequencerState::new(2);
        let s = scorer(MixMode::Strict, 2);
        let selector = StrictSelector { window: 30 };

        let first = selector.select(&pools, 0, &state, &s).unwrap();
        state.commit(&mut pools, &first);

        let second = selector.select(&pools, 1, &state, &s).unwrap();
        assert_eq!((second.source, second.index), (1, 1));
    }

    #[test]
    fn test_selector_for_mode() {
        let windows = SelectionWindows::default();
        assert_eq!(selector_for(MixMode::Strict, &windows).name(), "strict");
        assert_eq!(selector_for(MixMode::Flex, &windows).name(), "flex");
    }
}
