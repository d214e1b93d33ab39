//! Step loop
//!
//! Single-pass greedy: each step asks the selector for the best pick under
//! the current state and commits it. A committed pick is never revisited.
//! Cost is bounded by `max_tracks × sources × window` score evaluations.

use crate::pool::{Candidate, Pool};
use crate::scoring::Scorer;
use crate::selector::{selector_for, Selector};
use crate::state::SequencerState;
use pmix_common::{MixOptions, ScoringWeights, SelectionWindows};
use tracing::{debug, info, trace};

/// Result of one sequencing run
#[derive(Debug, Clone, Default)]
pub struct MixOutcome {
    /// Picks in output order
    pub selected: Vec<Candidate>,
    /// Picks per source index
    pub source_counts: Vec<usize>,
    /// Candidates available when the run started
    pub candidate_count: usize,
}

impl MixOutcome {
    /// Dedup keys in output order; keyless picks are dropped
    pub fn uris(&self) -> Vec<String> {
        self.selected.iter().filter_map(|c| c.key.clone()).collect()
    }

    /// Source index of each pick, in output order
    pub fn sources(&self) -> Vec<usize> {
        self.selected.iter().map(|c| c.source).collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Drives selection for one run
pub struct Sequencer {
    scorer: Scorer,
    selector: Box<dyn Selector>,
    max_tracks: usize,
}

impl Sequencer {
    pub fn new(
        options: &MixOptions,
        weights: ScoringWeights,
        windows: &SelectionWindows,
        num_sources: usize,
    ) -> Self {
        Self {
            scorer: Scorer::new(options, weights, num_sources),
            selector: selector_for(options.mode, windows),
            max_tracks: options.max_tracks,
        }
    }

    /// Advance one step: select and commit
    ///
    /// Returns the committed pick, or None when every pool is exhausted.
    pub fn step<'s>(
        &self,
        pools: &mut [Pool],
        step: usize,
        state: &'s mut SequencerState,
    ) -> Option<&'s Candidate> {
        let pick = self.selector.select(pools, step, state, &self.scorer)?;
        let committed = state.commit(pools, &pick)?;
        trace!(
            "step {}: {:?} from source {} (score {:.4})",
            step,
            committed.key,
            pick.source,
            pick.score
        );
        Some(committed)
    }

    /// Run steps `0..max_tracks`, stopping early if the pools run dry
    pub fn run(&self, mut pools: Vec<Pool>) -> MixOutcome {
        let candidate_count = pools.iter().map(Pool::len).sum();
        let mut state = SequencerState::new(pools.len());

        for step in 0..self.max_tracks {
            if self.step(&mut pools, step, &mut state).is_none() {
                debug!(
                    "All pools exhausted after {} of {} steps",
                    step, self.max_tracks
                );
                break;
            }
        }

        let source_counts = state.counts().to_vec();
        info!(
            "Sequenced {} of {} candidates ({} mode, cap {}), per source {:?}",
            state.len(),
            candidate_count,
            self.selector.name(),
            self.max_tracks,
            source_counts
        );

        MixOutcome {
            selected: state.into_selected(),
            source_counts,
            candidate_count,
        }
    }
}
