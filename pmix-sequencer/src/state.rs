//! Per-run selection state

use crate::pool::{Candidate, Pool};
use crate::selector::Pick;
use std::collections::HashSet;

/// Everything a sequencing run has decided so far
///
/// Created fresh for each run and consumed when the run finishes.
#[derive(Debug, Clone, Default)]
pub struct SequencerState {
    /// Picks in output order (append-only)
    selected: Vec<Candidate>,
    /// Dedup keys already placed in the output
    used: HashSet<String>,
    /// Picks per source index
    counts: Vec<usize>,
}

impl SequencerState {
    pub fn new(num_sources: usize) -> Self {
        Self {
            selected: Vec::new(),
            used: HashSet::new(),
            counts: vec![0; num_sources],
        }
    }

    /// Most recent pick
    pub fn last(&self) -> Option<&Candidate> {
        self.selected.last()
    }

    pub fn selected(&self) -> &[Candidate] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Picks so far from `source`
    pub fn count(&self, source: usize) -> usize {
        self.counts.get(source).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// True when the candidate's key is already in the output
    ///
    /// Keyless candidates are never considered used.
    pub fn is_used(&self, candidate: &Candidate) -> bool {
        candidate
            .key
            .as_ref()
            .is_some_and(|key| self.used.contains(key))
    }

    /// Move the picked candidate from its pool into the output
    ///
    /// Returns None when the pick does not address a pool entry.
    pub fn commit(&mut self, pools: &mut [Pool], pick: &Pick) -> Option<&Candidate> {
        let candidate = pools.get_mut(pick.source)?.take(pick.index)?;

        if let Some(key) = &candidate.key {
            self.used.insert(key.clone());
        }
        if let Some(count) = self.counts.get_mut(candidate.source) {
            *count += 1;
        }
        self.selected.push(candidate);
        self.selected.last()
    }

    /// Consume the state, yielding picks in output order
    pub fn into_selected(self) -> Vec<Candidate> {
        self.selected
    }
}
