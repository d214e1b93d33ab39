//! pmix-sequencer - playlist sequencing engine
//!
//! Merges several source playlists into one ordered, deduplicated,
//! length-capped mix that follows an energy/valence curve, keeps
//! transitions smooth and balances the sources.
//!
//! **Pipeline:**
//! tracks + audio features → feature vectors → shuffled per-source pools →
//! selector (scored against the curve) → ordered track URIs
//!
//! The engine is synchronous and works on fully fetched, in-memory input.
//! The only nondeterminism is the initial pool shuffle, driven by the
//! caller's random source.

pub mod features;
pub mod pool;
pub mod scoring;
pub mod selector;
pub mod sequencer;
pub mod state;

pub use features::{vectorize, FeatureVector};
pub use pool::{build_pools, Candidate, Pool};
pub use scoring::Scorer;
pub use selector::{FlexSelector, Pick, Selector, StrictSelector};
pub use sequencer::{MixOutcome, Sequencer};
pub use state::SequencerState;

use pmix_common::models::MixInput;
use pmix_common::{Error, MixOptions, Result, ScoringWeights, SelectionWindows};
use rand::Rng;

/// Sequence one mix
///
/// Validates the request, builds and shuffles the pools with `rng`, then
/// runs the sequencer. Running out of candidates before `max_tracks` is
/// not an error; the outcome is just shorter.
///
/// # Errors
/// `Error::InvalidInput` when there are no source lists, `max_tracks` is 0,
/// a weight is negative or a selection window is 0.
pub fn mix<R: Rng + ?Sized>(
    input: &MixInput,
    options: &MixOptions,
    weights: &ScoringWeights,
    windows: &SelectionWindows,
    rng: &mut R,
) -> Result<MixOutcome> {
    if input.sources.is_empty() {
        return Err(Error::InvalidInput(
            "at least one source list is required".to_string(),
        ));
    }
    options.validate()?;
    weights.validate()?;
    windows.validate()?;

    let features = input.feature_index();
    let pools = build_pools(&input.sources, &features, options, rng);

    let sequencer = Sequencer::new(options, *weights, windows, input.sources.len());
    Ok(sequencer.run(pools))
}
