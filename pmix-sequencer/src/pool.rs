//! Candidate pools
//!
//! One pool per source list, holding the candidates not yet selected.
//!
//! **Construction order:**
//! 1. Flatten all sources in fetch order
//! 2. Optional global dedup (first occurrence of each key wins)
//! 3. Safety cap at `CANDIDATE_CAP_FACTOR × max_tracks` (order preserved)
//! 4. Vectorize
//! 5. Bucket by source index
//! 6. Shuffle each pool once (Fisher-Yates, injected random source)

use crate::features::{vectorize, FeatureVector};
use pmix_common::models::{AudioFeatures, FeatureIndex, SourceList, Track};
use pmix_common::MixOptions;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Candidates kept at most, as a multiple of the output cap
pub const CANDIDATE_CAP_FACTOR: usize = 5;

/// One track eligible for selection
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub track: Track,
    /// Index of the source list this candidate came from
    pub source: usize,
    pub vector: FeatureVector,
    /// Identity URI; None when the track has no id
    pub key: Option<String>,
    /// Primary artist id, empty when unknown
    pub artist_id: String,
}

impl Candidate {
    pub fn new(track: Track, source: usize, features: Option<&AudioFeatures>) -> Self {
        let vector = vectorize(&track, features);
        let key = track.uri();
        let artist_id = track.primary_artist_id().to_string();
        Self {
            track,
            source,
            vector,
            key,
            artist_id,
        }
    }
}

/// Remaining candidates of one source list, in (shuffled) pool order
#[derive(Debug, Clone, Default)]
pub struct Pool {
    candidates: Vec<Candidate>,
}

impl Pool {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    /// Take a candidate out of the pool, preserving the order of the rest
    pub fn take(&mut self, index: usize) -> Option<Candidate> {
        if index < self.candidates.len() {
            Some(self.candidates.remove(index))
        } else {
            None
        }
    }

    /// Uniform random permutation (Fisher-Yates)
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in (1..self.candidates.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.candidates.swap(i, j);
        }
    }
}

/// Build one shuffled pool per source list
///
/// Empty sources yield empty pools, so pool index always equals source
/// index.
pub fn build_pools<R: Rng + ?Sized>(
    sources: &[SourceList],
    features: &FeatureIndex,
    options: &MixOptions,
    rng: &mut R,
) -> Vec<Pool> {
    let mut flat: Vec<(usize, &Track)> = sources
        .iter()
        .enumerate()
        .flat_map(|(source, list)| list.tracks.iter().map(move |track| (source, track)))
        .collect();
    let fetched = flat.len();

    if options.remove_duplicates {
        let mut seen = HashSet::new();
        flat.retain(|(_, track)| match track.uri() {
            Some(key) => seen.insert(key),
            None => false,
        });
    }
    let unique = flat.len();

    let cap = options.max_tracks.saturating_mul(CANDIDATE_CAP_FACTOR);
    flat.truncate(cap);

    let mut buckets: Vec<Vec<Candidate>> = vec![Vec::new(); sources.len()];
    for (source, track) in flat {
        let candidate = Candidate::new(track.clone(), source, features.get(track));
        buckets[source].push(candidate);
    }

    let pools: Vec<Pool> = buckets
        .into_iter()
        .map(|bucket| {
            let mut pool = Pool::new(bucket);
            pool.shuffle(rng);
            pool
        })
        .collect();

    debug!(
        "Built {} pools: {} fetched, {} after dedup, {} after cap {} (sizes {:?})",
        pools.len(),
        fetched,
        unique,
        unique.min(cap),
        cap,
        pools.iter().map(Pool::len).collect::<Vec<_>>()
    );

    pools
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(id: &str) -> Track {
        Track {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn source(ids: &[&str]) -> SourceList {
        SourceList {
            id: String::new(),
            tracks: ids.iter().map(|id| track(id)).collect(),
        }
    }

    fn keys(pool: &Pool) -> Vec<String> {
        let mut keys: Vec<String> = pool.iter().filter_map(|c| c.key.clone()).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_one_pool_per_source() {
        let sources = vec![source(&["a", "b"]), source(&[]), source(&["c"])];
        let mut rng = StdRng::seed_from_u64(1);
        let pools = build_pools(&sources, &FeatureIndex::default(), &MixOptions::default(), &mut rng);

        assert_eq!(pools.len(), 3);
        assert_eq!(pools[0].len(), 2);
        assert!(pools[1].is_empty());
        assert_eq!(pools[2].len(), 1);
        assert!(pools[2].iter().all(|c| c.source == 2));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let sources = vec![source(&["a", "b", "a"]), source(&["b", "c"])];
        let mut rng = StdRng::seed_from_u64(7);
        let pools = build_pools(&sources, &FeatureIndex::default(), &MixOptions::default(), &mut rng);

        assert_eq!(keys(&pools[0]), vec!["spotify:track:a", "spotify:track:b"]);
        assert_eq!(keys(&pools[1]), vec!["spotify:track:c"]);
    }

    #[test]
    fn test_dedup_drops_keyless_tracks() {
        let mut list = source(&["a"]);
        list.tracks.push(Track::default());
        let mut rng = StdRng::seed_from_u64(7);

        let deduped = build_pools(
            std::slice::from_ref(&list),
            &FeatureIndex::default(),
            &MixOptions::default(),
            &mut rng,
        );
        assert_eq!(deduped[0].len(), 1);

        let options = MixOptions {
            remove_duplicates: false,
            ..Default::default()
        };
        let kept = build_pools(&[list], &FeatureIndex::default(), &options, &mut rng);
        assert_eq!(kept[0].len(), 2);
    }

    #[test]
    fn test_duplicates_kept_when_dedup_disabled() {
        let sources = vec![source(&["a"]), source(&["a"])];
        let options = MixOptions {
            remove_duplicates: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let pools = build_pools(&sources, &FeatureIndex::default(), &options, &mut rng);
        assert_eq!(pools[0].len(), 1);
        assert_eq!(pools[1].len(), 1);
    }

    #[test]
    fn test_safety_cap_truncates_in_fetch_order() {
        // max_tracks = 1 keeps at most 5 candidates: the first five fetched
        let sources = vec![source(&["a", "b", "c", "d"]), source(&["e", "f", "g"])];
        let options = MixOptions {
            max_tracks: 1,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let pools = build_pools(&sources, &FeatureIndex::default(), &options, &mut rng);

        assert_eq!(pools[0].len(), 4);
        assert_eq!(keys(&pools[1]), vec!["spotify:track:e"]);
    }

    #[test]
    fn test_shuffle_is_a_permutation_and_seeded() {
        let ids: Vec<String> = (0..50).map(|i| format!("t{}", i)).collect();
        let candidates: Vec<Candidate> = ids
            .iter()
            .map(|id| Candidate::new(track(id), 0, None))
            .collect();

        let mut first = Pool::new(candidates.clone());
        let mut second = Pool::new(candidates.clone());
        first.shuffle(&mut StdRng::seed_from_u64(42));
        second.shuffle(&mut StdRng::seed_from_u64(42));

        let order = |p: &Pool| p.iter().map(|c| c.key.clone()).collect::<Vec<_>>();
        assert_eq!(order(&first), order(&second));
        assert_ne!(order(&first), order(&Pool::new(candidates.clone())));

        let unshuffled = Pool::new(candidates);
        assert_eq!(keys(&first), keys(&unshuffled));
    }

    #[test]
    fn test_take_preserves_order() {
        let mut pool = Pool::new(vec![
            Candidate::new(track("a"), 0, None),
            Candidate::new(track("b"), 0, None),
            Candidate::new(track("c"), 0, None),
        ]);
        let taken = pool.take(1).unwrap();
        assert_eq!(taken.key.as_deref(), Some("spotify:track:b"));
        assert_eq!(pool.get(1).unwrap().key.as_deref(), Some("spotify:track:c"));
        assert!(pool.take(5).is_none());
    }

    #[test]
    fn test_candidate_uses_feature_index() {
        let index = FeatureIndex::from_records(vec![AudioFeatures {
            id: Some("a".to_string()),
            energy: Some(0.95),
            ..Default::default()
        }]);
        let sources = vec![source(&["a"])];
        let mut rng = StdRng::seed_from_u64(0);
        let pools = build_pools(&sources, &index, &MixOptions::default(), &mut rng);
        assert_eq!(pools[0].get(0).unwrap().vector.energy, 0.95);
    }
}
