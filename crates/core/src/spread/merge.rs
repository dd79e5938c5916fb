//! Merging of nearby fire fronts
//!
//! Greedy, single pass: the first unmerged front seeds a cluster and absorbs
//! every remaining front closer than the merge distance. The seed's position
//! becomes the running centroid of everything absorbed so far, so later
//! candidates are measured against the moved seed.
//!
//! The result depends on input order and merging is not associative; callers
//! that need reproducible output must fix the order of their input.

use crate::config::SimulationConfig;
use crate::core_types::fire_point::FirePoint;
use crate::core_types::geo::{planar_distance, position_key, GeoPoint};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Condenses fronts that lie within `merge_distance` of each other
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireMergeEngine {
    merge_distance: f64,
    max_history_points: usize,
}

impl FireMergeEngine {
    /// Create a merge engine
    pub fn new(merge_distance: f64, max_history_points: usize) -> Self {
        Self {
            merge_distance,
            max_history_points,
        }
    }

    /// Create a merge engine from the run configuration
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.merge_distance, config.max_history_points)
    }

    /// Merge distance in degrees
    pub fn merge_distance(&self) -> f64 {
        self.merge_distance
    }

    /// Merge `fires`, preserving the order of cluster seeds.
    ///
    /// A seed keeps its id, heading, activity and idle count. Absorbing a
    /// front moves it to the running centroid, takes the maximum intensity and
    /// spread, and joins both trails (exact duplicates dropped, most recent
    /// `max_history_points` kept).
    pub fn merge(&self, fires: Vec<FirePoint>) -> Vec<FirePoint> {
        if fires.len() <= 1 {
            return fires;
        }

        let input_len = fires.len();
        let mut pool = fires;
        let mut merged = Vec::with_capacity(pool.len());

        while !pool.is_empty() {
            let mut seed = pool.remove(0);
            let mut merge_count = 1.0_f64;

            let mut i = 0;
            while i < pool.len() {
                if planar_distance(&pool[i].position, &seed.position) < self.merge_distance {
                    let other = pool.remove(i);
                    self.absorb(&mut seed, &other, merge_count);
                    merge_count += 1.0;
                } else {
                    i += 1;
                }
            }
            merged.push(seed);
        }

        if merged.len() < input_len {
            debug!("Merged {} fronts into {}", input_len, merged.len());
        }
        merged
    }

    fn absorb(&self, seed: &mut FirePoint, other: &FirePoint, merge_count: f64) {
        seed.position = (seed.position * merge_count + other.position) / (merge_count + 1.0);
        seed.intensity = seed.intensity.max(other.intensity);
        seed.spread = seed.spread.max(other.spread);
        seed.history = self.join_histories(&seed.history, &other.history);
    }

    fn join_histories(&self, first: &[GeoPoint], second: &[GeoPoint]) -> Vec<GeoPoint> {
        let mut seen = FxHashSet::default();
        let joined: Vec<_> = first
            .iter()
            .chain(second)
            .filter(|p| seen.insert(position_key(p)))
            .copied()
            .collect();
        let skip = joined.len().saturating_sub(self.max_history_points);
        joined[skip..].to_vec()
    }
}

impl Default for FireMergeEngine {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
