//! Per-tick fire spread
//!
//! `FireSpreadEngine::advance` is the state-transition function of a run. Each
//! call takes the current population and returns the next one:
//!
//! 1. **Filter**: keep fronts that are active and not yet idle for
//!    `inactivity_limit` ticks, plus any front hotter than 0.5 regardless.
//! 2. **Truncate**: sort by intensity (descending) and keep the hottest
//!    `max_active_fires`.
//! 3. **Advance** each survivor:
//!    - idle past the limit: emitted retired, unchanged
//!    - spread distance too small to move: emitted with one more idle tick
//!    - otherwise three candidate positions are cast in a 45° cone around the
//!      heading; the survivors become children and the parent retires
//!
//!    A retired front that came back through the filter on intensity alone
//!    goes through the same steps. It can still idle or spawn children, but
//!    it is never reactivated itself.
//! 4. **Merge** the concatenated output.
//!
//! # Spread rate
//!
//! ```text
//! rate     = (risk / 100) · (wind / 20) · (T / 30) · (1 - RH / 150)
//! distance = 0.01 · rate · simulation_speed        (degrees)
//! ```
//!
//! All jitter comes from the engine's own seedable generator, so two engines
//! built with the same seed produce identical runs.

pub mod merge;

pub use merge::FireMergeEngine;

use crate::config::SimulationConfig;
use crate::core_types::fire_point::{push_bounded, FirePoint};
use crate::core_types::geo::GeoPoint;
use crate::core_types::units::Degrees;
use crate::core_types::weather::WeatherState;
use crate::risk::weather_risk;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use tracing::debug;

/// Fronts hotter than this survive the filter even when idle or retired
const PERSISTENT_INTENSITY: f64 = 0.5;

/// Below this per-tick distance (degrees) a front cannot advance
const MIN_SPREAD_DISTANCE: f64 = 0.001;

/// Candidates displaced by no more than this on both axes are discarded
const NEGLIGIBLE_DISPLACEMENT: f64 = 0.0001;

/// Half of the 45° spawn cone
const SIDE_LOBE_OFFSET_DEG: f64 = 22.5;

/// Children turn by this share of their lobe offset
const DIRECTION_DAMPING: f64 = 0.5;

/// Distance factor range of the primary lobe, as a fraction of spread distance
const PRIMARY_DISTANCE_RANGE: (f64, f64) = (0.5, 1.0);

/// Distance factor range of the two side lobes
const SIDE_DISTANCE_RANGE: (f64, f64) = (0.3, 1.0);

/// Child intensity factor range relative to the parent
const CHILD_INTENSITY_RANGE: (f64, f64) = (0.7, 1.0);

/// Per-tick spread distance in degrees for the given weather.
///
/// ```
/// use wildfire_spread_core::spread::spread_distance;
/// use wildfire_spread_core::WeatherState;
///
/// // A light breeze is too weak to move a front
/// let breeze = WeatherState::new(25.0, 50.0, 2.0, 0.0, 1.0);
/// assert!(spread_distance(&breeze) < 0.001);
/// ```
pub fn spread_distance(weather: &WeatherState) -> f64 {
    let risk = f64::from(weather_risk(weather));
    let rate = (risk / 100.0)
        * (weather.wind_speed.value() / 20.0)
        * (weather.temperature.value() / 30.0)
        * (1.0 - weather.humidity.value() / 150.0);
    0.01 * rate * weather.simulation_speed
}

/// A candidate spawn position
#[derive(Debug, Clone, Copy)]
struct Candidate {
    position: GeoPoint,
    offset: Degrees,
}

/// Advances a fire population by one tick
#[derive(Debug, Clone)]
pub struct FireSpreadEngine<R = StdRng> {
    config: SimulationConfig,
    merger: FireMergeEngine,
    rng: R,
}

impl FireSpreadEngine<StdRng> {
    /// Create an engine whose jitter is drawn from a generator seeded with `seed`.
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FireSpreadEngine<R> {
    /// Create an engine drawing jitter from `rng`.
    pub fn with_rng(config: SimulationConfig, rng: R) -> Self {
        let merger = FireMergeEngine::from_config(&config);
        Self { config, merger, rng }
    }

    /// Run configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The merge stage used at the end of every tick
    pub fn merger(&self) -> &FireMergeEngine {
        &self.merger
    }

    /// Compute the population after one tick.
    ///
    /// `tick` is folded into the ids of spawned children.
    pub fn advance(&mut self, fires: &[FirePoint], weather: &WeatherState, tick: u64) -> Vec<FirePoint> {
        let survivors = self.select_survivors(fires);
        let distance = spread_distance(weather);
        let available_slots = self.config.max_active_fires.saturating_sub(survivors.len());

        let mut next = Vec::with_capacity(survivors.len() * 2);
        let mut spawned = 0;
        for fire in &survivors {
            if fire.last_movement >= self.config.inactivity_limit {
                next.push(fire.retired());
                continue;
            }

            if distance < MIN_SPREAD_DISTANCE {
                next.push(fire.idled());
                continue;
            }

            let candidates = self.cast_candidates(fire, distance);
            if candidates.is_empty() {
                next.push(fire.idled());
                continue;
            }

            let count = candidates.len().min(available_slots);
            for (index, candidate) in candidates.into_iter().take(count).enumerate() {
                next.push(self.spawn_child(fire, candidate, distance, tick, index));
            }
            spawned += count;
            next.push(fire.retired());
        }

        debug!(
            "Tick {}: {} in, {} survivors, {} spawned, spread distance {:.5}",
            tick,
            fires.len(),
            survivors.len(),
            spawned,
            distance
        );

        self.merger.merge(next)
    }

    /// Filter and truncation steps: the population the tick works on.
    pub(crate) fn select_survivors(&self, fires: &[FirePoint]) -> Vec<FirePoint> {
        let limit = self.config.inactivity_limit;
        let mut survivors: Vec<FirePoint> = fires
            .iter()
            .filter(|fire| {
                (fire.last_movement < limit && fire.active) || fire.intensity > PERSISTENT_INTENSITY
            })
            .cloned()
            .collect();

        // Stable sort keeps input order among equal intensities
        survivors.sort_by(|a, b| b.intensity.partial_cmp(&a.intensity).unwrap_or(Ordering::Equal));
        survivors.truncate(self.config.max_active_fires);
        survivors
    }

    /// Cast the primary and two side lobes and drop negligible moves.
    fn cast_candidates(&mut self, fire: &FirePoint, distance: f64) -> Vec<Candidate> {
        let lobes = [
            (Degrees::new(0.0), PRIMARY_DISTANCE_RANGE),
            (Degrees::new(-SIDE_LOBE_OFFSET_DEG), SIDE_DISTANCE_RANGE),
            (Degrees::new(SIDE_LOBE_OFFSET_DEG), SIDE_DISTANCE_RANGE),
        ];

        lobes
            .into_iter()
            .map(|(offset, range)| {
                let reach = distance * self.jitter(range);
                let angle = (fire.direction + offset).to_radians();
                Candidate {
                    position: fire.position + GeoPoint::new(angle.cos(), angle.sin()) * reach,
                    offset,
                }
            })
            .filter(|candidate| {
                let delta = candidate.position - fire.position;
                delta.x.abs() > NEGLIGIBLE_DISPLACEMENT || delta.y.abs() > NEGLIGIBLE_DISPLACEMENT
            })
            .collect()
    }

    fn spawn_child(
        &mut self,
        parent: &FirePoint,
        candidate: Candidate,
        distance: f64,
        tick: u64,
        index: usize,
    ) -> FirePoint {
        let mut history = parent.history.clone();
        push_bounded(&mut history, candidate.position, self.config.max_history_points);

        FirePoint {
            id: parent.id.child(tick, index),
            position: candidate.position,
            intensity: parent.intensity * self.jitter(CHILD_INTENSITY_RANGE),
            spread: parent.spread + distance,
            direction: (parent.direction + Degrees::new(*candidate.offset * DIRECTION_DAMPING)).normalized(),
            last_movement: 0,
            active: true,
            history,
        }
    }

    /// Uniform factor in `[low, high)`
    fn jitter(&mut self, (low, high): (f64, f64)) -> f64 {
        low + self.rng.random::<f64>() * (high - low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{geo_point, FireId};
    use approx::assert_relative_eq;

    fn fire(id: &str, lat: f64, lng: f64, intensity: f64) -> FirePoint {
        FirePoint::new(FireId::from(id), geo_point(lat, lng), intensity, Degrees::new(0.0))
    }

    /// Hot, dry, windy: spread distance ≈ 0.018° per tick
    fn windy() -> WeatherState {
        WeatherState::new(35.0, 20.0, 40.0, 0.0, 1.0)
    }

    /// Light breeze: spread distance ≈ 0.0002° per tick, below the threshold
    fn calm() -> WeatherState {
        WeatherState::new(25.0, 50.0, 2.0, 0.0, 1.0)
    }

    #[test]
    fn test_spread_distance_formula() {
        let weather = windy();
        let risk = f64::from(weather_risk(&weather));
        let expected = 0.01 * (risk / 100.0) * (40.0 / 20.0) * (35.0 / 30.0) * (1.0 - 20.0 / 150.0);
        assert_relative_eq!(spread_distance(&weather), expected, epsilon = 1e-15);
        assert!(spread_distance(&weather) > MIN_SPREAD_DISTANCE);
    }

    #[test]
    fn test_filter_keeps_hot_idle_fires() {
        let engine = FireSpreadEngine::new(SimulationConfig::default(), 1);

        let mut idle_cool = fire("idle-cool", 0.0, 0.0, 0.4);
        idle_cool.last_movement = 5;
        let mut idle_hot = fire("idle-hot", 1.0, 0.0, 0.9);
        idle_hot.last_movement = 5;
        let mut retired_cool = fire("retired-cool", 2.0, 0.0, 0.3);
        retired_cool.active = false;
        let fresh_cool = fire("fresh-cool", 3.0, 0.0, 0.2);

        let survivors = engine.select_survivors(&[idle_cool, idle_hot, retired_cool, fresh_cool]);
        let ids: Vec<_> = survivors.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["idle-hot", "fresh-cool"]);
    }

    #[test]
    fn test_truncation_keeps_hottest() {
        let config = SimulationConfig {
            max_active_fires: 3,
            ..SimulationConfig::default()
        };
        let engine = FireSpreadEngine::new(config, 1);
        let fires: Vec<_> = (0..6)
            .map(|i| fire(&format!("f{i}"), f64::from(i), 0.0, f64::from(i) * 0.1 + 0.6))
            .collect();

        let survivors = engine.select_survivors(&fires);
        let ids: Vec<_> = survivors.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f5", "f4", "f3"]);
    }

    #[test]
    fn test_calm_weather_only_counts_idle_ticks() {
        let mut engine = FireSpreadEngine::new(SimulationConfig::default(), 7);
        let start = vec![fire("a", -17.8, -61.5, 1.0)];

        let next = engine.advance(&start, &calm(), 0);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].position, start[0].position);
        assert_eq!(next[0].last_movement, 1);
        assert!(next[0].active);
    }

    #[test]
    fn test_inactivity_limit_retires_and_stays_retired() {
        let mut engine = FireSpreadEngine::new(SimulationConfig::default(), 7);
        let mut fires = vec![fire("a", 0.0, 0.0, 1.0)];

        for tick in 0..5 {
            fires = engine.advance(&fires, &calm(), tick);
            assert!(fires[0].active, "retired too early at tick {tick}");
        }
        assert_eq!(fires[0].last_movement, 5);

        // Hot enough to survive the filter, but retired from now on
        for tick in 5..12 {
            fires = engine.advance(&fires, &calm(), tick);
            assert_eq!(fires.len(), 1);
            assert!(!fires[0].active);
        }
    }

    #[test]
    fn test_hot_retired_parent_spawns_again() {
        let config = SimulationConfig {
            merge_distance: 0.0,
            ..SimulationConfig::default()
        };
        let mut engine = FireSpreadEngine::new(config, 42);
        let mut parent = fire("p", 0.0, 0.0, 1.0);
        parent.active = false;

        let next = engine.advance(std::slice::from_ref(&parent), &windy(), 1);
        assert_eq!(next.len(), 4);

        let (children, retired): (Vec<_>, Vec<_>) = next.iter().partition(|f| f.active);
        assert_eq!(children.len(), 3);
        assert!(children.iter().all(|child| child.id.as_str().starts_with("p-1-")));
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].id, parent.id);
        assert_eq!(retired[0].position, parent.position);
    }

    #[test]
    fn test_hot_retired_fire_idles_in_calm_weather() {
        let mut engine = FireSpreadEngine::new(SimulationConfig::default(), 7);
        let mut retired = fire("r", 0.0, 0.0, 1.0);
        retired.active = false;

        let next = engine.advance(&[retired], &calm(), 0);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].last_movement, 1);
        assert!(!next[0].active);

        // Idle ticks accumulate until the limit, then it stays retired
        let mut fires = next;
        for tick in 1..8 {
            fires = engine.advance(&fires, &calm(), tick);
            assert_eq!(fires.len(), 1);
            assert!(!fires[0].active);
        }
        assert_eq!(fires[0].last_movement, 5);
    }

    #[test]
    fn test_cool_retired_fire_is_dropped() {
        let mut engine = FireSpreadEngine::new(SimulationConfig::default(), 7);
        let mut cool = fire("a", 0.0, 0.0, 0.4);
        cool.last_movement = 5;

        assert!(engine.advance(&[cool], &calm(), 0).is_empty());
    }

    #[test]
    fn test_spawning_replaces_parent_with_children() {
        // Merging disabled so every output front is visible
        let config = SimulationConfig {
            merge_distance: 0.0,
            ..SimulationConfig::default()
        };
        let mut engine = FireSpreadEngine::new(config, 42);
        let parent = fire("p", 0.0, 0.0, 2.0);
        let distance = spread_distance(&windy());

        let next = engine.advance(std::slice::from_ref(&parent), &windy(), 3);
        assert_eq!(next.len(), 4);

        let (children, retired): (Vec<_>, Vec<_>) = next.iter().partition(|f| f.active);
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].id, parent.id);
        assert_eq!(children.len(), 3);

        let expected_directions = [0.0, 360.0 - 11.25, 11.25];
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.id.as_str(), format!("p-3-{i}"));
            assert_eq!(child.last_movement, 0);
            assert_relative_eq!(child.spread, distance, epsilon = 1e-15);
            assert!(child.intensity >= 2.0 * 0.7 && child.intensity <= 2.0);
            assert_relative_eq!(*child.direction, expected_directions[i], epsilon = 1e-9);
            assert_eq!(child.history.len(), 2);
            assert_eq!(child.history[1], child.position);

            let reach = (child.position - parent.position).norm();
            assert!(reach <= distance + 1e-12);
            assert!(reach >= 0.3 * distance - 1e-12);
        }
        // Primary lobe travels along the heading (north = +lat)
        assert_relative_eq!(children[0].lng(), 0.0, epsilon = 1e-12);
        assert!(children[0].lat() >= 0.5 * distance - 1e-12);
    }

    #[test]
    fn test_slots_limit_children() {
        let config = SimulationConfig {
            max_active_fires: 2,
            merge_distance: 0.0,
            ..SimulationConfig::default()
        };
        let mut engine = FireSpreadEngine::new(config, 42);
        let fires = vec![fire("a", 0.0, 0.0, 1.0)];

        // One survivor, one free slot: one child plus the retired parent
        let next = engine.advance(&fires, &windy(), 0);
        assert_eq!(next.iter().filter(|f| f.active).count(), 1);
        assert_eq!(next.len(), 2);

        // Population full: the parent retires without children
        let fires = vec![fire("a", 0.0, 0.0, 1.0), fire("b", 5.0, 5.0, 1.0)];
        let next = engine.advance(&fires, &windy(), 1);
        assert_eq!(next.len(), 2);
        assert!(next.iter().all(|f| !f.active));
    }

    #[test]
    fn test_same_seed_same_run() {
        let start = vec![fire("a", 0.0, 0.0, 1.5), fire("b", 0.5, 0.5, 1.0)];
        let mut left = FireSpreadEngine::new(SimulationConfig::default(), 99);
        let mut right = FireSpreadEngine::new(SimulationConfig::default(), 99);

        let (mut l, mut r) = (start.clone(), start);
        for tick in 0..10 {
            l = left.advance(&l, &windy(), tick);
            r = right.advance(&r, &windy(), tick);
        }
        assert_eq!(l, r);
    }

    #[test]
    fn test_population_and_history_bounds_hold() {
        let config = SimulationConfig {
            max_active_fires: 8,
            max_history_points: 4,
            ..SimulationConfig::default()
        };
        let mut engine = FireSpreadEngine::new(config.clone(), 5);
        let mut fires: Vec<_> = (0..6)
            .map(|i| fire(&format!("f{i}"), f64::from(i) * 0.3, 0.0, 2.0))
            .collect();
        let weather = WeatherState::new(45.0, 5.0, 60.0, 45.0, 3.0);

        for tick in 0..30 {
            assert!(engine.select_survivors(&fires).len() <= config.max_active_fires);
            fires = engine.advance(&fires, &weather, tick);
            for f in &fires {
                assert!(f.history.len() <= config.max_history_points);
                assert!(f.intensity >= 0.0);
                assert!((0.0..360.0).contains(&*f.direction));
            }
        }
    }
}
