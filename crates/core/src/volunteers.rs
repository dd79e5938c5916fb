//! Responder volunteer estimate
//!
//! Each active front costs a fixed number of volunteers plus a share per unit
//! of intensity and per unit of burned area:
//!
//! ```text
//! area = π · (spread · 100)² / 100
//! cost = PER_FIRE + intensity · PER_INTENSITY + area · PER_AREA
//! ```
//!
//! Costs are summed over active fronts and rounded once at the end.

use crate::config::SimulationConfig;
use crate::core_types::fire_point::FirePoint;

/// Unrounded volunteer demand of the active fronts.
pub(crate) fn volunteer_demand(fires: &[FirePoint], config: &SimulationConfig) -> f64 {
    fires
        .iter()
        .filter(|fire| fire.active)
        .map(|fire| {
            config.volunteers_per_fire
                + fire.intensity * config.volunteers_per_intensity
                + fire.area() * config.volunteers_per_area
        })
        .sum()
}

/// Number of volunteers needed for the active fronts in `fires`. Retired
/// fronts cost nothing; an empty population needs no one.
pub fn estimate_volunteers(fires: &[FirePoint], config: &SimulationConfig) -> u32 {
    volunteer_demand(fires, config).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{geo_point, Degrees, FireId};

    fn fire(spread: f64, intensity: f64, active: bool) -> FirePoint {
        let mut fire = FirePoint::new(FireId::seed(0), geo_point(0.0, 0.0), intensity, Degrees::new(0.0));
        fire.spread = spread;
        fire.active = active;
        fire
    }

    fn reference_config() -> SimulationConfig {
        SimulationConfig {
            volunteers_per_fire: 5.0,
            volunteers_per_intensity: 2.0,
            volunteers_per_area: 0.1,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_reference_scenario() {
        // 5 + 4 + 31.42 ≈ 40.42 and 5 + 2 + 7.85 ≈ 14.85 → 55.27
        let fires = vec![fire(1.0, 2.0, true), fire(0.5, 1.0, true)];
        assert_eq!(estimate_volunteers(&fires, &reference_config()), 55);
    }

    #[test]
    fn test_empty_population() {
        assert_eq!(estimate_volunteers(&[], &reference_config()), 0);
    }

    #[test]
    fn test_retired_fires_cost_nothing() {
        let fires = vec![fire(1.0, 2.0, false), fire(0.0, 1.0, true)];
        // Only the fresh front counts: 5 + 2 + 0
        assert_eq!(estimate_volunteers(&fires, &reference_config()), 7);
    }
}
