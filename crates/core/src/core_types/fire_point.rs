//! Fire fronts: the entities the spread engine advances
//!
//! A `FirePoint` is one point-source of fire. It moves through a small state
//! machine over its lifetime:
//!
//! ```text
//! active (spreading) ──► active (dormant, last_movement counting up) ──► retired
//!         │
//!         └──► replaced by children (parent retired in the same tick)
//! ```
//!
//! Once `active` is false a point never becomes active again. Retired points
//! only linger for as long as the per-tick filter keeps them.

use crate::core_types::geo::GeoPoint;
use crate::core_types::units::Degrees;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a fire front.
///
/// Manually placed fronts are `fire-<n>`; spawned children derive theirs from
/// the parent as `<parent>-<tick>-<index>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FireId(String);

impl FireId {
    /// Identifier for the `n`-th manually placed fire of a run
    pub fn seed(n: u64) -> Self {
        FireId(format!("fire-{n}"))
    }

    /// Identifier for the `index`-th child spawned from `self` at `tick`
    pub fn child(&self, tick: u64, index: usize) -> Self {
        FireId(format!("{}-{tick}-{index}", self.0))
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FireId {
    fn from(value: &str) -> Self {
        FireId(value.to_owned())
    }
}

impl fmt::Display for FireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One active or retired fire front
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirePoint {
    /// Stable for the front's lifetime
    pub id: FireId,
    /// Current (lat, lng)
    pub position: GeoPoint,
    /// ≥ 0; drives colour and volunteer cost
    pub intensity: f64,
    /// Cumulative distance travelled, in degrees
    pub spread: f64,
    /// Heading of propagation
    pub direction: Degrees,
    /// Consecutive ticks without meaningful displacement
    pub last_movement: u32,
    /// False once retired
    pub active: bool,
    /// Trail of past positions, oldest first (rendering only)
    pub history: Vec<GeoPoint>,
}

impl FirePoint {
    /// Create a fresh, active front at `position` with a one-entry history.
    pub fn new(id: FireId, position: GeoPoint, intensity: f64, direction: Degrees) -> Self {
        FirePoint {
            id,
            position,
            intensity,
            spread: 0.0,
            direction,
            last_movement: 0,
            active: true,
            history: vec![position],
        }
    }

    /// Latitude in degrees
    #[inline]
    pub fn lat(&self) -> f64 {
        self.position.x
    }

    /// Longitude in degrees
    #[inline]
    pub fn lng(&self) -> f64 {
        self.position.y
    }

    /// Burned area estimate used for volunteer and equipment planning:
    /// `π · (spread · 100)² / 100`.
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * (self.spread * 100.0).powi(2) / 100.0
    }

    /// Display colour as an RGB triple, shading from yellow to red as
    /// intensity rises.
    pub fn heat_color(&self) -> [u8; 3] {
        let heat = (self.intensity * 51.0).floor().clamp(0.0, 255.0) as u8;
        [255, 255 - heat, 0]
    }

    /// Copy marked as retired
    pub(crate) fn retired(&self) -> Self {
        FirePoint {
            active: false,
            ..self.clone()
        }
    }

    /// Copy with one more idle tick counted
    pub(crate) fn idled(&self) -> Self {
        FirePoint {
            last_movement: self.last_movement + 1,
            ..self.clone()
        }
    }
}

/// Append `position` to `history`, dropping the oldest entries beyond `max_len`.
pub(crate) fn push_bounded(history: &mut Vec<GeoPoint>, position: GeoPoint, max_len: usize) {
    history.push(position);
    if history.len() > max_len {
        let excess = history.len() - max_len;
        *history = history.split_off(excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geo::geo_point;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_fire_point() {
        let fire = FirePoint::new(FireId::seed(1), geo_point(-17.8, -61.5), 1.0, Degrees::new(45.0));
        assert!(fire.active);
        assert_eq!(fire.spread, 0.0);
        assert_eq!(fire.last_movement, 0);
        assert_eq!(fire.history, vec![geo_point(-17.8, -61.5)]);
        assert_eq!(fire.lat(), -17.8);
        assert_eq!(fire.lng(), -61.5);
    }

    #[test]
    fn test_child_ids_derive_from_parent() {
        let parent = FireId::seed(3);
        assert_eq!(parent.as_str(), "fire-3");
        let child = parent.child(7, 2);
        assert_eq!(child.to_string(), "fire-3-7-2");
        assert_eq!(child.child(8, 0).as_str(), "fire-3-7-2-8-0");
    }

    #[test]
    fn test_area() {
        let mut fire = FirePoint::new(FireId::seed(1), geo_point(0.0, 0.0), 1.0, Degrees::new(0.0));
        fire.spread = 1.0;
        assert_relative_eq!(fire.area(), 100.0 * std::f64::consts::PI, epsilon = 1e-9);
        fire.spread = 0.0;
        assert_eq!(fire.area(), 0.0);
    }

    #[test]
    fn test_heat_color() {
        let mut fire = FirePoint::new(FireId::seed(1), geo_point(0.0, 0.0), 1.0, Degrees::new(0.0));
        assert_eq!(fire.heat_color(), [255, 204, 0]);
        fire.intensity = 0.0;
        assert_eq!(fire.heat_color(), [255, 255, 0]);
        fire.intensity = 10.0;
        assert_eq!(fire.heat_color(), [255, 0, 0]);
    }

    #[test]
    fn test_push_bounded_drops_oldest() {
        let mut history: Vec<GeoPoint> = (0..3).map(|i| geo_point(f64::from(i), 0.0)).collect();
        push_bounded(&mut history, geo_point(3.0, 0.0), 3);
        assert_eq!(
            history,
            vec![geo_point(1.0, 0.0), geo_point(2.0, 0.0), geo_point(3.0, 0.0)]
        );
    }
}
