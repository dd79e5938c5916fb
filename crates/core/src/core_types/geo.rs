//! Planar geographic positions.

use nalgebra::Vector2;

/// A (lat, lng) pair in degrees, with `x` = latitude and `y` = longitude.
///
/// Positions are raw WGS84-like degrees with no projection: distances between
/// them are planar Euclidean norms in degree space, not geodesic.
pub type GeoPoint = Vector2<f64>;

/// Build a position from latitude and longitude.
#[inline]
#[must_use]
pub fn geo_point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng)
}

/// Planar distance between two positions, in degrees.
#[inline]
#[must_use]
pub fn planar_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    (a - b).norm()
}

/// Bit-exact key for a position, for exact-match deduplication.
///
/// `-0.0` and `0.0` share a key.
#[inline]
#[must_use]
pub(crate) fn position_key(p: &GeoPoint) -> (u64, u64) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}
