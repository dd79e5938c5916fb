//! Core types and utilities

pub mod fire_point;
pub mod geo;
pub mod units;
pub mod weather;

// Re-export
pub use fire_point::{FireId, FirePoint};
pub use geo::{geo_point, planar_distance, GeoPoint};
pub use units::{Celsius, Degrees, KilometersPerHour, Percent};
pub use weather::WeatherState;
