//! Weather inputs for a simulation run
//!
//! `WeatherState` carries the user-controlled weather that drives spread and
//! risk. It only changes between ticks while the clock is paused; the engine
//! itself never mutates it.

use crate::core_types::units::{Celsius, Degrees, KilometersPerHour, Percent};
use serde::{Deserialize, Serialize};

/// Eight-point compass labels, clockwise from north.
const COMPASS_LABELS: [&str; 8] = [
    "North",
    "Northeast",
    "East",
    "Southeast",
    "South",
    "Southwest",
    "West",
    "Northwest",
];

/// Weather and pacing inputs of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherState {
    /// Air temperature
    pub temperature: Celsius,
    /// Relative humidity
    pub humidity: Percent,
    /// Wind speed
    pub wind_speed: KilometersPerHour,
    /// Wind heading (0 = north, 90 = east); new fires propagate along it
    pub wind_direction: Degrees,
    /// Multiplier on per-tick spread distance
    pub simulation_speed: f64,
}

impl WeatherState {
    /// Create a new weather state
    pub fn new(
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        wind_direction: f64,
        simulation_speed: f64,
    ) -> Self {
        WeatherState {
            temperature: Celsius::new(temperature),
            humidity: Percent::new(humidity),
            wind_speed: KilometersPerHour::new(wind_speed),
            wind_direction: Degrees::new(wind_direction),
            simulation_speed,
        }
    }

    /// Hot, dry and windy: every weather advisory fires
    pub fn extreme() -> Self {
        WeatherState::new(40.0, 15.0, 45.0, 90.0, 1.0)
    }

    /// Compass label of the wind heading
    pub fn wind_direction_label(&self) -> &'static str {
        let index = (self.wind_direction.value().rem_euclid(360.0) / 45.0).round() as usize % 8;
        COMPASS_LABELS[index]
    }
}

impl Default for WeatherState {
    /// Moderate conditions the simulation page opens with
    fn default() -> Self {
        WeatherState::new(25.0, 50.0, 10.0, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weather() {
        let weather = WeatherState::default();
        assert_eq!(*weather.temperature, 25.0);
        assert_eq!(*weather.humidity, 50.0);
        assert_eq!(*weather.wind_speed, 10.0);
        assert_eq!(*weather.wind_direction, 0.0);
        assert_eq!(weather.simulation_speed, 1.0);
    }

    #[test]
    fn test_wind_direction_label() {
        let mut weather = WeatherState::default();
        let cases = [
            (0.0, "North"),
            (44.0, "Northeast"),
            (90.0, "East"),
            (180.0, "South"),
            (250.0, "West"),
            (350.0, "North"),
            (337.0, "Northwest"),
            (405.0, "Northeast"),
            (-90.0, "West"),
        ];
        for (heading, label) in cases {
            weather.wind_direction = Degrees::new(heading);
            assert_eq!(weather.wind_direction_label(), label, "heading {heading}");
        }
    }

    #[test]
    fn test_weather_serializes_camel_case() {
        let json = serde_json::to_value(WeatherState::default()).unwrap();
        assert_eq!(json["windSpeed"], 10.0);
        assert_eq!(json["windDirection"], 0.0);
        assert_eq!(json["simulationSpeed"], 1.0);
    }
}
