//! Fire-risk score from weather inputs
//!
//! Weighted blend of three saturating factors:
//!
//! ```text
//! temp_factor     = min(T / 40, 1)
//! humidity_factor = 1 - RH / 100
//! wind_factor     = min(W / 30, 1)
//! risk            = round((0.4·temp + 0.3·humidity + 0.3·wind) · 100)
//! ```
//!
//! The result is clamped to `[0, 100]` so out-of-range weather (humidity above
//! 100 %, sub-zero temperatures) cannot push it outside the score range.

use crate::core_types::weather::WeatherState;

/// Temperature at which the temperature factor saturates (°C)
const TEMPERATURE_SATURATION: f64 = 40.0;
/// Wind speed at which the wind factor saturates (km/h)
const WIND_SATURATION: f64 = 30.0;

const TEMPERATURE_WEIGHT: f64 = 0.4;
const HUMIDITY_WEIGHT: f64 = 0.3;
const WIND_WEIGHT: f64 = 0.3;

/// Fire risk in `[0, 100]` for the given temperature (°C), relative humidity
/// (%) and wind speed (km/h).
///
/// ```
/// use wildfire_spread_core::compute_risk;
///
/// assert_eq!(compute_risk(25.0, 50.0, 10.0), 50);
/// assert_eq!(compute_risk(45.0, 0.0, 60.0), 100);
/// ```
pub fn compute_risk(temperature: f64, humidity: f64, wind_speed: f64) -> u32 {
    let temp_factor = (temperature / TEMPERATURE_SATURATION).min(1.0);
    let humidity_factor = 1.0 - humidity / 100.0;
    let wind_factor = (wind_speed / WIND_SATURATION).min(1.0);

    let risk = ((TEMPERATURE_WEIGHT * temp_factor
        + HUMIDITY_WEIGHT * humidity_factor
        + WIND_WEIGHT * wind_factor)
        * 100.0)
        .round();

    risk.clamp(0.0, 100.0) as u32
}

/// Fire risk of a weather state
pub fn weather_risk(weather: &WeatherState) -> u32 {
    compute_risk(
        weather.temperature.value(),
        weather.humidity.value(),
        weather.wind_speed.value(),
    )
}
