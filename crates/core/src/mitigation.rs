//! Mitigation advisories
//!
//! Recomputed from scratch every tick. Weather warnings come first, then the
//! response level for the current population.

use crate::config::SimulationConfig;
use crate::core_types::fire_point::FirePoint;
use crate::core_types::weather::WeatherState;
use crate::volunteers::estimate_volunteers;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wind speed above which a wind warning is raised (km/h)
const STRONG_WIND: f64 = 30.0;
/// Humidity below which a dry-air warning is raised (%)
const LOW_HUMIDITY: f64 = 30.0;
/// Temperature above which a heat warning is raised (°C)
const EXTREME_HEAT: f64 = 35.0;
/// Active fronts above which the major protocol applies
const MAJOR_EMERGENCY_FIRES: usize = 5;
/// Summed intensity above which air support is advised
const AIR_SUPPORT_INTENSITY: f64 = 10.0;
/// Summed burned area above which heavy equipment is advised
const HEAVY_EQUIPMENT_AREA: f64 = 50.0;

/// One advisory strategy tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Advisory {
    StrongWind,
    LowHumidity,
    ExtremeHeat,
    /// No active fronts
    NormalSurveillance,
    MajorEmergencyProtocol,
    DeployProfessionalFirefighters,
    BasicEmergencyProtocol,
    AirSupport,
    HeavyEquipmentFirebreaks,
    /// Volunteers to mobilize, from the current estimate
    MobilizeVolunteers(u32),
    AlertAuthorities,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::StrongWind => f.write_str("Strong wind: expect rapid spread downwind"),
            Advisory::LowHumidity => f.write_str("Low humidity: vegetation is highly flammable"),
            Advisory::ExtremeHeat => f.write_str("Extreme heat: ignition risk is elevated"),
            Advisory::NormalSurveillance => f.write_str("Maintain normal surveillance"),
            Advisory::MajorEmergencyProtocol => f.write_str("Activate the major emergency protocol"),
            Advisory::DeployProfessionalFirefighters => {
                f.write_str("Deploy professional firefighting crews")
            }
            Advisory::BasicEmergencyProtocol => f.write_str("Activate the basic emergency protocol"),
            Advisory::AirSupport => f.write_str("Request helicopters and air support"),
            Advisory::HeavyEquipmentFirebreaks => {
                f.write_str("Send tanker trucks and cut firebreaks")
            }
            Advisory::MobilizeVolunteers(count) => write!(f, "Mobilize {count} volunteers"),
            Advisory::AlertAuthorities => f.write_str("Alert civil defense and local authorities"),
        }
    }
}

/// Derives the advisories for a population and weather state
#[derive(Debug, Clone, Default)]
pub struct MitigationAdvisor {
    config: SimulationConfig,
}

impl MitigationAdvisor {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Advisories for `fires` under `weather`, in display order.
    ///
    /// Only active fronts count. The rules are independent, so several
    /// warnings can fire at once.
    pub fn advise(&self, fires: &[FirePoint], weather: &WeatherState) -> Vec<Advisory> {
        let mut advisories = Vec::new();

        if weather.wind_speed.value() > STRONG_WIND {
            advisories.push(Advisory::StrongWind);
        }
        if weather.humidity.value() < LOW_HUMIDITY {
            advisories.push(Advisory::LowHumidity);
        }
        if weather.temperature.value() > EXTREME_HEAT {
            advisories.push(Advisory::ExtremeHeat);
        }

        let active: Vec<&FirePoint> = fires.iter().filter(|fire| fire.active).collect();
        if active.is_empty() {
            advisories.push(Advisory::NormalSurveillance);
            return advisories;
        }

        if active.len() > MAJOR_EMERGENCY_FIRES {
            advisories.push(Advisory::MajorEmergencyProtocol);
            advisories.push(Advisory::DeployProfessionalFirefighters);
        } else {
            advisories.push(Advisory::BasicEmergencyProtocol);
        }

        let total_intensity: f64 = active.iter().map(|fire| fire.intensity).sum();
        if total_intensity > AIR_SUPPORT_INTENSITY {
            advisories.push(Advisory::AirSupport);
        }

        let total_area: f64 = active.iter().map(|fire| fire.area()).sum();
        if total_area > HEAVY_EQUIPMENT_AREA {
            advisories.push(Advisory::HeavyEquipmentFirebreaks);
        }

        advisories.push(Advisory::MobilizeVolunteers(estimate_volunteers(fires, &self.config)));
        advisories.push(Advisory::AlertAuthorities);
        advisories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{geo_point, Degrees, FireId};

    fn fire(intensity: f64, spread: f64) -> FirePoint {
        let mut fire = FirePoint::new(FireId::seed(0), geo_point(0.0, 0.0), intensity, Degrees::new(0.0));
        fire.spread = spread;
        fire
    }

    #[test]
    fn test_quiet_day() {
        let advice = MitigationAdvisor::default().advise(&[], &WeatherState::default());
        assert_eq!(advice, vec![Advisory::NormalSurveillance]);
    }

    #[test]
    fn test_weather_warnings_precede_response() {
        let weather = WeatherState::extreme();
        let advice = MitigationAdvisor::default().advise(&[], &weather);
        assert_eq!(
            advice,
            vec![
                Advisory::StrongWind,
                Advisory::LowHumidity,
                Advisory::ExtremeHeat,
                Advisory::NormalSurveillance,
            ]
        );
    }

    #[test]
    fn test_small_incident() {
        let fires = vec![fire(1.0, 0.0), fire(1.0, 0.0)];
        let advice = MitigationAdvisor::default().advise(&fires, &WeatherState::default());
        // 2 · (5 + 2) = 14 volunteers
        assert_eq!(
            advice,
            vec![
                Advisory::BasicEmergencyProtocol,
                Advisory::MobilizeVolunteers(14),
                Advisory::AlertAuthorities,
            ]
        );
    }

    #[test]
    fn test_large_incident_escalates() {
        // Six hot fronts with area ≈ 31.4 each
        let fires: Vec<_> = (0..6).map(|_| fire(2.0, 1.0)).collect();
        let config = SimulationConfig::default();
        let advice = MitigationAdvisor::new(config.clone()).advise(&fires, &WeatherState::default());
        assert_eq!(
            advice,
            vec![
                Advisory::MajorEmergencyProtocol,
                Advisory::DeployProfessionalFirefighters,
                Advisory::AirSupport,
                Advisory::HeavyEquipmentFirebreaks,
                Advisory::MobilizeVolunteers(estimate_volunteers(&fires, &config)),
                Advisory::AlertAuthorities,
            ]
        );
    }

    #[test]
    fn test_retired_fronts_are_ignored() {
        let mut retired = fire(20.0, 5.0);
        retired.active = false;
        let advice = MitigationAdvisor::default().advise(&[retired], &WeatherState::default());
        assert_eq!(advice, vec![Advisory::NormalSurveillance]);
    }

    #[test]
    fn test_display_includes_volunteer_count() {
        assert_eq!(Advisory::MobilizeVolunteers(12).to_string(), "Mobilize 12 volunteers");
    }
}
