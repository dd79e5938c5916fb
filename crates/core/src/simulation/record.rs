//! Run records and seed configurations
//!
//! A `SimulationRecord` is the JSON document handed to the persistence and
//! export collaborators once a run stops. It carries the seed points of the
//! run, never the spread trail, so loading one replays the *start* of the run
//! and lets the spread be simulated afresh.

use crate::core_types::fire_point::FirePoint;
use crate::core_types::weather::WeatherState;
use crate::error::SimulationError;
use crate::simulation::{RunMetrics, SimulationState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Auto-stop duration of a repeated run whose record has none
pub const DEFAULT_REPEAT_DURATION: u32 = 20;

/// Intensity of an imported seed point that omits it
const DEFAULT_SEED_INTENSITY: f64 = 1.0;

/// A (lat, lng) pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A seed fire point, as stored in a record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedFire {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_seed_intensity")]
    pub intensity: f64,
}

impl From<&FirePoint> for SeedFire {
    fn from(fire: &FirePoint) -> Self {
        SeedFire {
            lat: fire.lat(),
            lng: fire.lng(),
            intensity: fire.intensity,
        }
    }
}

fn default_seed_intensity() -> f64 {
    DEFAULT_SEED_INTENSITY
}

/// Weather summary of a record (no simulation speed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWeather {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

impl From<&WeatherState> for RecordWeather {
    fn from(weather: &WeatherState) -> Self {
        RecordWeather {
            temperature: weather.temperature.value(),
            humidity: weather.humidity.value(),
            wind_speed: weather.wind_speed.value(),
            wind_direction: weather.wind_direction.value(),
        }
    }
}

/// Where and by whom a run was made
#[derive(Debug, Clone, PartialEq)]
pub struct RecordContext {
    pub location: String,
    pub volunteer_name: String,
    /// Optional user label for the run
    pub name: Option<String>,
    /// Map centre when the record was taken
    pub coordinates: Coordinates,
}

impl Default for RecordContext {
    fn default() -> Self {
        RecordContext {
            location: "San José de Chiquitos".to_owned(),
            volunteer_name: String::new(),
            name: None,
            coordinates: Coordinates {
                lat: -17.8,
                lng: -61.5,
            },
        }
    }
}

/// Serialized summary of a finished (or paused) run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub timestamp: DateTime<Utc>,
    pub location: String,
    /// Elapsed ticks
    pub duration: u32,
    /// Volunteer estimate when the record was taken
    pub volunteers: u32,
    pub volunteer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub coordinates: Coordinates,
    /// Weather and simulation speed the run used
    pub parameters: WeatherState,
    pub initial_fires: Vec<SeedFire>,
    pub weather: RecordWeather,
    pub fire_risk: u32,
    /// True if any front was alive when the record was taken
    pub fire_detected: bool,
}

impl SimulationRecord {
    /// Build a record from live state.
    ///
    /// # Errors
    /// Returns `SimulationError::NoFires` when no seed points were placed.
    pub fn capture(
        state: &SimulationState,
        metrics: &RunMetrics,
        context: &RecordContext,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SimulationError> {
        if state.initial_fires.is_empty() {
            warn!("Rejected record capture: no fire points placed");
            return Err(SimulationError::NoFires);
        }

        Ok(SimulationRecord {
            timestamp,
            location: context.location.clone(),
            duration: state.elapsed,
            volunteers: metrics.volunteers,
            volunteer_name: context.volunteer_name.clone(),
            name: context.name.clone(),
            coordinates: context.coordinates,
            parameters: state.weather,
            initial_fires: state.initial_fires.iter().map(SeedFire::from).collect(),
            weather: RecordWeather::from(&state.weather),
            fire_risk: metrics.fire_risk,
            fire_detected: !state.fires.is_empty(),
        })
    }

    /// Seed configuration for repeating this run
    pub fn seed_configuration(&self) -> SeedConfiguration {
        SeedConfiguration {
            weather: self.parameters,
            initial_fires: self.initial_fires.clone(),
            duration: if self.duration == 0 {
                DEFAULT_REPEAT_DURATION
            } else {
                self.duration
            },
        }
    }

    /// Load a record file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not hold a
    /// complete record.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save as pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SimulationError> {
        fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        info!("Saved run record to {}", path.as_ref().display());
        Ok(())
    }
}

/// Initial weather and fire points of a run, plus its auto-stop duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedConfiguration {
    pub weather: WeatherState,
    pub initial_fires: Vec<SeedFire>,
    pub duration: u32,
}

/// Parameters block of an imported run; only simulation speed is optional
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedParameters {
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
    #[serde(default = "default_simulation_speed")]
    simulation_speed: f64,
}

fn default_simulation_speed() -> f64 {
    1.0
}

/// Loosely-typed run file: anything beyond these fields is ignored
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedRun {
    parameters: Option<ImportedParameters>,
    initial_fires: Option<Vec<SeedFire>>,
    duration: Option<u32>,
}

impl SeedConfiguration {
    /// Parse a run file leniently.
    ///
    /// Any record-shaped JSON is accepted as long as `parameters` and
    /// `initialFires` are present and well formed. A missing or zero duration
    /// falls back to 20 ticks.
    ///
    /// # Errors
    /// Returns `SimulationError::InvalidRecord` for incomplete or malformed data.
    pub fn from_json(text: &str) -> Result<Self, SimulationError> {
        let run: ImportedRun =
            serde_json::from_str(text).map_err(|e| SimulationError::InvalidRecord(e.to_string()))?;

        let Some(parameters) = run.parameters else {
            warn!("Rejected run import: missing parameters");
            return Err(SimulationError::InvalidRecord("missing parameters".to_owned()));
        };
        let Some(initial_fires) = run.initial_fires else {
            warn!("Rejected run import: missing initial fires");
            return Err(SimulationError::InvalidRecord("missing initialFires".to_owned()));
        };

        Ok(SeedConfiguration {
            weather: WeatherState::new(
                parameters.temperature,
                parameters.humidity,
                parameters.wind_speed,
                parameters.wind_direction,
                parameters.simulation_speed,
            ),
            initial_fires,
            duration: run
                .duration
                .filter(|&duration| duration > 0)
                .unwrap_or(DEFAULT_REPEAT_DURATION),
        })
    }

    /// Read and parse a run file
    ///
    /// # Errors
    /// Returns `SimulationError::Io` if the file cannot be read, otherwise as
    /// for `from_json`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
