//! Run configuration
//!
//! `SimulationConfig` holds the population and volunteer constants of a run and
//! is immutable once the run starts. `ClockConfig` holds the pacing of the
//! scheduling loop. Both load from JSON and fall back to the reference
//! defaults for missing fields.

use crate::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Population and volunteer constants of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Cap on fronts kept after the per-tick truncation step
    pub max_active_fires: usize,
    /// Fronts closer than this (degrees, planar) are merged
    pub merge_distance: f64,
    /// Idle ticks after which a front is retired
    pub inactivity_limit: u32,
    /// Trail length kept per front
    pub max_history_points: usize,
    /// Fixed volunteer cost of each active front
    pub volunteers_per_fire: f64,
    /// Volunteer cost per unit of intensity
    pub volunteers_per_intensity: f64,
    /// Volunteer cost per unit of burned area
    pub volunteers_per_area: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_active_fires: 50,
            merge_distance: 0.02,
            inactivity_limit: 5,
            max_history_points: 10,
            volunteers_per_fire: 5.0,
            volunteers_per_intensity: 2.0,
            volunteers_per_area: 0.1,
        }
    }
}

impl SimulationConfig {
    /// Hard cap on population size for manual add-fire actions.
    pub fn admission_cap(&self) -> usize {
        self.max_active_fires * 2
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    /// Returns `SimulationError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.max_active_fires == 0 {
            return Err(invalid("maxActiveFires", "must be at least 1"));
        }
        if !self.merge_distance.is_finite() || self.merge_distance < 0.0 {
            return Err(invalid(
                "mergeDistance",
                format!("must be finite and non-negative, got {}", self.merge_distance),
            ));
        }
        if self.max_history_points == 0 {
            return Err(invalid("maxHistoryPoints", "must be at least 1"));
        }
        for (field, value) in [
            ("volunteersPerFire", self.volunteers_per_fire),
            ("volunteersPerIntensity", self.volunteers_per_intensity),
            ("volunteersPerArea", self.volunteers_per_area),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(
                    field,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Pacing of the scheduling loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClockConfig {
    /// Wall-clock period between ticks
    pub tick_interval_ms: u64,
    /// Ticks after which a freshly started run stops on its own
    pub auto_stop_duration: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            auto_stop_duration: 20,
        }
    }
}

impl ClockConfig {
    /// Tick period as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    /// Returns `SimulationError::InvalidConfig` when the auto-stop duration is zero.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.auto_stop_duration == 0 {
            return Err(invalid("autoStopDuration", "must be at least 1 tick"));
        }
        Ok(())
    }
}

/// Both configuration sections, as stored in a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Population and volunteer constants
    pub simulation: SimulationConfig,
    /// Loop pacing
    pub clock: ClockConfig,
}

impl EngineConfig {
    /// Load and validate a JSON config file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or holds
    /// out-of-range values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.simulation.validate()?;
        config.clock.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SimulationError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SimulationError {
    SimulationError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}
