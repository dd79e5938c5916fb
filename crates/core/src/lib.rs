//! Wildfire Spread Simulation Core
//!
//! A discrete-time, point-based wildfire spread engine. Fire fronts are points
//! on a (lat, lng) plane that spawn children downwind each tick, merge when
//! they crowd together and go dormant when the weather is too calm to carry
//! them.
//!
//! ## Pipeline
//!
//! Each clock tick runs, synchronously and in order:
//! - `SimulationClock` advances elapsed time and checks auto-stop
//! - `FireSpreadEngine` filters, truncates and advances the population
//! - `FireMergeEngine` condenses fronts closer than the merge distance
//! - `compute_risk` and `estimate_volunteers` refresh the derived figures
//! - `MitigationAdvisor` recomputes the advisories
//!
//! All randomness comes from a seedable generator owned by the spread engine,
//! so a run is reproducible from its seed.
//!
//! ```
//! use wildfire_spread_core::{geo_point, ClockEvent, EngineConfig, SimulationClock};
//! use std::ops::ControlFlow;
//!
//! let mut clock = SimulationClock::new(EngineConfig::default(), 7)?;
//! clock.add_fire(geo_point(-17.8, -61.5))?;
//! clock.start()?;
//!
//! let event = clock.run_to_completion(|_| ControlFlow::Continue(()));
//! assert_eq!(event, Some(ClockEvent::AutoStop));
//! assert_eq!(clock.state().elapsed, 20);
//! # Ok::<(), wildfire_spread_core::SimulationError>(())
//! ```

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Engine stages
pub mod mitigation;
pub mod risk;
pub mod spread;
pub mod volunteers;

// Run lifecycle and records
pub mod simulation;

// External reference inputs
pub mod feeds;

// Re-export core types
pub use config::{ClockConfig, EngineConfig, SimulationConfig};
pub use core_types::{geo_point, FireId, FirePoint, GeoPoint, WeatherState};
pub use core_types::{Celsius, Degrees, KilometersPerHour, Percent};
pub use error::SimulationError;

// Re-export engine stages
pub use mitigation::{Advisory, MitigationAdvisor};
pub use risk::{compute_risk, weather_risk};
pub use spread::{FireMergeEngine, FireSpreadEngine};
pub use volunteers::estimate_volunteers;

// Re-export run types
pub use simulation::{
    ClockEvent, RecordContext, RunMetrics, SeedConfiguration, SeedFire, SimulationClock,
    SimulationRecord, SimulationState, TickReport,
};
