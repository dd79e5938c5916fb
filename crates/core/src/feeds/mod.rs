//! Reference inputs from outside the simulation
//!
//! Weather seeds and satellite fire detections arrive from external services.
//! The engine only reads them: weather seeds a run, detections are drawn as an
//! overlay next to the simulated fronts.

pub mod cache;
pub mod firms;

pub use cache::{Clock, SystemClock, TtlCache, DEFAULT_TTL_MINUTES};
pub use firms::{load_firms_csv, parse_firms_csv, ReferenceFire};
