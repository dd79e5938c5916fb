//! Error type shared by every fallible engine operation.

use std::io;

/// Errors surfaced by the simulation engine.
///
/// The user-facing rejections (`NoFires`, `FireCapReached`, `Running`,
/// `InvalidRecord`) leave all simulation state unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A run was started, or a record captured, with no fire points.
    #[error("at least one fire point is required")]
    NoFires,

    /// The manual add-fire admission cap was reached.
    #[error("fire point limit reached ({cap} points)")]
    FireCapReached {
        /// Population size at which adds are rejected
        cap: usize,
    },

    /// The operation is only allowed while the clock is stopped.
    #[error("cannot {operation} while the simulation is running")]
    Running {
        /// What was attempted
        operation: &'static str,
    },

    /// An imported run is missing or has malformed seed data.
    #[error("invalid run record: {0}")]
    InvalidRecord(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Reading or writing a file failed.
    #[error("i/o error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}

impl SimulationError {
    /// True for rejections the user can act on, as opposed to I/O faults.
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            SimulationError::NoFires
                | SimulationError::FireCapReached { .. }
                | SimulationError::Running { .. }
                | SimulationError::InvalidRecord(_)
        )
    }
}
