//! Error type shared by the geometry core and the simulator seam.

use thiserror::Error;

/// Errors raised while building arrays, sampling scenes, or collecting responses.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    /// The room cannot hold any point at the requested wall clearance.
    #[error("room {dims:?} cannot admit a placement with wall clearance {wall_clearance}")]
    InvalidRoomGeometry {
        dims: [f64; 3],
        wall_clearance: f64,
    },

    /// Rotation axis is the zero vector (or not finite) and cannot be normalized.
    #[error("rotation axis is degenerate (zero or non-finite)")]
    DegenerateRotationAxis,

    /// Parameters rejected at setup time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The rejection loop ran out of attempts.
    #[error("no valid placement found after {attempts} attempts")]
    PlacementTimeout { attempts: usize },

    /// Measured direction of arrival disagrees with the requested one.
    #[error("DOA mismatch: expected {expected} rad, measured {measured} rad")]
    DoaMismatch { expected: f64, measured: f64 },

    /// A simulator returned a response of the wrong length.
    #[error("simulator returned {actual} samples, expected {expected}")]
    SimulatorOutput { expected: usize, actual: usize },

    /// Failure reported by a simulator implementation.
    #[error("simulator error: {0}")]
    Simulator(String),
}

impl SceneError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// Result alias for the crate.
pub type SceneResult<T> = Result<T, SceneError>;
