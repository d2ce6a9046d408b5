//! Error types for Kepler propagation

use std::path::PathBuf;
use thiserror::Error;

use crate::propagator::BodyId;

/// Main error type for element conversion, Kepler solving and series propagation
#[derive(Error, Debug)]
pub enum KeplerError {
    /// Zero position, zero velocity or zero angular momentum (rectilinear orbit)
    #[error("Degenerate orbit: {0}")]
    DegenerateOrbit(String),

    /// Newton-Raphson iteration exhausted its budget without meeting tolerance
    #[error(
        "Kepler equation did not converge after {iterations} iterations \
         (last iterate {last_iterate}, residual {residual:e})"
    )]
    Convergence {
        iterations: usize,
        last_iterate: f64,
        residual: f64,
    },

    /// Missing central body, invalid epoch range, non-positive interval, bad μ
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Query for a body that was never registered
    #[error("Unknown body: {0}")]
    UnknownBody(BodyId),

    /// Operation not allowed in the current series propagation phase
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Requested epoch is absent from a propagation history
    #[error("No sample at epoch {0} s")]
    UnknownEpoch(f64),

    /// Error when reading benchmark data fails
    #[error("File I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed benchmark row
    #[error("Invalid benchmark data: {0}")]
    BenchmarkFormat(String),
}

/// Result type for Kepler propagation operations
pub type Result<T> = std::result::Result<T, KeplerError>;

/// Convert a std::io::Error to KeplerError with path context
pub fn io_err(path: impl Into<PathBuf>, err: std::io::Error) -> KeplerError {
    KeplerError::Io {
        path: path.into(),
        source: err,
    }
}
