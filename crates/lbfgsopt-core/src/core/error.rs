//! Error types for quasi-Newton optimization.
//!
//! This module defines the errors that can terminate an optimization run.
//! Conditions the optimizer recovers from on its own (a stalled line search,
//! a degenerate curvature pair, a failed checkpoint write) are logged rather
//! than returned, so they never appear here as a run outcome.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The checkpoint file could not be opened, written, renamed or read.
    #[error("Checkpoint I/O failed for {}: {source}", path.display())]
    Io {
        /// File the operation targeted
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The checkpoint file exists but its content is not a valid snapshot.
    #[error("Malformed checkpoint at line {line}: {reason}")]
    Parse {
        /// One-based line number of the offending content
        line: usize,
        /// Description of what could not be parsed
        reason: String,
    },
}

impl CheckpointError {
    /// Create an Io error for a specific path.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Parse error with a custom reason.
    pub fn parse<S: Into<String>>(line: usize, reason: S) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during optimization.
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// Invalid optimizer configuration.
    ///
    /// This error occurs when the optimizer is configured with invalid
    /// parameters (e.g., a shrink factor outside (0, 1)).
    #[error("Invalid optimizer configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// Dimension mismatch between a point and a vector produced for it.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// The objective evaluator refused the point.
    ///
    /// Evaluators raise this for inputs they cannot handle, such as an odd
    /// dimension for a pairwise objective.
    #[error("Objective evaluation failed: {reason}")]
    EvaluationFailed {
        /// Description of why the evaluation failed
        reason: String,
    },

    /// Numerical breakdown, such as a non-finite objective at the start point.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// Propagated checkpoint error.
    #[error("Checkpoint operation failed: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl OptimizerError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an EvaluationFailed error with a custom reason.
    pub fn evaluation_failed<S: Into<String>>(reason: S) -> Self {
        Self::EvaluationFailed {
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Result type alias for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;
