//! Stress-engine error types.

use margin_core::math::CholeskyError;
use thiserror::Error;

/// Errors from stress-configuration validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Path count outside the allowed range.
    #[error("Invalid path count: {0}")]
    InvalidPathCount(usize),

    /// Step count outside the allowed range.
    #[error("Invalid step count: {0}")]
    InvalidStepCount(usize),

    /// A parameter is missing or out of range.
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Description of the invalid value
        value: String,
    },
}

/// Errors that can occur during a stress run.
///
/// # Variants
///
/// - `SingularCovariance`: Cholesky factorisation of the symmetrised
///   covariance failed; fatal for the run
/// - `MissingUnderlying`: A held underlying has no covariance row
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StressError {
    /// The symmetrised covariance matrix admits no Cholesky factor.
    #[error("Singular covariance matrix: {0}")]
    SingularCovariance(#[from] CholeskyError),

    /// A held underlying is missing from the covariance table.
    #[error("Underlying {udl} is missing from the covariance table")]
    MissingUnderlying {
        /// The underlying tag without a covariance row
        udl: String,
    },
}

impl StressError {
    /// Create a missing-underlying error.
    pub fn missing_underlying(udl: impl Into<String>) -> Self {
        Self::MissingUnderlying { udl: udl.into() }
    }
}
