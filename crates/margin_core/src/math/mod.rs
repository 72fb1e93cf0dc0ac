//! Dense numerical helpers shared by the optimiser and the stress engine.
//!
//! This module provides:
//! - `cholesky`: Lower-triangular factorisation of small dense PSD matrices
//! - `stats`: Order statistics (linear-interpolation percentile)

pub mod cholesky;
pub mod stats;

pub use cholesky::{CholeskyError, CholeskyFactor};
pub use stats::percentile;
