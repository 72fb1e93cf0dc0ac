//! Optimiser error types.

use thiserror::Error;

use crate::milp::MilpError;

/// Errors that can occur during per-account margin optimisation.
///
/// `x = 0` is always feasible for the strategy-selection programme, so a
/// failed solve indicates a driver defect rather than bad holdings data
/// and is fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimiserError {
    /// The MILP driver failed to prove an optimum.
    #[error("Optimisation failed for account {account} on {exchange}: {source}")]
    OptimisationFailed {
        /// Account the solve belonged to
        account: String,
        /// Exchange group the solve belonged to
        exchange: String,
        /// Underlying driver error
        #[source]
        source: MilpError,
    },
}

impl OptimiserError {
    /// Create an optimisation-failed error.
    pub fn optimisation_failed(
        account: impl Into<String>,
        exchange: impl Into<String>,
        source: MilpError,
    ) -> Self {
        Self::OptimisationFailed {
            account: account.into(),
            exchange: exchange.into(),
            source,
        }
    }
}
