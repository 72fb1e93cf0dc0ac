//! MILP driver error types.

use thiserror::Error;

/// Errors that can occur while solving the strategy-selection MILP.
///
/// # Variants
///
/// - `Unbounded`: The relaxation is unbounded (a variable with positive
///   objective has no capacity row — a malformed incidence matrix)
/// - `NodeLimit`: Branch and bound exhausted its node budget
/// - `IterationLimit`: The simplex exhausted its pivot budget
/// - `InvalidProblem`: Inconsistent problem dimensions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MilpError {
    /// The LP relaxation is unbounded.
    #[error("LP relaxation is unbounded in variable {variable}")]
    Unbounded {
        /// Index of the unbounded variable
        variable: usize,
    },

    /// Branch and bound ran out of nodes.
    #[error("Branch and bound exceeded {max_nodes} nodes")]
    NodeLimit {
        /// Node budget that was exhausted
        max_nodes: usize,
    },

    /// The simplex ran out of pivots.
    #[error("Simplex exceeded {max_iterations} iterations")]
    IterationLimit {
        /// Pivot budget that was exhausted
        max_iterations: usize,
    },

    /// Problem dimensions are inconsistent.
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),
}

impl MilpError {
    /// Create an invalid-problem error.
    pub fn invalid_problem(message: impl Into<String>) -> Self {
        Self::InvalidProblem(message.into())
    }
}
