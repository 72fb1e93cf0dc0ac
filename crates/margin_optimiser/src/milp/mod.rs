//! Dense mixed-integer linear programming driver.
//!
//! The optimiser's instances are small — one variable per candidate
//! strategy, one constraint per leg, dozens of each at most — so the
//! driver is a plain dense implementation:
//!
//! - [`simplex`]: primal tableau simplex for the LP relaxation
//!   (maximise `c·x` subject to `A x ≤ b`, `x ≥ 0`, all `b ≥ 0`, so the
//!   slack basis is feasible and no phase-one is needed);
//! - [`solver`]: depth-first branch and bound on fractional variables,
//!   with per-variable bound vectors and an `x = 0` incumbent.
//!
//! # Problem form
//!
//! ```text
//! maximise    c^T x
//! subject to  A x <= u      (leg capacities)
//!             x >= 0, integer
//! ```

pub mod simplex;
pub mod solver;

mod error;

pub use error::MilpError;
pub use simplex::{LinearProgram, SimplexOutcome};
pub use solver::{solve_milp, MilpConfig, MilpProblem, MilpResult};
