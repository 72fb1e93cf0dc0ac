//! # Margin Optimiser (L2.5: Optimisation)
//!
//! Per-account combination-strategy selection that minimises posted
//! margin under exchange netting rules.
//!
//! This crate sits between the domain models and the risk engine,
//! solving the integer assignment problem: which admissible two-leg
//! combinations to register, and how many of each.
//!
//! ## Modules
//!
//! - `milp`: A small dense mixed-integer linear programming driver —
//!   tableau simplex over the LP relaxation, depth-first branch and
//!   bound over variable bounds
//! - `engine`: Pair enumeration over an account's legs, incidence-matrix
//!   assembly, and result-row construction
//!
//! ## Example
//!
//! ```rust,ignore
//! use margin_optimiser::{optimise_accounts, OptimiserOptions};
//!
//! let reports = optimise_accounts(&legs, &OptimiserOptions::default())?;
//! for report in reports {
//!     println!("{} {} -> {}", report.exchange, report.account, report.total_margin());
//! }
//! ```

#![warn(missing_docs)]

pub mod engine;
pub mod milp;

mod error;

pub use engine::{optimise_accounts, AccountOptimisation, HoldingEntry, OptimiserOptions};
pub use error::OptimiserError;
