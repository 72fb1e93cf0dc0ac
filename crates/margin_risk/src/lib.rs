//! # Margin Risk (L3: Stress Engine)
//!
//! Revalues a normalised holding under simulated or prescribed
//! underlying-return shocks and reports post-stress risk ratios
//! (posted margin over account equity) and cash top-up requirements.
//!
//! Two sub-engines share path generation and per-leg revaluation:
//!
//! - `var`: correlated Monte Carlo paths of underlying returns under a
//!   geometric-Brownian model calibrated from a covariance/drift table,
//!   reporting a per-step percentile (VaR) of the risk ratio per account
//! - `scenario`: a fixed grid of single-step parallel shocks, reporting
//!   risk-ratio and required-supplement pivots per account
//!
//! Per-scenario margins respect CFFEX/SHFE single-side netting: in every
//! scenario cell the smaller side's aggregate futures margin is
//! subtracted from the account total.
//!
//! Memory is proportional to `n_step × underlyings × n_path`, which
//! dominates the pipeline; accounts are evaluated in parallel with
//! rayon over the shared read-only path cube.

#![warn(missing_docs)]

pub mod config;
pub mod paths;
pub mod reval;
pub mod rng;
pub mod scenario;
pub mod tables;
pub mod var;

mod error;

pub use config::{StressConfig, StressConfigBuilder};
pub use error::{ConfigError, StressError};
pub use paths::{generate_return_paths, ReturnPaths, UnderlyingIndex};
pub use scenario::{run_scenario_grid, ScenarioReport, ScenarioRow};
pub use tables::{AccountEquityTable, CovarianceTable, DriftTable, SupplementSchedule};
pub use var::{run_stress_var, VarReport, VarRow};
