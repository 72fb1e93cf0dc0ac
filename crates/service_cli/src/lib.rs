//! Margin CLI library: command implementations, configuration, and
//! errors behind the `margin` binary.

pub mod commands;
pub mod config;

mod error;

pub use config::RunConfig;
pub use error::{CliError, Result};
