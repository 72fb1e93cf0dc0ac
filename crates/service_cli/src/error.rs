//! CLI error types.

use thiserror::Error;

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the CLI.
#[derive(Error, Debug)]
pub enum CliError {
    /// An input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A command-line argument is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table ingestion or report writing failed.
    #[error("Loader error: {0}")]
    Loader(#[from] adapter_loader::LoaderError),

    /// Holding normalisation failed.
    #[error("Holding error: {0}")]
    Holding(#[from] margin_models::holdings::HoldingError),

    /// Margin optimisation failed.
    #[error("Optimiser error: {0}")]
    Optimiser(#[from] margin_optimiser::OptimiserError),

    /// Stress run failed.
    #[error("Stress error: {0}")]
    Stress(#[from] margin_risk::StressError),

    /// Stress configuration is invalid.
    #[error("Stress configuration error: {0}")]
    StressConfig(#[from] margin_risk::ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
