//! Loader error types.

use thiserror::Error;

/// Errors that can occur while reading input tables or writing reports.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV or a field that failed to deserialise.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A field value outside its domain (e.g. an unknown call/put flag).
    #[error("Invalid field in {table}: {message}")]
    InvalidField {
        /// Table the row came from
        table: &'static str,
        /// What was wrong
        message: String,
    },

    /// A table whose shape is wrong (e.g. non-square covariance).
    #[error("Invalid shape in {table}: {message}")]
    InvalidShape {
        /// Table the problem is in
        table: &'static str,
        /// What was wrong
        message: String,
    },
}

impl LoaderError {
    /// Create an invalid-field error.
    pub fn invalid_field(table: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            table,
            message: message.into(),
        }
    }

    /// Create an invalid-shape error.
    pub fn invalid_shape(table: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidShape {
            table,
            message: message.into(),
        }
    }
}
