//! Error types for the ratings store.

use thiserror::Error;

/// Errors that can occur while loading and validating the dataset
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error occurred while reading a data file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a data file couldn't be parsed
    ///
    /// Carries enough context to find the offending line
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A rating references a user or movie that doesn't exist
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
