//! Error types for linfit-studio

use thiserror::Error;

/// Result type alias for linfit operations
pub type Result<T> = std::result::Result<T, LinfitError>;

/// Coarse error category, for callers that only need to pick a dialog or an exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// An operation was invoked without its required prior setup
    Configuration,
    /// Caller-supplied data is malformed relative to a contract
    Validation,
    /// The numeric fit could not proceed
    Fit,
    /// Failure at the storage boundary
    Io,
}

/// Main error type
#[derive(Error, Debug)]
pub enum LinfitError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Fit error: {0}")]
    FitError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LinfitError {
    /// Map the error onto the four-way taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinfitError::ConfigError(_)
            | LinfitError::ModelNotFitted
            | LinfitError::PreprocessingError(_) => ErrorCategory::Configuration,
            LinfitError::ValidationError(_)
            | LinfitError::ColumnNotFound(_)
            | LinfitError::ShapeError { .. } => ErrorCategory::Validation,
            LinfitError::FitError(_) => ErrorCategory::Fit,
            LinfitError::DataError(_)
            | LinfitError::IoError(_)
            | LinfitError::SerializationError(_) => ErrorCategory::Io,
        }
    }
}

impl From<polars::error::PolarsError> for LinfitError {
    fn from(err: polars::error::PolarsError) -> Self {
        LinfitError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for LinfitError {
    fn from(err: serde_json::Error) -> Self {
        LinfitError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for LinfitError {
    fn from(err: ndarray::ShapeError) -> Self {
        LinfitError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<calamine::Error> for LinfitError {
    fn from(err: calamine::Error) -> Self {
        LinfitError::DataError(format!("spreadsheet: {}", err))
    }
}

impl From<rusqlite::Error> for LinfitError {
    fn from(err: rusqlite::Error) -> Self {
        LinfitError::DataError(format!("sqlite: {}", err))
    }
}
