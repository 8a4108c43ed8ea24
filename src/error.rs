//! Error types for the used-car pricing pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PricingError {
    /// A required column is missing, or a frame does not match the fitted schema
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Invalid hyperparameter grid or run configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PricingError {
    /// Missing-column error with a uniform message
    pub fn missing_column(name: &str) -> Self {
        PricingError::SchemaError(format!("column '{}' not found", name))
    }
}

impl From<polars::error::PolarsError> for PricingError {
    fn from(err: polars::error::PolarsError) -> Self {
        PricingError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(err: serde_json::Error) -> Self {
        PricingError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for PricingError {
    fn from(err: bincode::Error) -> Self {
        PricingError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PricingError {
    fn from(err: ndarray::ShapeError) -> Self {
        PricingError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
