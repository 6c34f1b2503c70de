//! Error types for the slang-lifespan library.

use thiserror::Error;

/// Result type alias for lifetime analysis operations.
pub type Result<T> = std::result::Result<T, LifetimeError>;

/// Errors that can occur during series analysis, labelling and prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifetimeError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Required artifacts are missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Feature schema of a vector or artifact does not match the active one.
    #[error("feature schema mismatch: expected [{expected}], got [{got}]")]
    SchemaMismatch { expected: String, got: String },

    /// Model artifacts were built with a different decay-rate strategy.
    #[error("decay strategy mismatch: artifacts use '{persisted}', pipeline uses '{active}'")]
    StrategyMismatch { persisted: String, active: String },

    /// An external collaborator (dictionary, data fetcher) failed.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading or writing a persisted artifact failed.
    #[error("io error: {0}")]
    Io(String),
}

impl LifetimeError {
    /// Whether the error means "not enough signal to analyse".
    ///
    /// These are recoverable: callers emit the defined zero/none output.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, LifetimeError::EmptyData | LifetimeError::InsufficientData { .. })
    }

    /// Whether the error indicates a deployment problem (fatal, never retried).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LifetimeError::Configuration(_)
                | LifetimeError::SchemaMismatch { .. }
                | LifetimeError::StrategyMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for LifetimeError {
    fn from(err: serde_json::Error) -> Self {
        LifetimeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LifetimeError {
    fn from(err: toml::de::Error) -> Self {
        LifetimeError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LifetimeError {
    fn from(err: std::io::Error) -> Self {
        LifetimeError::Io(err.to_string())
    }
}
