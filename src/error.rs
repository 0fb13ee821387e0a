use thiserror::Error;

/// Errors raised by model construction, fitting, prediction and persistence.
#[derive(Debug, Clone, Error)]
pub enum ClusterError {
    /// A constructor parameter is outside its valid range.
    #[error("invalid argument {name}: {message}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// The input matrix has no records or no features.
    #[error("the dataset provided is empty")]
    EmptyDataset,

    /// The input contains NaN or other non-finite values.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Record shapes or indices are inconsistent.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Saving or loading a model failed. The target stream may be in an
    /// inconsistent state.
    #[error("model persistence failed: {0}")]
    Persistence(String),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, ClusterError>;
