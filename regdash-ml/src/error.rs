//! Error types for the regdash-ml crate.

use thiserror::Error;

/// Top-level error type for evaluation, data and model operations.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Shape mismatch: actual has {actual} values, predicted has {predicted}")]
    ShapeMismatch { actual: usize, predicted: usize },

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub fn shape(actual: usize, predicted: usize) -> Self {
        Self::ShapeMismatch { actual, predicted }
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
