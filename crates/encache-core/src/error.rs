use std::path::PathBuf;

use thiserror::Error;

use crate::types::DType;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Encoder cache is unable to enforce requested cache padding ({0})")]
    UnsupportedPadding(usize),

    #[error("Cache config cannot be changed after being set, either by the model or backend")]
    ConfigAlreadySet,

    #[error("Cache is already initialized")]
    AlreadyInitialized,

    #[error("Cache is not initialized")]
    NotInitialized,

    #[error("Forward pass started without any positions")]
    EmptyPositions,

    #[error("Shape mismatch at layer {layer}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        layer: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("DType mismatch at layer {layer}: expected {expected:?}, got {actual:?}")]
    DTypeMismatch {
        layer: usize,
        expected: DType,
        actual: DType,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid config value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to install log subscriber: {0}")]
    SubscriberInit(String),
}

impl CacheError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}
