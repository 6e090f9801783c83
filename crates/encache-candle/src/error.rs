use encache_core::CacheError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CandleError {
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Unsupported dtype: {0}")]
    UnsupportedDType(String),

    #[error("Execution context is closed")]
    ContextClosed,

    #[error("Invalid operation: {0}")]
    InvalidOp(String),
}

pub type Result<T> = std::result::Result<T, CandleError>;

impl From<CandleError> for CacheError {
    fn from(err: CandleError) -> Self {
        Self::backend(err)
    }
}
