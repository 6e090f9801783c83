pub mod backend;
pub mod buffer;
pub mod context;
pub mod error;

pub use backend::CandleBackend;
pub use buffer::{CandleBuffer, from_candle_dtype, to_candle_dtype};
pub use context::CandleContext;
pub use error::{CandleError, Result};

pub use candle_core::Device;

pub type CandleEncoderCache = encache_core::EncoderCache<CandleBackend>;
