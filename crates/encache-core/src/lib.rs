pub mod config;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use config::{CacheConfigFile, EncacheConfig, LoggingConfigFile};
pub use encoder::{EncoderCache, PERMUTED_V_ORDER};
pub use error::{CacheError, ConfigError};
pub use logging::init_logging;
pub use traits::{Backend, Buffer, BufferOf, Cache, CacheView, ExecutionContext};
pub use types::{CacheConfig, CacheState, DType, PendingOp, Shape};
