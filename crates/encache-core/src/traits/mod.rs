pub mod backend;
pub mod cache;

pub use backend::{Backend, Buffer, BufferOf, ExecutionContext};
pub use cache::{Cache, CacheView};
