use std::fmt::Debug;

use crate::types::{CacheConfig, DType, PendingOp, Shape};

pub type BufferOf<B> = <<B as Backend>::Context as ExecutionContext>::Buffer;

pub trait Buffer: Clone + Debug {
    type Error: std::error::Error + Send + Sync + 'static;

    fn dtype(&self) -> DType;
    fn shape(&self) -> Shape;

    /// Returns a view whose axis `i` is this buffer's axis `order[i]`.
    fn permute(&self, order: &[usize]) -> Result<Self, Self::Error>;
}

/// Allocates buffers and runs deferred operations against them.
///
/// Scheduled operations have no effect until [`ExecutionContext::compute`]
/// drains the queue.
pub trait ExecutionContext {
    type Buffer: Buffer;
    type Error: std::error::Error + Send + Sync + 'static;

    fn empty(&mut self, dtype: DType, shape: &Shape) -> Result<Self::Buffer, Self::Error>;
    fn schedule(&mut self, ops: impl IntoIterator<Item = PendingOp<Self::Buffer>>);
    fn pending(&self) -> usize;
    fn compute(&mut self) -> Result<(), Self::Error>;
    fn close(&mut self);
}

pub trait Backend {
    type Context: ExecutionContext;

    fn new_context(&self) -> Result<Self::Context, <Self::Context as ExecutionContext>::Error>;

    /// Layout preferences for caches built on this backend, if it has any.
    fn cache_config(&self) -> Option<CacheConfig> {
        None
    }
}
