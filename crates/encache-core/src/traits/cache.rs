use crate::error::CacheError;
use crate::traits::backend::{Backend, BufferOf};
use crate::types::{CacheConfig, DType, PendingOp};

/// Key, value and mask buffers for the active layer.
pub type CacheView<'a, B> = (
    Option<&'a BufferOf<B>>,
    Option<&'a BufferOf<B>>,
    Option<&'a BufferOf<B>>,
);

/// Operations shared by every per-layer cache a model forward pass drives.
pub trait Cache<B: Backend> {
    fn init(&mut self, backend: &B, dtype: DType, capacity: usize) -> Result<(), CacheError>;
    fn set_config(&mut self, config: CacheConfig) -> Result<(), CacheError>;
    fn close(&mut self);

    fn start_forward(&mut self, positions: &[i32], sequences: &[usize]) -> Result<(), CacheError>;
    fn set_layer(&mut self, layer: usize);

    fn get(&self) -> CacheView<'_, B>;
    fn put(
        &mut self,
        key: BufferOf<B>,
        value: BufferOf<B>,
    ) -> Result<Vec<PendingOp<BufferOf<B>>>, CacheError>;

    fn copy_prefix(&mut self, src_seq: usize, dst_seq: usize, len: i32) -> Result<(), CacheError>;
    fn remove(&mut self, seq: usize, begin_index: i32, end_index: i32) -> Result<(), CacheError>;
}
