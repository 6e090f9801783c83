//! Position-independent cache for encoder outputs.
//!
//! The stored keys and values are produced once per input and read back
//! unchanged by every later forward pass, whatever their shape. Only one
//! sequence is tracked and no mask is ever produced.

use std::fmt;

use tracing::debug;

use crate::error::CacheError;
use crate::traits::{Backend, Buffer, BufferOf, Cache, CacheView, ExecutionContext};
use crate::types::{CacheConfig, CacheState, DType, PendingOp};

/// Axis order applied to values when the backend wants them transposed.
pub const PERMUTED_V_ORDER: [usize; 4] = [1, 2, 0, 3];

#[derive(Debug, Clone)]
struct LayerSlot<T> {
    key: T,
    value: T,
}

pub struct EncoderCache<B: Backend> {
    config: Option<CacheConfig>,

    cur_layer: usize,
    // position of whatever gets stored during this pass
    cur_pos: i32,

    encoder_cached: bool,
    encoder_pos: i32,

    cache_ctx: Option<B::Context>,
    slots: Vec<Option<LayerSlot<BufferOf<B>>>>,
    closed: bool,
}

impl<B: Backend> EncoderCache<B> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: None,
            cur_layer: 0,
            cur_pos: 0,
            encoder_cached: false,
            encoder_pos: 0,
            cache_ctx: None,
            slots: Vec::new(),
            closed: false,
        }
    }

    /// Creates a cache with slot storage pre-sized for `num_layers` layers.
    #[must_use]
    pub fn with_layers(num_layers: usize) -> Self {
        let mut cache = Self::new();
        cache.slots.resize_with(num_layers, || None);
        cache
    }

    #[must_use]
    pub const fn encoder_cached(&self) -> bool {
        self.encoder_cached
    }

    #[must_use]
    pub const fn cached_position(&self) -> Option<i32> {
        if self.encoder_cached {
            Some(self.encoder_pos)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn config(&self) -> Option<&CacheConfig> {
        self.config.as_ref()
    }

    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn current_layer(&self) -> usize {
        self.cur_layer
    }

    #[must_use]
    pub const fn state(&self) -> CacheState {
        if self.closed {
            CacheState::Closed
        } else if self.cache_ctx.is_none() {
            CacheState::Uninitialized
        } else if self.encoder_cached {
            CacheState::Cached
        } else {
            CacheState::Empty
        }
    }

    fn ensure_layer(&mut self, layer: usize) {
        if layer >= self.slots.len() {
            self.slots.resize_with(layer + 1, || None);
        }
    }
}

impl<B: Backend> Default for EncoderCache<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> fmt::Debug for EncoderCache<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderCache")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("cur_layer", &self.cur_layer)
            .field("cur_pos", &self.cur_pos)
            .field("encoder_pos", &self.encoder_pos)
            .field("num_layers", &self.slots.len())
            .finish_non_exhaustive()
    }
}

fn check_layout<T: Buffer>(layer: usize, slot: &T, incoming: &T) -> Result<(), CacheError> {
    if slot.dtype() != incoming.dtype() {
        return Err(CacheError::DTypeMismatch {
            layer,
            expected: slot.dtype(),
            actual: incoming.dtype(),
        });
    }

    let (expected, actual) = (slot.shape(), incoming.shape());
    if expected != actual {
        return Err(CacheError::ShapeMismatch {
            layer,
            expected: expected.0,
            actual: actual.0,
        });
    }

    Ok(())
}

impl<B: Backend> Cache<B> for EncoderCache<B> {
    fn init(&mut self, backend: &B, _dtype: DType, _capacity: usize) -> Result<(), CacheError> {
        if self.closed || self.cache_ctx.is_some() {
            return Err(CacheError::AlreadyInitialized);
        }

        let config = match self.config {
            Some(config) => config,
            None => backend.cache_config().unwrap_or_default(),
        };

        if config.cache_padding != 0 && config.cache_padding != 1 {
            return Err(CacheError::UnsupportedPadding(config.cache_padding));
        }

        debug!(
            cache_padding = config.cache_padding,
            permuted_v = config.permuted_v,
            "Encoder cache config resolved"
        );

        self.cache_ctx = Some(backend.new_context().map_err(CacheError::backend)?);
        self.config = Some(config);
        Ok(())
    }

    fn set_config(&mut self, config: CacheConfig) -> Result<(), CacheError> {
        if self.config.is_some() {
            return Err(CacheError::ConfigAlreadySet);
        }

        self.config = Some(config);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut ctx) = self.cache_ctx.take() {
            ctx.close();
            debug!(layers = self.slots.len(), "Encoder cache closed");
        }

        self.slots.clear();
        self.encoder_cached = false;
        self.closed = true;
    }

    fn start_forward(&mut self, positions: &[i32], _sequences: &[usize]) -> Result<(), CacheError> {
        // the encoder output always sits at the first position of the batch
        self.cur_pos = *positions.first().ok_or(CacheError::EmptyPositions)?;
        Ok(())
    }

    fn set_layer(&mut self, layer: usize) {
        self.ensure_layer(layer);
        self.cur_layer = layer;
    }

    fn get(&self) -> CacheView<'_, B> {
        match self.slots.get(self.cur_layer).and_then(Option::as_ref) {
            Some(slot) => (Some(&slot.key), Some(&slot.value), None),
            None => (None, None, None),
        }
    }

    fn put(
        &mut self,
        key: BufferOf<B>,
        value: BufferOf<B>,
    ) -> Result<Vec<PendingOp<BufferOf<B>>>, CacheError> {
        let permuted_v = self.config.is_some_and(|c| c.permuted_v);
        let layer = self.cur_layer;
        self.ensure_layer(layer);

        let ctx = self.cache_ctx.as_mut().ok_or(CacheError::NotInitialized)?;

        let value = if permuted_v {
            value
                .permute(&PERMUTED_V_ORDER)
                .map_err(CacheError::backend)?
        } else {
            value
        };

        let slot = match &mut self.slots[layer] {
            Some(slot) => {
                check_layout(layer, &slot.key, &key)?;
                check_layout(layer, &slot.value, &value)?;
                slot
            }
            empty @ None => {
                let (key_shape, value_shape) = (key.shape(), value.shape());
                let slot_key = ctx
                    .empty(key.dtype(), &key_shape)
                    .map_err(CacheError::backend)?;
                let slot_value = ctx
                    .empty(value.dtype(), &value_shape)
                    .map_err(CacheError::backend)?;

                debug!(
                    layer,
                    key_shape = ?key_shape.dims(),
                    value_shape = ?value_shape.dims(),
                    "Allocated encoder cache slot"
                );

                empty.insert(LayerSlot {
                    key: slot_key,
                    value: slot_value,
                })
            }
        };

        let ops = vec![
            PendingOp::copy(key, slot.key.clone()),
            PendingOp::copy(value, slot.value.clone()),
        ];

        self.encoder_pos = self.cur_pos;
        self.encoder_cached = true;

        Ok(ops)
    }

    fn copy_prefix(
        &mut self,
        _src_seq: usize,
        _dst_seq: usize,
        _len: i32,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unsupported(
            "encoder cache does not support multiple sequences".to_string(),
        ))
    }

    fn remove(&mut self, _seq: usize, begin_index: i32, end_index: i32) -> Result<(), CacheError> {
        if self.encoder_cached && (begin_index..end_index).contains(&self.encoder_pos) {
            debug!(
                position = self.encoder_pos,
                begin_index, end_index, "Encoder cache invalidated"
            );
            self.encoder_cached = false;
        }

        Ok(())
    }
}
