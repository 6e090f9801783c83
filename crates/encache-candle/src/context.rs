use candle_core::{Device, Tensor};
use encache_core::{Buffer, DType, ExecutionContext, PendingOp, Shape};
use tracing::{debug, warn};

use crate::buffer::{CandleBuffer, to_candle_dtype};
use crate::error::{CandleError, Result};

/// Candle execution context with a queue of deferred buffer operations.
#[derive(Debug)]
pub struct CandleContext {
    device: Device,
    queue: Vec<PendingOp<CandleBuffer>>,
    allocated_bytes: usize,
    closed: bool,
}

impl CandleContext {
    #[must_use]
    pub fn new(device: Device) -> Self {
        Self {
            device,
            queue: Vec::new(),
            allocated_bytes: 0,
            closed: false,
        }
    }

    #[must_use]
    pub const fn device(&self) -> &Device {
        &self.device
    }

    #[must_use]
    pub const fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

fn copy_into(src: &CandleBuffer, dst: &CandleBuffer) -> Result<()> {
    if src.dtype() != dst.dtype() {
        return Err(CandleError::InvalidOp(format!(
            "copy from {:?} into {:?}",
            src.dtype(),
            dst.dtype()
        )));
    }
    if src.tensor().dims() != dst.tensor().dims() {
        return Err(CandleError::InvalidOp(format!(
            "copy from shape {:?} into {:?}",
            src.tensor().dims(),
            dst.tensor().dims()
        )));
    }

    // flattening a contiguous tensor keeps its storage, so the write lands in dst
    let dst = dst.tensor().flatten_all()?;
    let src = src.tensor().contiguous()?.flatten_all()?;
    dst.slice_set(&src, 0, 0)?;
    Ok(())
}

impl ExecutionContext for CandleContext {
    type Buffer = CandleBuffer;
    type Error = CandleError;

    fn empty(&mut self, dtype: DType, shape: &Shape) -> Result<CandleBuffer> {
        if self.closed {
            return Err(CandleError::ContextClosed);
        }

        let tensor = Tensor::zeros(shape.dims(), to_candle_dtype(dtype)?, &self.device)?;
        self.allocated_bytes += shape.size_bytes(dtype);
        CandleBuffer::new(tensor)
    }

    fn schedule(&mut self, ops: impl IntoIterator<Item = PendingOp<CandleBuffer>>) {
        if self.closed {
            warn!("Dropping operations scheduled on a closed context");
            return;
        }
        self.queue.extend(ops);
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs every scheduled operation in order. On failure the operations
    /// after the failing one are discarded.
    fn compute(&mut self) -> Result<()> {
        if self.closed {
            return Err(CandleError::ContextClosed);
        }

        let ops = std::mem::take(&mut self.queue);
        debug!(ops = ops.len(), "Computing scheduled operations");

        for op in ops {
            match op {
                PendingOp::Copy { src, dst } => copy_into(&src, &dst)?,
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            debug!(
                dropped_ops = self.queue.len(),
                allocated_bytes = self.allocated_bytes,
                "Closing execution context"
            );
        }
        self.queue.clear();
        self.closed = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn buffer(values: &[f32], dims: &[usize]) -> CandleBuffer {
        let tensor = Tensor::from_slice(values, dims, &Device::Cpu).unwrap();
        CandleBuffer::new(tensor).unwrap()
    }

    fn values(buffer: &CandleBuffer) -> Vec<f32> {
        buffer.tensor().flatten_all().unwrap().to_vec1().unwrap()
    }

    #[test]
    fn test_empty_allocates_zeros() {
        let mut ctx = CandleContext::new(Device::Cpu);
        let buf = ctx.empty(DType::F32, &Shape::from([2, 3])).unwrap();
        assert_eq!(buf.shape(), Shape::from([2, 3]));
        assert_eq!(values(&buf), vec![0.0; 6]);
        assert_eq!(ctx.allocated_bytes(), 24);
    }

    #[test]
    fn test_copy_is_deferred_until_compute() {
        let mut ctx = CandleContext::new(Device::Cpu);
        let dst = ctx.empty(DType::F32, &Shape::from([2, 2])).unwrap();
        let src = buffer(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);

        ctx.schedule([PendingOp::copy(src, dst.clone())]);
        assert_eq!(ctx.pending(), 1);
        assert_eq!(values(&dst), vec![0.0; 4]);

        ctx.compute().unwrap();
        assert_eq!(ctx.pending(), 0);
        assert_eq!(values(&dst), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_copy_from_permuted_source() {
        let mut ctx = CandleContext::new(Device::Cpu);
        let src = buffer(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let src = src.permute(&[1, 0]).unwrap();
        let dst = ctx.empty(DType::F32, &src.shape()).unwrap();

        ctx.schedule([PendingOp::copy(src, dst.clone())]);
        ctx.compute().unwrap();
        assert_eq!(values(&dst), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_copy_rejects_shape_mismatch() {
        let mut ctx = CandleContext::new(Device::Cpu);
        let dst = ctx.empty(DType::F32, &Shape::from([3])).unwrap();
        ctx.schedule([PendingOp::copy(buffer(&[1.0, 2.0], &[2]), dst)]);
        assert!(matches!(ctx.compute(), Err(CandleError::InvalidOp(_))));
        assert_eq!(ctx.pending(), 0);
    }

    #[test]
    fn test_closed_context_rejects_work() {
        let mut ctx = CandleContext::new(Device::Cpu);
        let dst = ctx.empty(DType::F32, &Shape::from([1])).unwrap();
        ctx.schedule([PendingOp::copy(buffer(&[1.0], &[1]), dst.clone())]);

        ctx.close();
        assert!(ctx.is_closed());
        assert_eq!(ctx.pending(), 0);

        ctx.schedule([PendingOp::copy(buffer(&[2.0], &[1]), dst)]);
        assert_eq!(ctx.pending(), 0);
        assert!(matches!(ctx.compute(), Err(CandleError::ContextClosed)));
        assert!(matches!(
            ctx.empty(DType::F32, &Shape::from([1])),
            Err(CandleError::ContextClosed)
        ));
    }

    #[test]
    fn test_empty_rejects_unsupported_dtype() {
        let mut ctx = CandleContext::new(Device::Cpu);
        assert!(matches!(
            ctx.empty(DType::I4, &Shape::from([8])),
            Err(CandleError::UnsupportedDType(_))
        ));
    }
}
