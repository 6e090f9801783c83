use candle_core::Tensor;
use encache_core::{Buffer, DType, Shape};

use crate::error::{CandleError, Result};

pub fn to_candle_dtype(dtype: DType) -> Result<candle_core::DType> {
    match dtype {
        DType::F64 => Ok(candle_core::DType::F64),
        DType::F32 => Ok(candle_core::DType::F32),
        DType::F16 => Ok(candle_core::DType::F16),
        DType::BF16 => Ok(candle_core::DType::BF16),
        DType::I64 => Ok(candle_core::DType::I64),
        DType::U32 => Ok(candle_core::DType::U32),
        DType::U8 => Ok(candle_core::DType::U8),
        DType::I8 | DType::I4 => Err(CandleError::UnsupportedDType(format!("{dtype:?}"))),
    }
}

#[allow(unreachable_patterns)]
pub fn from_candle_dtype(dtype: candle_core::DType) -> Result<DType> {
    match dtype {
        candle_core::DType::F64 => Ok(DType::F64),
        candle_core::DType::F32 => Ok(DType::F32),
        candle_core::DType::F16 => Ok(DType::F16),
        candle_core::DType::BF16 => Ok(DType::BF16),
        candle_core::DType::I64 => Ok(DType::I64),
        candle_core::DType::U32 => Ok(DType::U32),
        candle_core::DType::U8 => Ok(DType::U8),
        other => Err(CandleError::UnsupportedDType(format!("{other:?}"))),
    }
}

/// A candle tensor whose dtype has an encache counterpart.
#[derive(Debug, Clone)]
pub struct CandleBuffer {
    tensor: Tensor,
    dtype: DType,
}

impl CandleBuffer {
    pub fn new(tensor: Tensor) -> Result<Self> {
        let dtype = from_candle_dtype(tensor.dtype())?;
        Ok(Self { tensor, dtype })
    }

    #[must_use]
    pub const fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    #[must_use]
    pub fn into_tensor(self) -> Tensor {
        self.tensor
    }
}

impl TryFrom<Tensor> for CandleBuffer {
    type Error = CandleError;

    fn try_from(tensor: Tensor) -> Result<Self> {
        Self::new(tensor)
    }
}

impl Buffer for CandleBuffer {
    type Error = CandleError;

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn shape(&self) -> Shape {
        Shape::from_slice(self.tensor.dims())
    }

    fn permute(&self, order: &[usize]) -> Result<Self> {
        Ok(Self {
            tensor: self.tensor.permute(order.to_vec())?,
            dtype: self.dtype,
        })
    }
}
