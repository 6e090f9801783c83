use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    F64,
    F32,
    F16,
    BF16,
    I64,
    U32,
    U8,
    I8,
    I4,
}

impl DType {
    #[must_use]
    pub const fn size_bytes_for_elements(&self, num_elements: usize) -> usize {
        match self {
            Self::F64 | Self::I64 => num_elements * 8,
            Self::F32 | Self::U32 => num_elements * 4,
            Self::F16 | Self::BF16 => num_elements * 2,
            Self::U8 | Self::I8 => num_elements,
            Self::I4 => num_elements.div_ceil(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape(pub Vec<usize>);

impl Shape {
    #[must_use]
    pub const fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    #[must_use]
    pub fn from_slice(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }

    #[must_use]
    pub fn num_elements(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.iter().product()
        }
    }

    #[must_use]
    pub fn size_bytes(&self, dtype: DType) -> usize {
        dtype.size_bytes_for_elements(self.num_elements())
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Reorders the dimensions so that output axis `i` is input axis `order[i]`.
    ///
    /// Returns `None` if `order` is not a permutation of `0..ndim`.
    #[must_use]
    pub fn permuted(&self, order: &[usize]) -> Option<Self> {
        if order.len() != self.ndim() {
            return None;
        }
        let mut seen = vec![false; order.len()];
        let mut dims = Vec::with_capacity(order.len());
        for &axis in order {
            if axis >= order.len() || seen[axis] {
                return None;
            }
            seen[axis] = true;
            dims.push(self.0[axis]);
        }
        Some(Self(dims))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}
