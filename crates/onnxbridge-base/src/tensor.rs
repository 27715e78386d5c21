use crate::dtype::TensorType;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum TensorError {
    ShapeOverflow,
    ShapeMismatch { expected: usize, got: usize },
    NegativeDimension(i64),
}

impl fmt::Display for TensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorError::ShapeOverflow => write!(f, "shape dimensions overflow when multiplied"),
            TensorError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected} elements, got {got}")
            }
            TensorError::NegativeDimension(dim) => {
                write!(f, "shape has negative dimension {dim}")
            }
        }
    }
}

impl std::error::Error for TensorError {}

/// Exclusively owned element storage, one variant per dtype. `Float16`
/// holds raw binary16 bit patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorBuffer {
    Float32(Vec<f32>),
    Float16(Vec<u16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    Bool(Vec<bool>),
}

impl TensorBuffer {
    pub fn dtype(&self) -> TensorType {
        match self {
            TensorBuffer::Float32(_) => TensorType::Float32,
            TensorBuffer::Float16(_) => TensorType::Float16,
            TensorBuffer::Int32(_) => TensorType::Int32,
            TensorBuffer::Int64(_) => TensorType::Int64,
            TensorBuffer::Uint8(_) => TensorType::Uint8,
            TensorBuffer::Bool(_) => TensorType::Bool,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TensorBuffer::Float32(v) => v.len(),
            TensorBuffer::Float16(v) => v.len(),
            TensorBuffer::Int32(v) => v.len(),
            TensorBuffer::Int64(v) => v.len(),
            TensorBuffer::Uint8(v) => v.len(),
            TensorBuffer::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.dtype().byte_size()
    }
}

/// A shaped, typed value. Constructed only through [`TensorValue::new`],
/// which guarantees the element count matches the shape product.
#[derive(Clone, PartialEq)]
pub struct TensorValue {
    buffer: TensorBuffer,
    shape: Vec<i64>,
}

impl fmt::Debug for TensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorValue")
            .field("dtype", &self.dtype())
            .field("shape", &self.shape)
            .field("len", &self.len())
            .finish()
    }
}

impl TensorValue {
    /// An empty shape is the scalar shape (product 1).
    pub fn new(buffer: TensorBuffer, shape: Vec<i64>) -> Result<Self, TensorError> {
        // Compute shape product using checked_mul to detect overflow
        let mut product: usize = 1;
        for &dim in &shape {
            if dim < 0 {
                return Err(TensorError::NegativeDimension(dim));
            }
            product = product
                .checked_mul(dim as usize)
                .ok_or(TensorError::ShapeOverflow)?;
        }

        if product != buffer.len() {
            return Err(TensorError::ShapeMismatch {
                expected: product,
                got: buffer.len(),
            });
        }

        Ok(Self { buffer, shape })
    }

    pub fn dtype(&self) -> TensorType {
        self.buffer.dtype()
    }

    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &TensorBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> TensorBuffer {
        self.buffer
    }
}
