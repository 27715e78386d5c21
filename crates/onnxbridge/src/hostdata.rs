use crate::convert::{clamp_to_i32, clamp_to_u8, saturating_round};
use crate::error::BridgeError;
use onnxbridge_base::{f16_to_f32, f32_to_f16, TensorBuffer, TensorType, TensorValue};
use serde::Serialize;

/// Tensor payload as supplied by the host.
///
/// `Bytes` carries tightly packed native-endian elements of the declared
/// dtype; the other forms are generic sequences coerced per element using
/// the same rounding and clamping rules as dtype conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorInput {
    Bytes(Vec<u8>),
    Floats(Vec<f64>),
    Ints(Vec<i64>),
    Bools(Vec<bool>),
}

impl TensorInput {
    /// Copy the payload into an owned buffer of the requested dtype.
    pub fn into_buffer(self, dtype: TensorType) -> Result<TensorBuffer, BridgeError> {
        match self {
            TensorInput::Bytes(bytes) => buffer_from_bytes(dtype, &bytes),
            TensorInput::Floats(values) => Ok(buffer_from_floats(dtype, &values)),
            TensorInput::Ints(values) => Ok(buffer_from_ints(dtype, &values)),
            TensorInput::Bools(values) => {
                if dtype != TensorType::Bool {
                    return Err(BridgeError::Argument(format!(
                        "boolean data cannot initialize a {dtype} tensor"
                    )));
                }
                Ok(TensorBuffer::Bool(values))
            }
        }
    }
}

fn buffer_from_bytes(dtype: TensorType, bytes: &[u8]) -> Result<TensorBuffer, BridgeError> {
    let width = dtype.byte_size();
    if bytes.len() % width != 0 {
        return Err(BridgeError::Argument(format!(
            "{} bytes is not a whole number of {width}-byte {dtype} elements",
            bytes.len()
        )));
    }

    let buffer = match dtype {
        TensorType::Float32 => TensorBuffer::Float32(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        TensorType::Float16 => TensorBuffer::Float16(
            bytes
                .chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                .collect(),
        ),
        TensorType::Int32 => TensorBuffer::Int32(
            bytes
                .chunks_exact(4)
                .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        TensorType::Int64 => TensorBuffer::Int64(
            bytes
                .chunks_exact(8)
                .map(|c| i64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
        TensorType::Uint8 => TensorBuffer::Uint8(bytes.to_vec()),
        TensorType::Bool => TensorBuffer::Bool(bytes.iter().map(|&b| b != 0).collect()),
    };
    Ok(buffer)
}

fn buffer_from_floats(dtype: TensorType, values: &[f64]) -> TensorBuffer {
    match dtype {
        TensorType::Float32 => TensorBuffer::Float32(values.iter().map(|&x| x as f32).collect()),
        TensorType::Float16 => {
            TensorBuffer::Float16(values.iter().map(|&x| f32_to_f16(x as f32)).collect())
        }
        TensorType::Int32 => TensorBuffer::Int32(values.iter().map(|&x| saturating_round(x)).collect()),
        TensorType::Int64 => TensorBuffer::Int64(values.iter().map(|&x| saturating_round(x)).collect()),
        TensorType::Uint8 => TensorBuffer::Uint8(values.iter().map(|&x| saturating_round(x)).collect()),
        TensorType::Bool => TensorBuffer::Bool(values.iter().map(|&x| x != 0.0).collect()),
    }
}

fn buffer_from_ints(dtype: TensorType, values: &[i64]) -> TensorBuffer {
    match dtype {
        TensorType::Float32 => TensorBuffer::Float32(values.iter().map(|&x| x as f32).collect()),
        TensorType::Float16 => {
            TensorBuffer::Float16(values.iter().map(|&x| f32_to_f16(x as f32)).collect())
        }
        TensorType::Int32 => TensorBuffer::Int32(values.iter().map(|&x| clamp_to_i32(x)).collect()),
        TensorType::Int64 => TensorBuffer::Int64(values.to_vec()),
        TensorType::Uint8 => TensorBuffer::Uint8(values.iter().map(|&x| clamp_to_u8(x)).collect()),
        TensorType::Bool => TensorBuffer::Bool(values.iter().map(|&x| x != 0).collect()),
    }
}

/// Flat row-major payload returned to the host. Floating dtypes widen to
/// f64, integer and boolean dtypes widen to i64 (bool as 0/1).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HostData {
    Floats(Vec<f64>),
    Ints(Vec<i64>),
}

/// Readback of a registered tensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostTensor {
    pub data: HostData,
    pub dtype: TensorType,
    pub shape: Vec<i64>,
}

impl HostTensor {
    pub fn from_value(value: &TensorValue) -> Self {
        let data = match value.buffer() {
            TensorBuffer::Float32(v) => HostData::Floats(v.iter().map(|&x| x as f64).collect()),
            TensorBuffer::Float16(v) => {
                HostData::Floats(v.iter().map(|&bits| f16_to_f32(bits) as f64).collect())
            }
            TensorBuffer::Int32(v) => HostData::Ints(v.iter().map(|&x| x as i64).collect()),
            TensorBuffer::Int64(v) => HostData::Ints(v.clone()),
            TensorBuffer::Uint8(v) => HostData::Ints(v.iter().map(|&x| x as i64).collect()),
            TensorBuffer::Bool(v) => HostData::Ints(v.iter().map(|&b| b as i64).collect()),
        };
        HostTensor {
            data,
            dtype: value.dtype(),
            shape: value.shape().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_round_trip_float32() {
        let mut bytes = Vec::new();
        for x in [1.5f32, -2.25] {
            bytes.extend_from_slice(&x.to_ne_bytes());
        }
        let buffer = TensorInput::Bytes(bytes)
            .into_buffer(TensorType::Float32)
            .unwrap();
        assert_eq!(buffer, TensorBuffer::Float32(vec![1.5, -2.25]));
    }

    #[test]
    fn test_bytes_length_must_divide_evenly() {
        let err = TensorInput::Bytes(vec![0; 7])
            .into_buffer(TensorType::Int32)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Argument(_)));
        assert_eq!(err.code(), "INVALID_ARG");
    }

    #[test]
    fn test_floats_coerce_with_rounding() {
        let buffer = TensorInput::Floats(vec![3.7, -3.5, 0.4])
            .into_buffer(TensorType::Int32)
            .unwrap();
        assert_eq!(buffer, TensorBuffer::Int32(vec![4, -4, 0]));
    }

    #[test]
    fn test_ints_coerce_with_saturation() {
        let buffer = TensorInput::Ints(vec![i64::MAX, -1, 300])
            .into_buffer(TensorType::Uint8)
            .unwrap();
        assert_eq!(buffer, TensorBuffer::Uint8(vec![255, 0, 255]));
    }

    #[test]
    fn test_bools_only_fit_bool_tensors() {
        let err = TensorInput::Bools(vec![true])
            .into_buffer(TensorType::Float32)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Argument(_)));

        let buffer = TensorInput::Bools(vec![true, false])
            .into_buffer(TensorType::Bool)
            .unwrap();
        assert_eq!(buffer, TensorBuffer::Bool(vec![true, false]));
    }

    #[test]
    fn test_host_tensor_widens_bool_to_ints() {
        let value = TensorValue::new(
            TensorBuffer::Bool(vec![true, false, true]),
            vec![3],
        )
        .unwrap();
        let host = HostTensor::from_value(&value);
        assert_eq!(host.data, HostData::Ints(vec![1, 0, 1]));
        assert_eq!(host.dtype, TensorType::Bool);
        assert_eq!(host.shape, vec![3]);
    }

    #[test]
    fn test_host_tensor_decodes_float16() {
        let value = TensorValue::new(
            TensorBuffer::Float16(vec![0x3c00, 0x4000]),
            vec![2],
        )
        .unwrap();
        let host = HostTensor::from_value(&value);
        assert_eq!(host.data, HostData::Floats(vec![1.0, 2.0]));
    }
}
