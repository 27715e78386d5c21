use crate::error::BridgeError;
use num_traits::{Bounded, NumCast, Zero};
use onnxbridge_base::{f16_to_f32, f32_to_f16, TensorBuffer, TensorType, TensorValue};

/// Round half away from zero, then saturate into the target integer range.
/// NaN becomes zero.
pub(crate) fn saturating_round<T>(value: f64) -> T
where
    T: NumCast + Bounded + Zero,
{
    if value.is_nan() {
        return T::zero();
    }
    let rounded = value.round();
    match num_traits::cast::<f64, T>(rounded) {
        Some(v) => v,
        None if rounded < 0.0 => T::min_value(),
        None => T::max_value(),
    }
}

pub(crate) fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

pub(crate) fn clamp_to_u8(value: i64) -> u8 {
    value.clamp(0, u8::MAX as i64) as u8
}

// Borrowed view of a buffer whose elements carry numeric meaning. Bool
// has no variant here: it can be a conversion target but never a source.
enum NumericView<'a> {
    F32(&'a [f32]),
    F16(&'a [u16]),
    I32(&'a [i32]),
    I64(&'a [i64]),
    U8(&'a [u8]),
}

fn numeric_view(buffer: &TensorBuffer) -> Option<NumericView<'_>> {
    match buffer {
        TensorBuffer::Float32(v) => Some(NumericView::F32(v)),
        TensorBuffer::Float16(v) => Some(NumericView::F16(v)),
        TensorBuffer::Int32(v) => Some(NumericView::I32(v)),
        TensorBuffer::Int64(v) => Some(NumericView::I64(v)),
        TensorBuffer::Uint8(v) => Some(NumericView::U8(v)),
        TensorBuffer::Bool(_) => None,
    }
}

impl NumericView<'_> {
    fn to_f32(&self) -> Vec<f32> {
        match self {
            NumericView::F32(v) => v.to_vec(),
            NumericView::F16(v) => v.iter().map(|&bits| f16_to_f32(bits)).collect(),
            NumericView::I32(v) => v.iter().map(|&x| x as f32).collect(),
            NumericView::I64(v) => v.iter().map(|&x| x as f32).collect(),
            NumericView::U8(v) => v.iter().map(|&x| x as f32).collect(),
        }
    }

    // Integer sources stay in the integer domain so wide int64 values are
    // saturated exactly rather than routed through a float.
    fn to_i32(&self) -> Vec<i32> {
        match self {
            NumericView::F32(v) => v.iter().map(|&x| saturating_round(x as f64)).collect(),
            NumericView::F16(v) => v
                .iter()
                .map(|&bits| saturating_round(f16_to_f32(bits) as f64))
                .collect(),
            NumericView::I32(v) => v.to_vec(),
            NumericView::I64(v) => v.iter().map(|&x| clamp_to_i32(x)).collect(),
            NumericView::U8(v) => v.iter().map(|&x| x as i32).collect(),
        }
    }

    fn to_i64(&self) -> Vec<i64> {
        match self {
            NumericView::F32(v) => v.iter().map(|&x| saturating_round(x as f64)).collect(),
            NumericView::F16(v) => v
                .iter()
                .map(|&bits| saturating_round(f16_to_f32(bits) as f64))
                .collect(),
            NumericView::I32(v) => v.iter().map(|&x| x as i64).collect(),
            NumericView::I64(v) => v.to_vec(),
            NumericView::U8(v) => v.iter().map(|&x| x as i64).collect(),
        }
    }

    fn to_u8(&self) -> Vec<u8> {
        match self {
            NumericView::F32(v) => v.iter().map(|&x| saturating_round(x as f64)).collect(),
            NumericView::F16(v) => v
                .iter()
                .map(|&bits| saturating_round(f16_to_f32(bits) as f64))
                .collect(),
            NumericView::I32(v) => v.iter().map(|&x| clamp_to_u8(x as i64)).collect(),
            NumericView::I64(v) => v.iter().map(|&x| clamp_to_u8(x)).collect(),
            NumericView::U8(v) => v.to_vec(),
        }
    }

    fn to_bool(&self) -> Vec<bool> {
        match self {
            NumericView::F32(v) => v.iter().map(|&x| x != 0.0).collect(),
            NumericView::F16(v) => v.iter().map(|&bits| f16_to_f32(bits) != 0.0).collect(),
            NumericView::I32(v) => v.iter().map(|&x| x != 0).collect(),
            NumericView::I64(v) => v.iter().map(|&x| x != 0).collect(),
            NumericView::U8(v) => v.iter().map(|&x| x != 0).collect(),
        }
    }
}

/// Produce a freshly allocated value of `target` dtype from `source`,
/// preserving the shape. The source is never mutated. A same-dtype request
/// returns a deep copy.
///
/// Numeric rules: float to int rounds half away from zero and saturates
/// (NaN becomes 0), narrowing int conversions saturate, uint8 targets clamp
/// to [0, 255], any numeric source maps to bool as `value != 0`, and
/// float16 is reached through the exact binary16 codec. Bool converts to
/// nothing but bool.
pub fn convert_value(source: &TensorValue, target: TensorType) -> Result<TensorValue, BridgeError> {
    if source.dtype() == target {
        return Ok(source.clone());
    }

    let view = numeric_view(source.buffer()).ok_or_else(|| {
        BridgeError::UnsupportedConversion(format!(
            "no conversion from {} to {target}",
            source.dtype()
        ))
    })?;

    let buffer = match target {
        TensorType::Float32 => TensorBuffer::Float32(view.to_f32()),
        TensorType::Float16 => {
            TensorBuffer::Float16(view.to_f32().into_iter().map(f32_to_f16).collect())
        }
        TensorType::Int32 => TensorBuffer::Int32(view.to_i32()),
        TensorType::Int64 => TensorBuffer::Int64(view.to_i64()),
        TensorType::Uint8 => TensorBuffer::Uint8(view.to_u8()),
        TensorType::Bool => TensorBuffer::Bool(view.to_bool()),
    };

    Ok(TensorValue::new(buffer, source.shape().to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_round_half_away_from_zero() {
        assert_eq!(saturating_round::<i32>(3.7), 4);
        assert_eq!(saturating_round::<i32>(3.5), 4);
        assert_eq!(saturating_round::<i32>(3.2), 3);
        assert_eq!(saturating_round::<i32>(-3.5), -4);
        assert_eq!(saturating_round::<i32>(-3.7), -4);
        assert_eq!(saturating_round::<i32>(2.5), 3);
        assert_eq!(saturating_round::<i32>(-2.5), -3);
    }

    #[test]
    fn test_saturating_round_out_of_range() {
        assert_eq!(saturating_round::<i32>(1.0e30), i32::MAX);
        assert_eq!(saturating_round::<i32>(-1.0e30), i32::MIN);
        assert_eq!(saturating_round::<i64>(1.0e30), i64::MAX);
        assert_eq!(saturating_round::<u8>(300.0), 255);
        assert_eq!(saturating_round::<u8>(-5.0), 0);
        assert_eq!(saturating_round::<i32>(f64::INFINITY), i32::MAX);
        assert_eq!(saturating_round::<i32>(f64::NEG_INFINITY), i32::MIN);
    }

    #[test]
    fn test_saturating_round_nan_is_zero() {
        assert_eq!(saturating_round::<i32>(f64::NAN), 0);
        assert_eq!(saturating_round::<u8>(f64::NAN), 0);
        assert_eq!(saturating_round::<i64>(f64::NAN), 0);
    }

    #[test]
    fn test_int_clamps() {
        assert_eq!(clamp_to_i32(i64::MAX), i32::MAX);
        assert_eq!(clamp_to_i32(i64::MIN), i32::MIN);
        assert_eq!(clamp_to_i32(-7), -7);
        assert_eq!(clamp_to_u8(-1), 0);
        assert_eq!(clamp_to_u8(256), 255);
        assert_eq!(clamp_to_u8(200), 200);
    }
}
