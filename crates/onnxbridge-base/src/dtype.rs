use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a tensor crossing the bridge. The lowercase string form
/// is the spelling hosts see on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorType {
    Float32,
    Float16,
    Int32,
    Int64,
    Uint8,
    Bool,
}

impl TensorType {
    pub const ALL: [TensorType; 6] = [
        TensorType::Float32,
        TensorType::Float16,
        TensorType::Int32,
        TensorType::Int64,
        TensorType::Uint8,
        TensorType::Bool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TensorType::Float32 => "float32",
            TensorType::Float16 => "float16",
            TensorType::Int32 => "int32",
            TensorType::Int64 => "int64",
            TensorType::Uint8 => "uint8",
            TensorType::Bool => "bool",
        }
    }

    pub fn from_str(s: &str) -> Option<TensorType> {
        match s {
            "float32" => Some(TensorType::Float32),
            "float16" => Some(TensorType::Float16),
            "int32" => Some(TensorType::Int32),
            "int64" => Some(TensorType::Int64),
            "uint8" => Some(TensorType::Uint8),
            "bool" => Some(TensorType::Bool),
            _ => None,
        }
    }

    /// Width of one element in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            TensorType::Float32 => 4,
            TensorType::Float16 => 2,
            TensorType::Int32 => 4,
            TensorType::Int64 => 8,
            TensorType::Uint8 => 1,
            TensorType::Bool => 1,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, TensorType::Float32 | TensorType::Float16)
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip() {
        for dtype in TensorType::ALL {
            assert_eq!(TensorType::from_str(dtype.as_str()), Some(dtype));
        }
        assert_eq!(TensorType::from_str("double"), None);
        assert_eq!(TensorType::from_str("Float32"), None);
    }

    #[test]
    fn test_byte_sizes() {
        assert_eq!(TensorType::Float32.byte_size(), 4);
        assert_eq!(TensorType::Float16.byte_size(), 2);
        assert_eq!(TensorType::Int32.byte_size(), 4);
        assert_eq!(TensorType::Int64.byte_size(), 8);
        assert_eq!(TensorType::Uint8.byte_size(), 1);
        assert_eq!(TensorType::Bool.byte_size(), 1);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(TensorType::Float16.to_string(), "float16");
        assert_eq!(format!("{}", TensorType::Bool), "bool");
    }

    #[test]
    fn test_is_float() {
        assert!(TensorType::Float32.is_float());
        assert!(TensorType::Float16.is_float());
        assert!(!TensorType::Int64.is_float());
        assert!(!TensorType::Bool.is_float());
    }
}
