pub mod stub;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use stub::StubEngine;

#[cfg(feature = "onnx")]
pub use onnx::OnnxEngine;
