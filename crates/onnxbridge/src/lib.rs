pub mod context;
pub mod convert;
pub mod dispatcher;
pub mod engine;
pub mod engines;
pub mod error;
pub mod hostdata;
pub mod options;
pub mod sessionregistry;
pub mod tensorregistry;

pub use context::BridgeContext;
pub use convert::convert_value;
pub use dispatcher::InferenceDispatcher;
pub use engine::{Engine, EngineSession, IoNodeInfo, SessionMetadata};
pub use engines::StubEngine;
pub use error::BridgeError;
pub use hostdata::{HostData, HostTensor, TensorInput};
pub use options::{RunOptions, SessionOptions};
pub use sessionregistry::{SessionInfo, SessionRegistry};
pub use tensorregistry::{TensorInfo, TensorRegistry};

#[cfg(feature = "onnx")]
pub use engines::OnnxEngine;

// Re-export the foundation types hosts touch directly
pub use onnxbridge_base::{TensorBuffer, TensorError, TensorType, TensorValue};
