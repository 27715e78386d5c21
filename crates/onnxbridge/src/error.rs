use onnxbridge_base::TensorError;
use std::fmt;

#[derive(Debug)]
pub enum BridgeError {
    Argument(String),
    SessionNotFound(String),
    TensorNotFound(String),
    ShapeMismatch(String),
    UnsupportedType(String),
    UnsupportedConversion(String),
    ModelLoad(String),
    ProviderConfig(String),
    Engine(String),
    Inference(String),
    Generic(String),
}

impl BridgeError {
    /// Stable code reported to the host alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Argument(_) => "INVALID_ARG",
            BridgeError::SessionNotFound(_) => "INVALID_SESSION",
            BridgeError::TensorNotFound(_) => "NOT_FOUND",
            BridgeError::ShapeMismatch(_) => "SHAPE_MISMATCH",
            BridgeError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            BridgeError::UnsupportedConversion(_) => "UNSUPPORTED_CONVERSION",
            BridgeError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            BridgeError::ProviderConfig(_) => "PROVIDER_CONFIG_ERROR",
            BridgeError::Engine(_) => "ENGINE_ERROR",
            BridgeError::Inference(_) => "INFERENCE_FAILED",
            BridgeError::Generic(_) => "GENERIC_ERROR",
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Argument(msg) => write!(f, "invalid argument: {msg}"),
            BridgeError::SessionNotFound(id) => write!(f, "session not found: {id}"),
            BridgeError::TensorNotFound(id) => write!(f, "tensor not found: {id}"),
            BridgeError::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            BridgeError::UnsupportedType(msg) => write!(f, "unsupported type: {msg}"),
            BridgeError::UnsupportedConversion(msg) => {
                write!(f, "unsupported conversion: {msg}")
            }
            BridgeError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            BridgeError::ProviderConfig(msg) => {
                write!(f, "provider configuration error: {msg}")
            }
            BridgeError::Engine(msg) => write!(f, "engine error: {msg}"),
            BridgeError::Inference(msg) => write!(f, "inference failed: {msg}"),
            BridgeError::Generic(msg) => write!(f, "error: {msg}"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<TensorError> for BridgeError {
    fn from(err: TensorError) -> Self {
        BridgeError::ShapeMismatch(err.to_string())
    }
}
