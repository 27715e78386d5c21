#![cfg(feature = "onnx")]

use onnxbridge::{BridgeContext, BridgeError, SessionOptions};
use std::path::Path;

#[test]
fn test_cpu_provider_is_always_available() {
    let context = BridgeContext::onnx();
    let providers = context.available_providers();
    assert!(providers.iter().any(|p| p == "CPUExecutionProvider"));
}

#[test]
fn test_missing_model_file_fails_to_load() {
    let context = BridgeContext::onnx();
    let err = context
        .sessions()
        .create_session(Path::new("/nonexistent/model.onnx"), &SessionOptions::default())
        .unwrap_err();
    assert!(matches!(err, BridgeError::ModelLoad(_)));
    assert_eq!(err.code(), "MODEL_LOAD_ERROR");
}

#[test]
fn test_unknown_provider_is_rejected_before_load() {
    let context = BridgeContext::onnx();
    let options = SessionOptions {
        execution_providers: vec!["TPUExecutionProvider".to_string()],
        ..SessionOptions::default()
    };
    // Provider validation fires before the file is touched
    let err = context
        .sessions()
        .create_session(Path::new("/nonexistent/model.onnx"), &options)
        .unwrap_err();
    assert!(matches!(err, BridgeError::ProviderConfig(_)));
    assert_eq!(err.code(), "PROVIDER_CONFIG_ERROR");
}
