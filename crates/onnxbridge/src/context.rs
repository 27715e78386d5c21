use crate::dispatcher::InferenceDispatcher;
use crate::engine::Engine;
use crate::error::BridgeError;
use crate::options::RunOptions;
use crate::sessionregistry::SessionRegistry;
use crate::tensorregistry::{TensorInfo, TensorRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// Application context owning one engine and the two handle registries.
/// Independent contexts are fully isolated from each other.
pub struct BridgeContext {
    engine: Arc<dyn Engine>,
    sessions: SessionRegistry,
    tensors: TensorRegistry,
}

impl BridgeContext {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        log::info!("bridge engine: {}", engine.name());
        Self {
            sessions: SessionRegistry::new(engine.clone()),
            tensors: TensorRegistry::new(),
            engine,
        }
    }

    /// Context backed by the in-process stub engine.
    pub fn stub() -> Self {
        Self::new(Arc::new(crate::engines::StubEngine::new()))
    }

    /// Context backed by ONNX Runtime.
    #[cfg(feature = "onnx")]
    pub fn onnx() -> Self {
        Self::new(Arc::new(crate::engines::OnnxEngine::new()))
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn tensors(&self) -> &TensorRegistry {
        &self.tensors
    }

    pub fn available_providers(&self) -> Vec<String> {
        self.engine.available_providers()
    }

    pub fn run_inference(
        &self,
        session_id: &str,
        inputs: &HashMap<String, String>,
        options: &RunOptions,
    ) -> Result<HashMap<String, TensorInfo>, BridgeError> {
        InferenceDispatcher::new(&self.sessions, &self.tensors).run(session_id, inputs, options)
    }
}
