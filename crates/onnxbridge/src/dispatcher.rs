use crate::error::BridgeError;
use crate::options::RunOptions;
use crate::sessionregistry::SessionRegistry;
use crate::tensorregistry::{TensorInfo, TensorRegistry};
use onnxbridge_base::TensorValue;
use std::collections::HashMap;

/// Drives one inference call across the two registries: resolves named
/// input tensors, runs the session, and registers the outputs.
pub struct InferenceDispatcher<'a> {
    sessions: &'a SessionRegistry,
    tensors: &'a TensorRegistry,
}

impl<'a> InferenceDispatcher<'a> {
    pub fn new(sessions: &'a SessionRegistry, tensors: &'a TensorRegistry) -> Self {
        Self { sessions, tensors }
    }

    /// Run `session_id` with the tensors named in `named_inputs`
    /// (input name to tensor id). Outputs are registered as new tensors
    /// only after the whole run succeeds.
    pub fn run(
        &self,
        session_id: &str,
        named_inputs: &HashMap<String, String>,
        options: &RunOptions,
    ) -> Result<HashMap<String, TensorInfo>, BridgeError> {
        let entry = self.sessions.entry(session_id)?;

        // Inputs are resolved in the model's declared order. Declared names
        // the host did not supply are omitted; the engine reports missing
        // required inputs itself. Map entries matching no declared input
        // are ignored. Each resolved tensor is cloned because the engine
        // run takes ownership of its inputs.
        let mut inputs: Vec<(String, TensorValue)> = Vec::new();
        for name in &entry.input_names {
            if let Some(tensor_id) = named_inputs.get(name) {
                let value = self.tensors.clone_tensor(tensor_id)?;
                inputs.push((name.clone(), value));
            }
        }

        if inputs.is_empty() {
            log::debug!("run on {session_id}: no declared inputs supplied, skipping engine call");
            return Ok(HashMap::new());
        }

        let raw_outputs = {
            let mut session = entry.session.lock().unwrap_or_else(|e| e.into_inner());
            session.run(inputs, &entry.output_names, options)?
        };

        let mut outputs = HashMap::with_capacity(raw_outputs.len());
        for (name, value) in raw_outputs {
            outputs.insert(name, self.tensors.store_tensor(value));
        }
        Ok(outputs)
    }
}
