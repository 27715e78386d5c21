use crate::convert::convert_value;
use crate::error::BridgeError;
use crate::hostdata::{HostTensor, TensorInput};
use onnxbridge_base::{TensorType, TensorValue};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Response triple identifying a registered tensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorInfo {
    pub tensor_id: String,
    pub dtype: TensorType,
    pub shape: Vec<i64>,
}

/// Owns every tensor crossing the bridge, keyed by opaque id. Hosts hold
/// ids only; buffers never alias host memory.
pub struct TensorRegistry {
    tensors: Mutex<HashMap<String, TensorValue>>,
    next_id: AtomicU64,
}

impl TensorRegistry {
    pub fn new() -> Self {
        Self {
            tensors: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("tensor_{n}")
    }

    /// Copy host data into a new handle-owned tensor.
    pub fn create_tensor(
        &self,
        dtype: TensorType,
        data: TensorInput,
        shape: Vec<i64>,
    ) -> Result<TensorInfo, BridgeError> {
        if shape.is_empty() {
            return Err(BridgeError::ShapeMismatch(
                "shape must not be empty".to_string(),
            ));
        }
        let buffer = data.into_buffer(dtype)?;
        let value = TensorValue::new(buffer, shape)?;
        Ok(self.store_tensor(value))
    }

    /// Register an already-owned value, e.g. an inference output.
    pub fn store_tensor(&self, value: TensorValue) -> TensorInfo {
        let id = self.allocate_id();
        let info = TensorInfo {
            tensor_id: id.clone(),
            dtype: value.dtype(),
            shape: value.shape().to_vec(),
        };
        {
            let mut tensors = self.tensors.lock().unwrap_or_else(|e| e.into_inner());
            tensors.insert(id.clone(), value);
        }
        log::debug!("registered tensor {id} ({}, shape {:?})", info.dtype, info.shape);
        info
    }

    /// Borrow the registered value under the registry lock.
    pub fn with_tensor<R>(
        &self,
        id: &str,
        f: impl FnOnce(&TensorValue) -> R,
    ) -> Result<R, BridgeError> {
        let tensors = self.tensors.lock().unwrap_or_else(|e| e.into_inner());
        match tensors.get(id) {
            Some(value) => Ok(f(value)),
            None => Err(BridgeError::TensorNotFound(id.to_string())),
        }
    }

    /// Independent deep copy, safe to hand to an engine run.
    pub fn clone_tensor(&self, id: &str) -> Result<TensorValue, BridgeError> {
        self.with_tensor(id, |value| value.clone())
    }

    pub fn get_tensor_data(&self, id: &str) -> Result<HostTensor, BridgeError> {
        self.with_tensor(id, HostTensor::from_value)
    }

    pub fn get_tensor_type(&self, id: &str) -> Result<TensorType, BridgeError> {
        self.with_tensor(id, |value| value.dtype())
    }

    pub fn get_tensor_shape(&self, id: &str) -> Result<Vec<i64>, BridgeError> {
        self.with_tensor(id, |value| value.shape().to_vec())
    }

    /// Free the handle. Returns false when the id is unknown or already
    /// released; never an error, so host-side cleanup can race safely.
    pub fn release_tensor(&self, id: &str) -> bool {
        let released = {
            let mut tensors = self.tensors.lock().unwrap_or_else(|e| e.into_inner());
            tensors.remove(id).is_some()
        };
        if released {
            log::debug!("released tensor {id}");
        }
        released
    }

    /// Convert to `target` dtype and register the result as a new handle.
    /// The source handle is left untouched.
    pub fn convert_tensor(
        &self,
        id: &str,
        target: TensorType,
    ) -> Result<TensorInfo, BridgeError> {
        // Conversion runs outside the lock on a private copy
        let source = self.clone_tensor(id)?;
        let converted = convert_value(&source, target)?;
        Ok(self.store_tensor(converted))
    }

    pub fn ids(&self) -> Vec<String> {
        let tensors = self.tensors.lock().unwrap_or_else(|e| e.into_inner());
        tensors.keys().cloned().collect()
    }
}

impl Default for TensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
