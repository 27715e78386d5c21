//! In-process engine used by tests and development builds.
//!
//! A "model" is a JSON manifest describing inputs, outputs, and metadata.
//! Each output either echoes a named input (so the data path can be
//! observed end to end) or materializes a constant-fill tensor of its
//! declared dtype and shape, with dynamic `-1` dimensions resolved to 1.

use crate::convert::saturating_round;
use crate::engine::{Engine, EngineSession, IoNodeInfo, SessionMetadata};
use crate::error::BridgeError;
use crate::options::{RunOptions, SessionOptions};
use onnxbridge_base::{f32_to_f16, TensorBuffer, TensorType, TensorValue};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Manifest {
    producer_name: String,
    graph_name: String,
    domain: String,
    description: String,
    version: i64,
    custom_metadata_map: HashMap<String, String>,
    inputs: Vec<ManifestNode>,
    outputs: Vec<ManifestNode>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestNode {
    name: String,
    dtype: String,
    #[serde(default)]
    shape: Vec<i64>,
    #[serde(default)]
    echo: Option<String>,
    #[serde(default)]
    fill: f64,
}

pub struct StubEngine {
    providers: Vec<String>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            providers: vec!["CPUExecutionProvider".to_string()],
        }
    }

    /// Engine reporting an arbitrary provider list, for exercising
    /// provider validation.
    pub fn with_providers(providers: Vec<String>) -> Self {
        Self { providers }
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    fn available_providers(&self) -> Vec<String> {
        self.providers.clone()
    }

    fn load_model(
        &self,
        path: &Path,
        _options: &SessionOptions,
    ) -> Result<Box<dyn EngineSession>, BridgeError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::ModelLoad(format!("failed to read manifest {}: {e}", path.display()))
        })?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|e| {
            BridgeError::ModelLoad(format!("failed to parse manifest {}: {e}", path.display()))
        })?;

        // Dtypes are checked at load so a run cannot trip over a bad manifest
        for node in manifest.inputs.iter().chain(&manifest.outputs) {
            if TensorType::from_str(&node.dtype).is_none() {
                return Err(BridgeError::ModelLoad(format!(
                    "manifest node '{}' declares unsupported dtype '{}'",
                    node.name, node.dtype
                )));
            }
        }

        let input_names = manifest.inputs.iter().map(|n| n.name.clone()).collect();
        let output_names = manifest.outputs.iter().map(|n| n.name.clone()).collect();
        Ok(Box::new(StubSession {
            manifest,
            input_names,
            output_names,
        }))
    }
}

struct StubSession {
    manifest: Manifest,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

fn node_info(node: &ManifestNode) -> IoNodeInfo {
    IoNodeInfo {
        name: node.name.clone(),
        dtype: node.dtype.clone(),
        shape: node.shape.clone(),
    }
}

fn fill_value(node: &ManifestNode) -> Result<TensorValue, BridgeError> {
    let dtype = TensorType::from_str(&node.dtype).ok_or_else(|| {
        BridgeError::UnsupportedType(format!("manifest dtype '{}'", node.dtype))
    })?;

    let dims: Vec<i64> = node
        .shape
        .iter()
        .map(|&d| if d < 0 { 1 } else { d })
        .collect();
    let mut count: usize = 1;
    for &d in &dims {
        count = count.checked_mul(d as usize).ok_or_else(|| {
            BridgeError::Inference(format!("output '{}' shape overflows", node.name))
        })?;
    }

    let buffer = match dtype {
        TensorType::Float32 => TensorBuffer::Float32(vec![node.fill as f32; count]),
        TensorType::Float16 => TensorBuffer::Float16(vec![f32_to_f16(node.fill as f32); count]),
        TensorType::Int32 => TensorBuffer::Int32(vec![saturating_round(node.fill); count]),
        TensorType::Int64 => TensorBuffer::Int64(vec![saturating_round(node.fill); count]),
        TensorType::Uint8 => TensorBuffer::Uint8(vec![saturating_round(node.fill); count]),
        TensorType::Bool => TensorBuffer::Bool(vec![node.fill != 0.0; count]),
    };
    Ok(TensorValue::new(buffer, dims)?)
}

impl EngineSession for StubSession {
    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn input_info(&self) -> Vec<IoNodeInfo> {
        self.manifest.inputs.iter().map(node_info).collect()
    }

    fn output_info(&self) -> Vec<IoNodeInfo> {
        self.manifest.outputs.iter().map(node_info).collect()
    }

    fn metadata(&self) -> Result<SessionMetadata, BridgeError> {
        Ok(SessionMetadata {
            producer_name: self.manifest.producer_name.clone(),
            graph_name: self.manifest.graph_name.clone(),
            domain: self.manifest.domain.clone(),
            description: self.manifest.description.clone(),
            version: self.manifest.version,
            custom_metadata_map: self.manifest.custom_metadata_map.clone(),
        })
    }

    fn run(
        &mut self,
        inputs: Vec<(String, TensorValue)>,
        output_names: &[String],
        options: &RunOptions,
    ) -> Result<Vec<(String, TensorValue)>, BridgeError> {
        if options.terminate {
            return Err(BridgeError::Inference(
                "run terminated before execution".to_string(),
            ));
        }

        for (name, _) in &inputs {
            if !self.input_names.contains(name) {
                return Err(BridgeError::Inference(format!(
                    "unknown input '{name}', model declares {:?}",
                    self.input_names
                )));
            }
        }

        let supplied: HashMap<String, TensorValue> = inputs.into_iter().collect();
        let mut outputs = Vec::with_capacity(output_names.len());
        for name in output_names {
            let node = self
                .manifest
                .outputs
                .iter()
                .find(|n| &n.name == name)
                .ok_or_else(|| BridgeError::Inference(format!("unknown output '{name}'")))?;

            let value = match &node.echo {
                Some(source) => supplied.get(source).cloned().ok_or_else(|| {
                    BridgeError::Inference(format!(
                        "output '{name}' echoes input '{source}' which was not supplied"
                    ))
                })?,
                None => fill_value(node)?,
            };
            outputs.push((name.clone(), value));
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parses_camel_case_metadata() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "producerName": "unit",
                "graphName": "g",
                "version": 3,
                "customMetadataMap": {"k": "v"},
                "inputs": [{"name": "x", "dtype": "float32", "shape": [1, 2]}],
                "outputs": [{"name": "y", "dtype": "int32", "shape": [-1], "fill": 7.0}]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.producer_name, "unit");
        assert_eq!(manifest.graph_name, "g");
        assert_eq!(manifest.version, 3);
        assert_eq!(manifest.custom_metadata_map["k"], "v");
        assert_eq!(manifest.inputs[0].name, "x");
        assert_eq!(manifest.outputs[0].fill, 7.0);
        assert_eq!(manifest.outputs[0].echo, None);
    }

    #[test]
    fn test_fill_value_resolves_dynamic_dims() {
        let node = ManifestNode {
            name: "y".to_string(),
            dtype: "int64".to_string(),
            shape: vec![-1, 3],
            echo: None,
            fill: 2.0,
        };
        let value = fill_value(&node).unwrap();
        assert_eq!(value.shape(), &[1, 3]);
        assert_eq!(value.buffer(), &TensorBuffer::Int64(vec![2, 2, 2]));
    }

    #[test]
    fn test_fill_value_scalar_shape() {
        let node = ManifestNode {
            name: "y".to_string(),
            dtype: "bool".to_string(),
            shape: vec![],
            echo: None,
            fill: 1.0,
        };
        let value = fill_value(&node).unwrap();
        assert_eq!(value.shape(), &[] as &[i64]);
        assert_eq!(value.buffer(), &TensorBuffer::Bool(vec![true]));
    }
}
