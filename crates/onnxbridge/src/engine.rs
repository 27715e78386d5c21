use crate::error::BridgeError;
use crate::options::{RunOptions, SessionOptions};
use onnxbridge_base::TensorValue;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Name, element type, and shape of one model input or output node. The
/// element type is a plain string because models can declare types the
/// bridge cannot create ("double", "string", "non-tensor", ...); dynamic
/// dimensions are reported as -1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IoNodeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub dtype: String,
    pub shape: Vec<i64>,
}

/// Model-level metadata reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub producer_name: String,
    pub graph_name: String,
    pub domain: String,
    pub description: String,
    pub version: i64,
    pub custom_metadata_map: HashMap<String, String>,
}

pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    /// Execution providers this engine can actually use, most preferred
    /// first.
    fn available_providers(&self) -> Vec<String>;

    fn load_model(
        &self,
        path: &Path,
        options: &SessionOptions,
    ) -> Result<Box<dyn EngineSession>, BridgeError>;
}

/// A loaded model. `run` consumes its inputs: callers hand over their own
/// copies, never shared storage.
pub trait EngineSession: Send {
    fn input_names(&self) -> &[String];
    fn output_names(&self) -> &[String];
    fn input_info(&self) -> Vec<IoNodeInfo>;
    fn output_info(&self) -> Vec<IoNodeInfo>;
    fn metadata(&self) -> Result<SessionMetadata, BridgeError>;
    fn run(
        &mut self,
        inputs: Vec<(String, TensorValue)>,
        output_names: &[String],
        options: &RunOptions,
    ) -> Result<Vec<(String, TensorValue)>, BridgeError>;
}
