use crate::engine::{Engine, EngineSession, IoNodeInfo, SessionMetadata};
use crate::error::BridgeError;
use crate::options::{RunOptions, SessionOptions};
use onnxbridge_base::{TensorBuffer, TensorValue};
use ort::session::{RunOptions as OrtRunOptions, Session as OrtSession};
use ort::tensor::TensorElementType;
use ort::value::{DynValue, SessionInputValue, Tensor, ValueType};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

/// Engine backed by ONNX Runtime through the `ort` crate.
pub struct OnnxEngine;

impl OnnxEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OnnxEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for OnnxEngine {
    fn name(&self) -> &str {
        "onnxruntime"
    }

    fn available_providers(&self) -> Vec<String> {
        let mut providers = Vec::new();
        #[cfg(feature = "cuda")]
        {
            use ort::ep::ExecutionProvider;
            use ort::execution_providers::CUDAExecutionProvider;
            if CUDAExecutionProvider::default()
                .is_available()
                .unwrap_or(false)
            {
                providers.push("CUDAExecutionProvider".to_string());
            }
        }
        providers.push("CPUExecutionProvider".to_string());
        providers
    }

    fn load_model(
        &self,
        path: &Path,
        options: &SessionOptions,
    ) -> Result<Box<dyn EngineSession>, BridgeError> {
        let mut builder = OrtSession::builder().map_err(|e| {
            BridgeError::Engine(format!("failed to create session builder: {e}"))
        })?;

        if let Some(threads) = options.intra_op_threads {
            builder = builder.with_intra_threads(threads).map_err(|e| {
                BridgeError::Engine(format!("failed to set intra-op threads: {e}"))
            })?;
        }
        if let Some(threads) = options.inter_op_threads {
            builder = builder.with_inter_threads(threads).map_err(|e| {
                BridgeError::Engine(format!("failed to set inter-op threads: {e}"))
            })?;
        }

        for provider in &options.execution_providers {
            builder = match provider.as_str() {
                // CPU is the implicit fallback, nothing to register
                "CPUExecutionProvider" => builder,
                #[cfg(feature = "cuda")]
                "CUDAExecutionProvider" => {
                    use ort::ep::ExecutionProvider;
                    use ort::execution_providers::CUDAExecutionProvider;
                    let device_id = options.device_id.unwrap_or(0);
                    let ep = CUDAExecutionProvider::default().with_device_id(device_id);
                    let available = ep.is_available().unwrap_or(false);
                    log::info!(
                        "CUDA execution provider requested (device_id={device_id}), available: {available}"
                    );
                    builder.with_execution_providers([ep.build()]).map_err(|e| {
                        BridgeError::ProviderConfig(format!(
                            "failed to register CUDA execution provider: {e}"
                        ))
                    })?
                }
                other => {
                    return Err(BridgeError::ProviderConfig(format!(
                        "unsupported execution provider: {other}"
                    )));
                }
            };
        }

        let session = builder.commit_from_file(path).map_err(|e| {
            BridgeError::ModelLoad(format!(
                "failed to load model from {}: {e}",
                path.display()
            ))
        })?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();

        Ok(Box::new(OnnxSession {
            session,
            input_names,
            output_names,
        }))
    }
}

struct OnnxSession {
    session: OrtSession,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl EngineSession for OnnxSession {
    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn input_info(&self) -> Vec<IoNodeInfo> {
        self.session
            .inputs()
            .iter()
            .map(|input| node_info(input.name(), input.input_type()))
            .collect()
    }

    fn output_info(&self) -> Vec<IoNodeInfo> {
        self.session
            .outputs()
            .iter()
            .map(|output| node_info(output.name(), output.output_type()))
            .collect()
    }

    fn metadata(&self) -> Result<SessionMetadata, BridgeError> {
        let meta = self.session.metadata().map_err(|e| {
            BridgeError::Engine(format!("failed to read model metadata: {e}"))
        })?;

        let mut custom_metadata_map = HashMap::new();
        if let Ok(keys) = meta.custom_keys() {
            for key in keys {
                if let Ok(Some(value)) = meta.custom(&key) {
                    custom_metadata_map.insert(key, value);
                }
            }
        }

        Ok(SessionMetadata {
            producer_name: meta.producer().unwrap_or_default(),
            graph_name: meta.name().unwrap_or_default(),
            domain: meta.domain().unwrap_or_default(),
            description: meta.description().unwrap_or_default(),
            version: meta.version().unwrap_or(0),
            custom_metadata_map,
        })
    }

    fn run(
        &mut self,
        inputs: Vec<(String, TensorValue)>,
        output_names: &[String],
        options: &RunOptions,
    ) -> Result<Vec<(String, TensorValue)>, BridgeError> {
        for (name, _) in &inputs {
            if !self.input_names.contains(name) {
                return Err(BridgeError::Inference(format!(
                    "unknown input '{name}', model declares {:?}",
                    self.input_names
                )));
            }
        }

        let mut session_inputs: Vec<(Cow<'static, str>, SessionInputValue<'static>)> =
            Vec::with_capacity(inputs.len());
        for (name, value) in inputs {
            let ort_value = to_ort_value(&name, value)?;
            session_inputs.push((Cow::Owned(name), SessionInputValue::Owned(ort_value)));
        }

        let run_options = OrtRunOptions::new().map_err(|e| {
            BridgeError::Inference(format!("failed to create run options: {e}"))
        })?;
        if options.terminate {
            run_options.terminate().map_err(|e| {
                BridgeError::Inference(format!("failed to set terminate flag: {e}"))
            })?;
        }
        // ort's run options expose termination only; per-run log levels
        // have no setter to forward to
        if options.log_severity_level.is_some() || options.log_verbosity_level.is_some() {
            log::debug!("per-run log level overrides are not forwarded to onnxruntime");
        }

        let outputs = self
            .session
            .run_with_options(session_inputs, &run_options)
            .map_err(|e| BridgeError::Inference(format!("inference failed: {e}")))?;

        let mut result = Vec::with_capacity(output_names.len());
        for name in output_names {
            let value = &outputs[name.as_str()];
            result.push((name.clone(), from_ort_value(name, value)?));
        }
        Ok(result)
    }
}

fn node_info(name: &str, value_type: &ValueType) -> IoNodeInfo {
    match value_type {
        ValueType::Tensor { ty, shape, .. } => IoNodeInfo {
            name: name.to_string(),
            dtype: element_type_name(ty).to_string(),
            shape: shape.to_vec(),
        },
        // Sequences, maps, and optionals are reported but not runnable here
        _ => IoNodeInfo {
            name: name.to_string(),
            dtype: "non-tensor".to_string(),
            shape: Vec::new(),
        },
    }
}

fn element_type_name(ty: &TensorElementType) -> &'static str {
    match ty {
        TensorElementType::Float32 => "float32",
        TensorElementType::Float16 => "float16",
        TensorElementType::Int32 => "int32",
        TensorElementType::Int64 => "int64",
        TensorElementType::Uint8 => "uint8",
        TensorElementType::Bool => "bool",
        TensorElementType::Float64 => "double",
        TensorElementType::Int8 => "int8",
        TensorElementType::Int16 => "int16",
        TensorElementType::Uint16 => "uint16",
        TensorElementType::Uint32 => "uint32",
        TensorElementType::Uint64 => "uint64",
        TensorElementType::String => "string",
        TensorElementType::Bfloat16 => "bfloat16",
        _ => "unknown",
    }
}

fn to_ort_value(name: &str, value: TensorValue) -> Result<DynValue, BridgeError> {
    let shape: Vec<usize> = value.shape().iter().map(|&d| d as usize).collect();
    let input_error = |e: ort::Error| {
        BridgeError::Inference(format!("failed to build input tensor '{name}': {e}"))
    };

    let dyn_value = match value.into_buffer() {
        TensorBuffer::Float32(data) => Tensor::from_array((shape, data))
            .map_err(input_error)?
            .into_dyn(),
        TensorBuffer::Float16(data) => {
            let data: Vec<half::f16> = data.into_iter().map(half::f16::from_bits).collect();
            Tensor::from_array((shape, data))
                .map_err(input_error)?
                .into_dyn()
        }
        TensorBuffer::Int32(data) => Tensor::from_array((shape, data))
            .map_err(input_error)?
            .into_dyn(),
        TensorBuffer::Int64(data) => Tensor::from_array((shape, data))
            .map_err(input_error)?
            .into_dyn(),
        TensorBuffer::Uint8(data) => Tensor::from_array((shape, data))
            .map_err(input_error)?
            .into_dyn(),
        TensorBuffer::Bool(data) => Tensor::from_array((shape, data))
            .map_err(input_error)?
            .into_dyn(),
    };
    Ok(dyn_value)
}

fn from_ort_value(name: &str, value: &DynValue) -> Result<TensorValue, BridgeError> {
    let wrap = |buffer: TensorBuffer, shape: Vec<i64>| {
        TensorValue::new(buffer, shape)
            .map_err(|e| BridgeError::Engine(format!("output '{name}': {e}")))
    };

    if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
        return wrap(TensorBuffer::Float32(data.to_vec()), shape.to_vec());
    }
    if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
        return wrap(TensorBuffer::Int64(data.to_vec()), shape.to_vec());
    }
    if let Ok((shape, data)) = value.try_extract_tensor::<i32>() {
        return wrap(TensorBuffer::Int32(data.to_vec()), shape.to_vec());
    }
    if let Ok((shape, data)) = value.try_extract_tensor::<u8>() {
        return wrap(TensorBuffer::Uint8(data.to_vec()), shape.to_vec());
    }
    if let Ok((shape, data)) = value.try_extract_tensor::<bool>() {
        return wrap(TensorBuffer::Bool(data.to_vec()), shape.to_vec());
    }
    if let Ok((shape, data)) = value.try_extract_tensor::<half::f16>() {
        let bits: Vec<u16> = data.iter().map(|x| x.to_bits()).collect();
        return wrap(TensorBuffer::Float16(bits), shape.to_vec());
    }

    Err(BridgeError::UnsupportedType(format!(
        "output '{name}' has unsupported element type {:?}",
        value.dtype()
    )))
}
