use serde::{Deserialize, Serialize};

/// Session construction knobs supplied by the host. Absent keys keep the
/// engine's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    pub intra_op_threads: Option<usize>,
    pub inter_op_threads: Option<usize>,
    pub device_id: Option<i32>,
    pub execution_providers: Vec<String>,
}

/// Per-call inference knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunOptions {
    pub log_severity_level: Option<i32>,
    pub log_verbosity_level: Option<i32>,
    pub terminate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_options_from_camel_case_json() {
        let options: SessionOptions = serde_json::from_str(
            r#"{"intraOpThreads": 2, "deviceId": 1, "executionProviders": ["CPUExecutionProvider"]}"#,
        )
        .unwrap();
        assert_eq!(options.intra_op_threads, Some(2));
        assert_eq!(options.inter_op_threads, None);
        assert_eq!(options.device_id, Some(1));
        assert_eq!(
            options.execution_providers,
            vec!["CPUExecutionProvider".to_string()]
        );
    }

    #[test]
    fn test_session_options_all_keys_optional() {
        let options: SessionOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SessionOptions::default());
    }

    #[test]
    fn test_run_options_from_camel_case_json() {
        let options: RunOptions =
            serde_json::from_str(r#"{"logSeverityLevel": 2, "terminate": true}"#).unwrap();
        assert_eq!(options.log_severity_level, Some(2));
        assert_eq!(options.log_verbosity_level, None);
        assert!(options.terminate);

        let defaults: RunOptions = serde_json::from_str("{}").unwrap();
        assert!(!defaults.terminate);
    }
}
