use crate::engine::{Engine, EngineSession, IoNodeInfo, SessionMetadata};
use crate::error::BridgeError;
use crate::options::SessionOptions;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Response for a newly created session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub input_names: Vec<String>,
    pub output_names: Vec<String>,
}

/// One live session. Input/output names are cached at creation so lookups
/// skip the engine; the inner mutex serializes engine calls per session.
pub(crate) struct SessionEntry {
    pub(crate) session: Mutex<Box<dyn EngineSession>>,
    pub(crate) input_names: Vec<String>,
    pub(crate) output_names: Vec<String>,
}

/// Owns every live session, keyed by opaque id. Entries are Arc-shared so
/// closing a session mid-run only defers the drop until the run's
/// reference releases.
pub struct SessionRegistry {
    engine: Arc<dyn Engine>,
    sessions: Mutex<HashMap<String, Arc<SessionEntry>>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Load a model and register it. The engine load runs outside the
    /// registry lock.
    pub fn create_session(
        &self,
        model_path: &Path,
        options: &SessionOptions,
    ) -> Result<SessionInfo, BridgeError> {
        if !options.execution_providers.is_empty() {
            let available = self.engine.available_providers();
            for provider in &options.execution_providers {
                if !available.iter().any(|p| p == provider) {
                    return Err(BridgeError::ProviderConfig(format!(
                        "execution provider '{provider}' is not available (have: {})",
                        available.join(", ")
                    )));
                }
            }
        }

        let session = self.engine.load_model(model_path, options)?;
        let input_names = session.input_names().to_vec();
        let output_names = session.output_names().to_vec();

        let id = {
            let n = self.next_id.fetch_add(1, Ordering::Relaxed);
            format!("session_{n}")
        };
        let entry = Arc::new(SessionEntry {
            session: Mutex::new(session),
            input_names: input_names.clone(),
            output_names: output_names.clone(),
        });
        {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.insert(id.clone(), entry);
        }
        log::debug!("created session {id} from {}", model_path.display());

        Ok(SessionInfo {
            session_id: id,
            input_names,
            output_names,
        })
    }

    pub(crate) fn entry(&self, id: &str) -> Result<Arc<SessionEntry>, BridgeError> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| BridgeError::SessionNotFound(id.to_string()))
    }

    pub fn has_session(&self, id: &str) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.contains_key(id)
    }

    pub fn get_input_names(&self, id: &str) -> Result<Vec<String>, BridgeError> {
        Ok(self.entry(id)?.input_names.clone())
    }

    pub fn get_output_names(&self, id: &str) -> Result<Vec<String>, BridgeError> {
        Ok(self.entry(id)?.output_names.clone())
    }

    pub fn get_input_info(&self, id: &str) -> Result<Vec<IoNodeInfo>, BridgeError> {
        let entry = self.entry(id)?;
        let session = entry.session.lock().unwrap_or_else(|e| e.into_inner());
        Ok(session.input_info())
    }

    pub fn get_output_info(&self, id: &str) -> Result<Vec<IoNodeInfo>, BridgeError> {
        let entry = self.entry(id)?;
        let session = entry.session.lock().unwrap_or_else(|e| e.into_inner());
        Ok(session.output_info())
    }

    pub fn get_metadata(&self, id: &str) -> Result<SessionMetadata, BridgeError> {
        let entry = self.entry(id)?;
        let session = entry.session.lock().unwrap_or_else(|e| e.into_inner());
        session.metadata()
    }

    /// Remove the session. Unknown ids are a no-op, so hosts can close
    /// without checking liveness first.
    pub fn close_session(&self, id: &str) {
        let removed = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.remove(id).is_some()
        };
        if removed {
            log::debug!("closed session {id}");
        }
    }

    pub fn available_providers(&self) -> Vec<String> {
        self.engine.available_providers()
    }
}
