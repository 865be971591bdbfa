use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::{file_store::FileSessionStore, memory_store::MemorySessionStore};
use crate::config::SessionStoreConfig;
use crate::models::Session;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session could not be serialized: {0}")]
    Serialize(serde_json::Error),
    /// The persisted value exists but is not a valid session. Recovered inside
    /// `load` by clearing the storage; never surfaced to the operator.
    #[error("persisted session is malformed: {0}")]
    MalformedSession(serde_json::Error),
}

/// Durable local storage for the single current session.
///
/// The stored record is a pure mirror of the auth context's session and is
/// replaced wholesale on every write.
pub trait SessionStore: Send + Sync {
    /// Returns the persisted session. A value that fails to parse is cleared
    /// and reported as absent.
    fn load(&self) -> Option<Session>;

    /// Overwrites the stored record.
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Removes the stored record. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

pub(crate) fn encode_session(session: &Session) -> Result<String, SessionStoreError> {
    serde_json::to_string(session).map_err(SessionStoreError::Serialize)
}

pub(crate) fn decode_session(raw: &str) -> Result<Session, SessionStoreError> {
    serde_json::from_str(raw).map_err(SessionStoreError::MalformedSession)
}

/// Creates the configured session store.
pub fn create_session_store(config: &SessionStoreConfig) -> Arc<dyn SessionStore> {
    match config {
        SessionStoreConfig::File(file_config) => {
            info!("Persisting session to {}", file_config.path.display());
            Arc::new(FileSessionStore::new(&file_config.path))
        }
        SessionStoreConfig::Memory => {
            info!("Session persistence is in-memory only.");
            Arc::new(MemorySessionStore::new())
        }
    }
}
