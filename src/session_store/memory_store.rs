use std::sync::Mutex;

use tracing::warn;

use super::base::{decode_session, encode_session, SessionStore, SessionStoreError};
use crate::models::Session;

/// Session storage that lives as long as the process. Holds the serialized
/// form, so it goes through the same encode/decode path as the file store.
#[derive(Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore {
            raw: Mutex::new(None),
        }
    }

    /// A store pre-filled with an arbitrary serialized value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        MemorySessionStore {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        match self.raw.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        let mut slot = self.slot();
        let raw = slot.as_deref()?;
        match decode_session(raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding stored session: {}", e);
                *slot = None;
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let encoded = encode_session(session)?;
        *self.slot() = Some(encoded);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.slot() = None;
        Ok(())
    }
}
