use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Document, Role};

/// Profile keys that must never leave the process.
pub const SECRET_FIELDS: &[&str] = &["password"];

/// Keys owned by the session itself; a profile merge never overwrites them.
const RESERVED_FIELDS: &[&str] = &["id", "role"];

/// The authenticated identity held by the auth context and mirrored to local storage.
///
/// `role` is attached at login from the collection that was queried, never read
/// from the remote record. Every other field of the record is kept verbatim in
/// `profile`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub role: Role,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Session {
    /// Builds a session from a matched account record.
    pub fn from_document(document: Document, role: Role) -> Self {
        let mut profile = document.fields;
        for key in RESERVED_FIELDS {
            profile.remove(*key);
        }
        Session {
            id: document.id,
            role,
            profile,
        }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.profile.get(field).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    pub fn image_url(&self) -> Option<&str> {
        self.get_str("imageUrl")
    }

    /// Tenant the session is scoped to. Only manager accounts carry one.
    pub fn salon_id(&self) -> Option<&str> {
        self.get_str("salonId").filter(|s| !s.is_empty())
    }

    /// Merges profile fields into the session, skipping `id` and `role`.
    pub fn merge(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            self.profile.insert(key.clone(), value.clone());
        }
    }

    /// Copy of the session with secret fields stripped, for anything echoed to a client.
    pub fn redacted(&self) -> Session {
        let mut copy = self.clone();
        for key in SECRET_FIELDS {
            copy.profile.remove(*key);
        }
        copy
    }
}
