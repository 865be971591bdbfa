//! Super-admin profile editing with avatar upload.

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::auth::{AuthContext, UpdateError};
use crate::config::CollectionsConfig;
use crate::models::{Role, Session};
use crate::storage::ObjectStorage;
use crate::store::DocumentStore;

/// A new avatar image, base64 encoded.
#[derive(Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUpload {
    pub file_name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub data: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Submitted profile form. Absent fields are left as they are; a blank
/// password means "keep the current one".
#[derive(Deserialize, JsonSchema, Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

impl ProfileUpdate {
    fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(email) = &self.email {
            fields.insert("email".to_string(), Value::String(email.clone()));
        }
        if let Some(password) = self.password.as_ref().filter(|p| !p.trim().is_empty()) {
            fields.insert("password".to_string(), Value::String(password.clone()));
        }
        fields
    }
}

/// Keeps `[A-Za-z0-9._-]` and replaces everything else with `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "avatar".to_string()
    } else {
        cleaned
    }
}

pub fn avatar_path(collection: &str, session_id: &str, millis: i64, file_name: &str) -> String {
    format!(
        "{}/{}/profile_{}_{}",
        collection,
        session_id,
        millis,
        sanitize_file_name(file_name)
    )
}

pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    collections: CollectionsConfig,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        collections: CollectionsConfig,
    ) -> Self {
        ProfileService {
            store,
            storage,
            collections,
        }
    }

    /// Applies `update` to the signed-in super admin: uploads the avatar,
    /// writes the remote record, then refreshes the local session.
    /// Nothing is retried; the first failure is returned. The local session is
    /// only refreshed if it still belongs to the admin the edit started from.
    pub async fn update_profile(
        &self,
        context: &AuthContext,
        update: ProfileUpdate,
    ) -> Result<Session, UpdateError> {
        let session = context
            .session()
            .filter(|s| s.role == Role::Super)
            .ok_or_else(|| UpdateError::UpdateFailed("No super-admin session".to_string()))?;

        let mut fields = update.fields();

        if let Some(avatar) = &update.avatar {
            let url = self.upload_avatar(&session.id, avatar).await?;
            fields.insert("imageUrl".to_string(), Value::String(url));
        }

        if fields.is_empty() {
            debug!("Profile update for '{}' has no changes", session.id);
            return context.update_session(&session.id, &fields);
        }

        self.store
            .update(&self.collections.super_admins, &session.id, &fields)
            .await
            .map_err(|e| {
                warn!("Could not update profile '{}': {}", session.id, e);
                UpdateError::UpdateFailed(e.to_string())
            })?;

        // Fails if a different operator signed in while the write was in flight.
        let updated = context.update_session(&session.id, &fields)?;
        info!("Updated profile of super admin '{}'", session.id);
        Ok(updated)
    }

    async fn upload_avatar(
        &self,
        session_id: &str,
        avatar: &AvatarUpload,
    ) -> Result<String, UpdateError> {
        let data = general_purpose::STANDARD
            .decode(avatar.data.trim())
            .map_err(|e| UpdateError::UpdateFailed(format!("Invalid avatar data: {}", e)))?;

        let path = avatar_path(
            &self.collections.super_admins,
            session_id,
            chrono::Utc::now().timestamp_millis(),
            &avatar.file_name,
        );
        debug!(
            "Uploading {} byte avatar to {} via {}",
            data.len(),
            path,
            self.storage.get_name()
        );

        self.storage
            .upload(data, &avatar.content_type, &path)
            .await
            .map_err(|e| {
                warn!("Avatar upload for '{}' failed: {}", session_id, e);
                UpdateError::UpdateFailed(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthService;
    use crate::models::Document;
    use crate::session_store::{MemorySessionStore, SessionStore};
    use crate::storage::{LocalObjectStorage, LocalStorageConfig};
    use crate::store::{MemoryStore, Query, SnapshotStream, StoreError};
    use serde_json::json;
    use std::path::PathBuf;
    use tokio::sync::Notify;

    struct Fixture {
        store: MemoryStore,
        sessions: Arc<MemorySessionStore>,
        context: AuthContext,
        profiles: ProfileService,
        root: PathBuf,
    }

    async fn fixture(role: Role) -> Fixture {
        let store = MemoryStore::new();
        store.insert(
            "superAdmins",
            Document::from_json(
                "a1",
                json!({"name": "Root", "email": "root@salon.test", "password": "pw"}),
            ),
        );
        store.insert(
            "managers",
            Document::from_json("m1", json!({"email": "lena@salon.test", "password": "pw"})),
        );
        let shared: Arc<dyn DocumentStore> = Arc::new(store.clone());

        let sessions = Arc::new(MemorySessionStore::new());
        let context = AuthContext::new(
            AuthService::new(shared.clone(), CollectionsConfig::default()),
            sessions.clone(),
        );
        context.restore();
        let email = match role {
            Role::Super => "root@salon.test",
            Role::Manager => "lena@salon.test",
        };
        context.login(role, email, "pw").await.unwrap();

        let root = std::env::temp_dir().join(format!("salondesk-profile-{}", uuid::Uuid::new_v4()));
        let storage = LocalObjectStorage::new(&LocalStorageConfig {
            root: root.clone(),
            public_url: "http://cdn.test".to_string(),
        });
        let profiles = ProfileService::new(shared, Arc::new(storage), CollectionsConfig::default());

        Fixture {
            store,
            sessions,
            context,
            profiles,
            root,
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("me.png"), "me.png");
        assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_file_name("../../etc"), ".._.._etc");
        assert_eq!(sanitize_file_name(""), "avatar");
    }

    #[test]
    fn test_avatar_path_layout() {
        assert_eq!(
            avatar_path("superAdmins", "a1", 1700000000000, "me.png"),
            "superAdmins/a1/profile_1700000000000_me.png"
        );
    }

    #[test]
    fn test_blank_password_is_ignored() {
        let update = ProfileUpdate {
            name: Some("Root".to_string()),
            password: Some("   ".to_string()),
            ..ProfileUpdate::default()
        };
        let fields = update.fields();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("password"));
    }

    #[tokio::test]
    async fn test_update_name_writes_remote_and_session() {
        let f = fixture(Role::Super).await;
        let update = ProfileUpdate {
            name: Some("Root Admin".to_string()),
            ..ProfileUpdate::default()
        };

        let echoed = f.profiles.update_profile(&f.context, update).await.unwrap();
        assert_eq!(echoed.name(), Some("Root Admin"));
        assert!(echoed.get_str("password").is_none());

        let remote = f.store.get("superAdmins", "a1").unwrap();
        assert_eq!(remote.get_str("name"), Some("Root Admin"));
        assert_eq!(f.sessions.load().unwrap().name(), Some("Root Admin"));
    }

    #[tokio::test]
    async fn test_avatar_upload_sets_image_url() {
        let f = fixture(Role::Super).await;
        let update = ProfileUpdate {
            avatar: Some(AvatarUpload {
                file_name: "me.png".to_string(),
                content_type: "image/png".to_string(),
                data: general_purpose::STANDARD.encode(b"png-bytes"),
            }),
            ..ProfileUpdate::default()
        };

        let echoed = f.profiles.update_profile(&f.context, update).await.unwrap();
        let url = echoed.image_url().unwrap().to_string();
        assert!(url.starts_with("http://cdn.test/superAdmins/a1/profile_"));
        assert!(url.ends_with("_me.png"));

        let remote = f.store.get("superAdmins", "a1").unwrap();
        assert_eq!(remote.get_str("imageUrl"), Some(url.as_str()));

        let relative = url.trim_start_matches("http://cdn.test/");
        let written = tokio::fs::read(f.root.join(relative)).await.unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_invalid_avatar_data_changes_nothing() {
        let f = fixture(Role::Super).await;
        let before = f.context.session();
        let update = ProfileUpdate {
            name: Some("Changed".to_string()),
            avatar: Some(AvatarUpload {
                file_name: "me.png".to_string(),
                content_type: "image/png".to_string(),
                data: "%%% not base64 %%%".to_string(),
            }),
            ..ProfileUpdate::default()
        };

        let result = f.profiles.update_profile(&f.context, update).await;
        assert!(matches!(result, Err(UpdateError::UpdateFailed(_))));
        assert_eq!(f.context.session(), before);
        assert_eq!(f.store.get("superAdmins", "a1").unwrap().get_str("name"), Some("Root"));
    }

    #[tokio::test]
    async fn test_manager_cannot_update_profile() {
        let f = fixture(Role::Manager).await;
        let update = ProfileUpdate {
            name: Some("Nope".to_string()),
            ..ProfileUpdate::default()
        };
        let result = f.profiles.update_profile(&f.context, update).await;
        assert!(matches!(result, Err(UpdateError::UpdateFailed(_))));
    }

    /// Holds every `update` until released, so a test can act mid-write.
    struct GatedStore {
        inner: MemoryStore,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl DocumentStore for GatedStore {
        fn get_name(&self) -> &str {
            "gated"
        }

        async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
            self.inner.query(query).await
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            fields: &Map<String, Value>,
        ) -> Result<(), StoreError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.update(collection, id, fields).await
        }

        fn watch(&self, query: Query) -> SnapshotStream {
            self.inner.watch(query)
        }
    }

    #[tokio::test]
    async fn test_session_switch_during_update_keeps_new_session() {
        let store = MemoryStore::new();
        store.insert(
            "superAdmins",
            Document::from_json(
                "a1",
                json!({"name": "Root", "email": "root@salon.test", "password": "pw"}),
            ),
        );
        store.insert(
            "superAdmins",
            Document::from_json(
                "a2",
                json!({"name": "Bob", "email": "bob@salon.test", "password": "p2"}),
            ),
        );
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let gated: Arc<dyn DocumentStore> = Arc::new(GatedStore {
            inner: store.clone(),
            entered: entered.clone(),
            release: release.clone(),
        });

        let sessions = Arc::new(MemorySessionStore::new());
        let context = Arc::new(AuthContext::new(
            AuthService::new(gated.clone(), CollectionsConfig::default()),
            sessions.clone(),
        ));
        context.restore();
        context
            .login(Role::Super, "root@salon.test", "pw")
            .await
            .unwrap();

        let root = std::env::temp_dir().join(format!("salondesk-profile-{}", uuid::Uuid::new_v4()));
        let storage = LocalObjectStorage::new(&LocalStorageConfig {
            root,
            public_url: "http://cdn.test".to_string(),
        });
        let profiles = Arc::new(ProfileService::new(
            gated,
            Arc::new(storage),
            CollectionsConfig::default(),
        ));

        let edit = {
            let context = context.clone();
            let profiles = profiles.clone();
            tokio::spawn(async move {
                let update = ProfileUpdate {
                    name: Some("Root Admin".to_string()),
                    email: Some("admin@salon.test".to_string()),
                    password: Some("new-pw".to_string()),
                    ..ProfileUpdate::default()
                };
                profiles.update_profile(&context, update).await
            })
        };

        entered.notified().await;
        context.logout();
        context
            .login(Role::Super, "bob@salon.test", "p2")
            .await
            .unwrap();
        release.notify_one();

        let result = edit.await.unwrap();
        assert!(matches!(result, Err(UpdateError::UpdateFailed(_))));

        let current = context.session().unwrap();
        assert_eq!(current.id, "a2");
        assert_eq!(current.name(), Some("Bob"));
        assert_eq!(current.get_str("password"), Some("p2"));

        let persisted = sessions.load().unwrap();
        assert_eq!(persisted.id, "a2");
        assert_eq!(persisted.name(), Some("Bob"));
        assert_eq!(persisted.get_str("email"), Some("bob@salon.test"));
    }
}
