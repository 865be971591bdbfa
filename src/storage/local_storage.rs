use std::path::PathBuf;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{join_url, validate_path, ObjectStorage, StorageError};

/// Uploads land in a local directory that is served at `public_url`.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct LocalStorageConfig {
    pub root: PathBuf,
    pub public_url: String,
}

pub struct LocalObjectStorage {
    config: LocalStorageConfig,
}

impl LocalObjectStorage {
    pub fn new(config: &LocalStorageConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    fn get_name(&self) -> &str {
        "local"
    }

    async fn upload(
        &self,
        data: Vec<u8>,
        _content_type: &str,
        path: &str,
    ) -> Result<String, StorageError> {
        validate_path(path)?;
        let target = self.config.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &data).await?;
        debug!("Stored {} bytes at {}", data.len(), target.display());
        Ok(join_url(&self.config.public_url, path))
    }
}
