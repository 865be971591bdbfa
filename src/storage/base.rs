use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::{http_storage::HttpObjectStorage, local_storage::LocalObjectStorage};
use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object path '{0}'")]
    InvalidPath(String),
    #[error("object storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload request failed: {0}")]
    Request(String),
}

/// The object storage used for avatar images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn get_name(&self) -> &str;

    /// Stores `data` at `path` and returns the public URL of the stored object.
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        path: &str,
    ) -> Result<String, StorageError>;
}

/// Rejects empty, absolute and parent-escaping object paths.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    let escapes = path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if path.is_empty() || escapes {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Creates the configured object storage backend.
pub fn create_object_storage(config: &StorageConfig) -> Arc<dyn ObjectStorage> {
    match config {
        StorageConfig::Local(local) => {
            info!("Storing uploads under {}", local.root.display());
            Arc::new(LocalObjectStorage::new(local))
        }
        StorageConfig::Http(remote) => {
            info!("Uploading objects to {}", remote.base_url);
            Arc::new(HttpObjectStorage::new(remote))
        }
    }
}
