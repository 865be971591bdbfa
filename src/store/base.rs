use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use super::{memory_store::MemoryStore, mongodb_store::MongoDBStore, query::Query};
use crate::config::RemoteConfig;
use crate::models::Document;

/// Failures of the remote document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store backend error: {0}")]
    Backend(String),
    #[error("document '{id}' not found in '{collection}'")]
    NotFound { collection: String, id: String },
    #[error("invalid document value: {0}")]
    InvalidValue(String),
}

/// Whole result sets, one per remote change. The first item is the current result.
pub type SnapshotStream = BoxStream<'static, Result<Vec<Document>, StoreError>>;

/// The Store trait abstracts the hosted document database: filtered reads,
/// field updates and live queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// A descriptive name for logs.
    fn get_name(&self) -> &str;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Merges `fields` into the document `id` of `collection`.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Opens a live query. The stream never restarts; it ends after yielding a backend error.
    fn watch(&self, query: Query) -> SnapshotStream;
}

/// Creates the configured document store backend.
pub async fn create_store(config: &RemoteConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config {
        RemoteConfig::MongoDB(mongo_config) => {
            let store = MongoDBStore::new(mongo_config).await?;
            info!("Successfully created MongoDB document store.");
            Ok(Arc::new(store))
        }
        RemoteConfig::Memory(memory_config) => {
            let store = MemoryStore::from_config(memory_config);
            info!(
                "Using in-memory document store with {} seeded collections.",
                memory_config.collections.len()
            );
            Ok(Arc::new(store))
        }
    }
}
