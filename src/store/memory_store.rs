use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;

use super::base::{DocumentStore, SnapshotStream, StoreError};
use super::query::Query;
use crate::models::Document;

/// Seed data for the in-memory backend: collection path -> documents.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
pub struct MemoryStoreConfig {
    #[serde(default)]
    pub collections: HashMap<String, Vec<Document>>,
}

struct Inner {
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
    revision: watch::Sender<u64>,
}

impl Inner {
    fn run(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::Backend(format!("memory store lock poisoned: {}", e)))?;

        let mut result: Vec<Document> = collections
            .iter()
            .filter(|(path, _)| query.scope.matches(path))
            .flat_map(|(_, docs)| docs.iter())
            .filter(|doc| query.accepts(doc))
            .cloned()
            .collect();
        query.arrange(&mut result);
        Ok(result)
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

/// A document store held entirely in process memory.
///
/// Every write bumps a revision counter; live queries re-run on each bump and
/// emit the full result again.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        MemoryStore {
            inner: Arc::new(Inner {
                collections: RwLock::new(BTreeMap::new()),
                revision,
            }),
        }
    }

    pub fn from_config(config: &MemoryStoreConfig) -> Self {
        let store = MemoryStore::new();
        for (path, documents) in &config.collections {
            for document in documents {
                store.insert(path, document.clone());
            }
        }
        store
    }

    /// Inserts a document, replacing any document with the same id in that collection.
    pub fn insert(&self, collection: &str, document: Document) {
        {
            let mut collections = match self.inner.collections.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let docs = collections.entry(collection.to_string()).or_default();
            match docs.iter_mut().find(|d| d.id == document.id) {
                Some(existing) => *existing = document,
                None => docs.push(document),
            }
        }
        self.inner.bump();
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let collections = self.inner.collections.read().ok()?;
        collections
            .get(collection)?
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn get_name(&self) -> &str {
        "memory"
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.run(query)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|e| StoreError::Backend(format!("memory store lock poisoned: {}", e)))?;
            let document = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            document.merge(fields);
        }
        debug!("Updated document '{}' in '{}'", id, collection);
        self.inner.bump();
        Ok(())
    }

    fn watch(&self, query: Query) -> SnapshotStream {
        let inner = self.inner.clone();
        let mut revision = inner.revision.subscribe();
        // The first poll emits the current result without waiting for a change.
        revision.borrow_and_update();

        stream::unfold(
            (inner, revision, query, true, false),
            |(inner, mut revision, query, first, done)| async move {
                if done {
                    return None;
                }
                if !first && revision.changed().await.is_err() {
                    return None;
                }
                let result = inner.run(&query);
                let failed = result.is_err();
                Some((result, (inner, revision, query, false, failed)))
            },
        )
        .boxed()
    }
}
