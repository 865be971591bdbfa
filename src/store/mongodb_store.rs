use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use mongodb::bson::{self, doc, oid::ObjectId, Bson};
use mongodb::change_stream::event::ChangeStreamEvent;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection, Database};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::base::{DocumentStore, SnapshotStream, StoreError};
use super::query::{Direction, Query};
use crate::models::Document;

/// The config struct for MongoDB connections.
/// Contains the URI and database name.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct MongoDBConfig {
    pub uri: String,
    pub database: String,
}

/// A `DocumentStore` backed by MongoDB.
///
/// Collection paths map one-to-one to MongoDB collection names. A collection
/// group is a single flat collection named after the group, with the tenant
/// kept as a field on each document.
pub struct MongoDBStore {
    database: Database,
}

type ChangeEvents = BoxStream<'static, mongodb::error::Result<ChangeStreamEvent<bson::Document>>>;

enum WatchState {
    Start(Collection<bson::Document>, Query),
    Watching(Collection<bson::Document>, Query, ChangeEvents),
    Done,
}

impl MongoDBStore {
    /// Connects to MongoDB using the given config.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB at URI: {}", config.uri);

        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to parse MongoDB URI: {}", e)))?;
        client_options.app_name = Some("SalonDesk".to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Backend(format!("Failed to create MongoDB client: {}", e)))?;

        Ok(Self {
            database: client.database(&config.database),
        })
    }

    fn collection_for(&self, query: &Query) -> Collection<bson::Document> {
        self.database.collection(query.scope.name())
    }

    /// `_id` value for an id, accepting both ObjectId hex strings and plain string ids.
    fn id_value(id: &str) -> Bson {
        match ObjectId::parse_str(id) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(id.to_string()),
        }
    }

    fn filter_document(query: &Query) -> Result<bson::Document, StoreError> {
        let mut filter = bson::Document::new();
        for f in &query.filters {
            if f.field == "id" {
                let id = f.value.as_str().ok_or_else(|| {
                    StoreError::InvalidValue(format!("id must be a string, got {}", f.value))
                })?;
                filter.insert("_id", Self::id_value(id));
                continue;
            }
            let value = bson::to_bson(&f.value)
                .map_err(|e| StoreError::InvalidValue(format!("{}: {}", f.field, e)))?;
            filter.insert(f.field.clone(), value);
        }
        Ok(filter)
    }

    fn find_options(query: &Query) -> FindOptions {
        let mut options = FindOptions::default();
        if let Some(sort) = &query.sort {
            let direction = match sort.direction {
                Direction::Ascending => 1,
                Direction::Descending => -1,
            };
            let mut sort_document = bson::Document::new();
            sort_document.insert(sort.field.clone(), direction);
            options.sort = Some(sort_document);
        }
        options.limit = query.limit.map(|l| l as i64);
        options
    }

    /// Converts a raw MongoDB document into our `Document`, lifting `_id` into `id`.
    fn from_bson(mut raw: bson::Document) -> Document {
        let id = match raw.remove("_id") {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let fields = match Bson::Document(raw).into_relaxed_extjson() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Document::new(id, fields)
    }

    async fn run(
        collection: &Collection<bson::Document>,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let filter = Self::filter_document(query)?;
        let cursor = collection
            .find(filter, Self::find_options(query))
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to run query: {}", e)))?;
        let raw: Vec<bson::Document> = cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to read documents: {}", e)))?;
        Ok(raw.into_iter().map(Self::from_bson).collect())
    }
}

#[async_trait]
impl DocumentStore for MongoDBStore {
    fn get_name(&self) -> &str {
        "mongodb"
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collection = self.collection_for(query);
        Self::run(&collection, query).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let set = bson::to_document(fields)
            .map_err(|e| StoreError::InvalidValue(format!("update fields: {}", e)))?;
        let result = self
            .database
            .collection::<bson::Document>(collection)
            .update_one(doc! { "_id": Self::id_value(id) }, doc! { "$set": set }, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to update document: {}", e)))?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        debug!("Updated document '{}' in '{}'", id, collection);
        Ok(())
    }

    fn watch(&self, query: Query) -> SnapshotStream {
        let collection = self.collection_for(&query);

        stream::unfold(WatchState::Start(collection, query), |state| async move {
            match state {
                WatchState::Start(collection, query) => {
                    // Open the change stream before the first read so no change is missed.
                    let events = match collection.watch(None, None).await {
                        Ok(events) => events.boxed(),
                        Err(e) => {
                            let err = StoreError::Backend(format!("Failed to open change stream: {}", e));
                            return Some((Err(err), WatchState::Done));
                        }
                    };
                    let result = Self::run(&collection, &query).await;
                    let next = match result {
                        Ok(_) => WatchState::Watching(collection, query, events),
                        Err(_) => WatchState::Done,
                    };
                    Some((result, next))
                }
                WatchState::Watching(collection, query, mut events) => match events.next().await {
                    Some(Ok(_event)) => {
                        let result = Self::run(&collection, &query).await;
                        let next = match result {
                            Ok(_) => WatchState::Watching(collection, query, events),
                            Err(_) => WatchState::Done,
                        };
                        Some((result, next))
                    }
                    Some(Err(e)) => {
                        warn!("Change stream on '{}' failed: {}", query.scope.name(), e);
                        let err = StoreError::Backend(format!("Change stream failed: {}", e));
                        Some((Err(err), WatchState::Done))
                    }
                    None => None,
                },
                WatchState::Done => None,
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::query::Query;

    #[test]
    fn test_from_bson_lifts_object_id() {
        let oid = ObjectId::new();
        let raw = doc! { "_id": oid, "name": "Ana", "visitCount": 3_i64 };
        let document = MongoDBStore::from_bson(raw);
        assert_eq!(document.id, oid.to_hex());
        assert_eq!(document.get_str("name"), Some("Ana"));
        assert_eq!(document.get_i64("visitCount"), Some(3));
        assert!(document.get("_id").is_none());
    }

    #[test]
    fn test_from_bson_keeps_string_id() {
        let document = MongoDBStore::from_bson(doc! { "_id": "m-1", "email": "a@b.c" });
        assert_eq!(document.id, "m-1");
    }

    #[test]
    fn test_filter_document_translates_id_and_fields() {
        let oid = ObjectId::new();
        let query = Query::collection("superAdmins")
            .where_eq("id", oid.to_hex())
            .where_eq("email", "x@y.z");
        let filter = MongoDBStore::filter_document(&query).unwrap();
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);
        assert_eq!(filter.get_str("email").unwrap(), "x@y.z");
    }

    #[test]
    fn test_filter_document_rejects_non_string_id() {
        let query = Query::collection("superAdmins").where_eq("id", 42);
        let result = MongoDBStore::filter_document(&query);
        assert!(matches!(result, Err(StoreError::InvalidValue(_))));
    }

    #[test]
    fn test_find_options_sort_and_limit() {
        let query = Query::group("recommendations")
            .order_by("createdAt", Direction::Descending)
            .limit(5);
        let options = MongoDBStore::find_options(&query);
        assert_eq!(options.sort, Some(doc! { "createdAt": -1 }));
        assert_eq!(options.limit, Some(5));
    }
}
