pub mod base;
pub mod memory_store;
pub mod mongodb_store;
pub mod query;

// Re-export the primary store items so code outside can do
// "use crate::store::{DocumentStore, Query, create_store};"
pub use base::{create_store, DocumentStore, SnapshotStream, StoreError};
pub use memory_store::{MemoryStore, MemoryStoreConfig};
pub use mongodb_store::{MongoDBConfig, MongoDBStore};
pub use query::{Direction, Filter, Query, Scope, Sort};
