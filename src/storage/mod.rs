pub mod base;
pub mod http_storage;
pub mod local_storage;

pub use base::{create_object_storage, ObjectStorage, StorageError};
pub use http_storage::{HttpObjectStorage, HttpStorageConfig};
pub use local_storage::{LocalObjectStorage, LocalStorageConfig};
