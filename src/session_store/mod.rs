pub mod base;
pub mod file_store;
pub mod memory_store;

pub use base::{create_session_store, SessionStore, SessionStoreError};
pub use file_store::FileSessionStore;
pub use memory_store::MemorySessionStore;
