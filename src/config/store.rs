use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::{HttpStorageConfig, LocalStorageConfig};
use crate::store::{MemoryStoreConfig, MongoDBConfig};

/// The remote document store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum RemoteConfig {
    #[serde(rename = "mongo")]
    MongoDB(MongoDBConfig),
    #[serde(rename = "memory")]
    Memory(MemoryStoreConfig),
}

/// Names of the remote collections the console reads and writes.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct CollectionsConfig {
    /// Salon manager accounts.
    #[serde(default = "default_managers")]
    pub managers: String,
    /// Super-admin accounts.
    #[serde(default = "default_super_admins")]
    pub super_admins: String,
    /// Collection group holding every salon's clients.
    #[serde(default = "default_clients")]
    pub clients: String,
    /// Collection group holding every salon's AI recommendations.
    #[serde(default = "default_recommendations")]
    pub recommendations: String,
}

fn default_managers() -> String {
    "managers".to_string()
}

fn default_super_admins() -> String {
    "superAdmins".to_string()
}

fn default_clients() -> String {
    "clients".to_string()
}

fn default_recommendations() -> String {
    "recommendations".to_string()
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        CollectionsConfig {
            managers: default_managers(),
            super_admins: default_super_admins(),
            clients: default_clients(),
            recommendations: default_recommendations(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileSessionConfig {
    pub path: PathBuf,
}

/// Where the current session is persisted between runs.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum SessionStoreConfig {
    #[serde(rename = "file")]
    File(FileSessionConfig),
    #[serde(rename = "memory")]
    Memory,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        SessionStoreConfig::File(FileSessionConfig {
            path: PathBuf::from("./session.json"),
        })
    }
}

/// The object storage backends used for avatar uploads.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageConfig {
    #[serde(rename = "local")]
    Local(LocalStorageConfig),
    #[serde(rename = "http")]
    Http(HttpStorageConfig),
}
