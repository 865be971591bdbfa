use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::{CollectionsConfig, RemoteConfig, SessionStoreConfig, StorageConfig};

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "SALONDESK_CONFIG";
/// Prefix of environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "SALONDESK_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: remote store, session persistence, uploads, logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub remote: RemoteConfig,
    #[serde(default)]
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub session: SessionStoreConfig,
    pub storage: StorageConfig,
}

impl Config {
    // handle configuration migration between versions here when necessary
    pub fn into_latest(self) -> ConfigV1 {
        match self {
            Config::ConfigV1(c) => c,
        }
    }
}

/// Parses a config from a YAML string, without environment overrides.
pub fn parse_config(yaml: &str) -> Result<ConfigV1, figment::Error> {
    let config: Config = Figment::new().merge(Yaml::string(yaml)).extract()?;
    Ok(config.into_latest())
}

/// Loads the YAML file at `path`, then applies `SALONDESK_*` environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    let config: Config = Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config.into_latest())
}

/// Config file location: `$SALONDESK_CONFIG`, or `./config.yaml`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.yaml".to_string())
}

/// Returns the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
