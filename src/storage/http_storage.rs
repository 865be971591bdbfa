use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::base::{join_url, validate_path, ObjectStorage, StorageError};

/// The config needed for an HTTP object storage service.
///
/// Objects are written with `PUT {base_url}/{path}`. The returned URL is the
/// `url` field of the JSON response when there is one, otherwise
/// `{public_url}/{path}` (falling back to `base_url`).
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct HttpStorageConfig {
    pub base_url: String,
    pub public_url: Option<String>,
    /// Sent as a Bearer token when set.
    pub token: Option<String>,
}

pub struct HttpObjectStorage {
    config: HttpStorageConfig,
    client: reqwest::Client,
}

impl HttpObjectStorage {
    pub fn new(config: &HttpStorageConfig) -> Self {
        info!("Creating HTTP object storage for '{}'", config.base_url);
        Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn fallback_url(&self, path: &str) -> String {
        let base = self
            .config
            .public_url
            .as_deref()
            .unwrap_or(&self.config.base_url);
        join_url(base, path)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    fn get_name(&self) -> &str {
        "http"
    }

    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        path: &str,
    ) -> Result<String, StorageError> {
        validate_path(path)?;
        let url = join_url(&self.config.base_url, path);
        debug!("Uploading {} bytes to {}", data.len(), url);

        let mut request = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .body(data);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Request(format!("Error sending request: {}", e)))?;

        if !response.status().is_success() {
            return Err(StorageError::Request(format!(
                "Unexpected status code: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Request(format!("Error reading response body: {}", e)))?;
        let returned_url = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("url").and_then(Value::as_str).map(str::to_string));

        Ok(returned_url.unwrap_or_else(|| self.fallback_url(path)))
    }
}
