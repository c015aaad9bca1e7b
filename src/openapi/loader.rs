//! Document fetchers
//!
//! Loaders only fetch and decode; turning the JSON into a [`SchemaDocument`]
//! is the job of [`SchemaDocument::from_json`].
//!
//! [`SchemaDocument`]: super::SchemaDocument
//! [`SchemaDocument::from_json`]: super::SchemaDocument::from_json

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tokio::fs;

use crate::error::{GenerationError, Result};

/// Loads a raw OpenAPI document from some source
#[async_trait]
pub trait OpenApiLoader: Send + Sync {
    /// Load an OpenAPI document from a source
    async fn load(&self, source: &str) -> Result<JsonValue>;
}

/// Decode document text as JSON or YAML
///
/// The hint (file name, URL or content type) picks the format when it is
/// conclusive; otherwise JSON is tried first, then YAML.
pub fn decode_document(content: &str, hint: &str) -> Result<JsonValue> {
    if hint.ends_with(".json") || hint.contains("application/json") {
        serde_json::from_str(content).map_err(GenerationError::SerializationError)
    } else if hint.ends_with(".yaml") || hint.ends_with(".yml") || hint.contains("yaml") {
        serde_yaml::from_str(content)
            .map_err(|e| GenerationError::LoadError(format!("Failed to parse YAML: {e}")))
    } else {
        serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| GenerationError::LoadError(format!("Failed to parse OpenAPI spec: {e}")))
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads OpenAPI documents from local files
pub struct FileOpenApiLoader;

impl FileOpenApiLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenApiLoader for FileOpenApiLoader {
    async fn load(&self, source: &str) -> Result<JsonValue> {
        let content = fs::read_to_string(source).await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read OpenAPI spec {source}: {e}"))
        })?;
        decode_document(&content, source)
    }
}

/// Loads OpenAPI documents from HTTP/HTTPS URLs
pub struct HttpOpenApiLoader {
    client: Client,
}

impl HttpOpenApiLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| GenerationError::LoadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl OpenApiLoader for HttpOpenApiLoader {
    async fn load(&self, source: &str) -> Result<JsonValue> {
        if !is_url(source) {
            return Err(GenerationError::LoadError(format!(
                "HttpOpenApiLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        let response = self.client.get(source).send().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to fetch OpenAPI spec from {source}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::LoadError(format!(
                "HTTP {status} when fetching {source}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response.text().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read response body: {e}"))
        })?;

        let hint = if content_type.is_empty() {
            source
        } else {
            content_type.as_str()
        };
        decode_document(&content, hint)
    }
}

/// Picks the HTTP or file loader based on the source
pub struct CompositeOpenApiLoader {
    http: HttpOpenApiLoader,
    file: FileOpenApiLoader,
}

impl CompositeOpenApiLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpOpenApiLoader::new()?,
            file: FileOpenApiLoader::new(),
        })
    }
}

#[async_trait]
impl OpenApiLoader for CompositeOpenApiLoader {
    async fn load(&self, source: &str) -> Result<JsonValue> {
        if is_url(source) {
            tracing::debug!("CompositeOpenApiLoader: Using HTTP loader for {source}");
            self.http.load(source).await
        } else {
            tracing::debug!("CompositeOpenApiLoader: Using file loader for {source}");
            self.file.load(source).await
        }
    }
}
