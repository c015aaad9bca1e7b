//! Generator configuration
//!
//! Values come from defaults, optionally overlaid by a TOML file, and finally by
//! command-line flags in the binary.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Languages a [`crate::generation::ClientModule`] can be rendered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    Python,
}

impl TargetLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLanguage::Python => "python",
        }
    }
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetLanguage {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(TargetLanguage::Python),
            other => Err(GenerationError::ConfigError(format!(
                "Unsupported target language: {other}"
            ))),
        }
    }
}

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Name of the generated façade class
    pub client_name: String,
    /// Overrides the base URL declared by the document
    pub base_url: Option<String>,
    /// Language the client is rendered in
    pub target: TargetLanguage,
    /// Prepend the renderer's import header to the output
    pub include_preamble: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            client_name: "APIClient".to_string(),
            base_url: None,
            target: TargetLanguage::default(),
            include_preamble: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| GenerationError::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Load a configuration file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GenerationError::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }
}
