//! Error handling for the clientgen generation pipeline.
//!
//! Malformed schema fragments and odd identifiers are never errors: they degrade
//! to dynamic types or normalized names. The variants below are the cases that
//! abort a run, so that a failed run never produces partial output.

use thiserror::Error;

/// Result type for clientgen operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that can occur while loading, generating or rendering a client
#[derive(Error, Debug)]
pub enum GenerationError {
    /// A `$ref` names something the document does not contain
    #[error("Unresolved reference '{name}' (referenced from {referenced_from})")]
    UnresolvedReference {
        name: String,
        referenced_from: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GenerationError {
    /// Create an unresolved reference error
    pub fn unresolved<N: Into<String>, F: Into<String>>(name: N, referenced_from: F) -> Self {
        Self::UnresolvedReference {
            name: name.into(),
            referenced_from: referenced_from.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
}

impl From<tera::Error> for GenerationError {
    fn from(err: tera::Error) -> Self {
        // tera nests the useful message in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::RenderError(message)
    }
}
