//! clientgen library
//!
//! Turns an OpenAPI 3 or Swagger 2 document into a typed client: enumerations,
//! data models, one service class per resource group and a façade that wires
//! them together.
//!
//! The pipeline is split in two halves. [`generation`] is target-independent and
//! builds a [`generation::ClientModule`] from a parsed
//! [`openapi::SchemaDocument`]; [`render`] turns that module into source text for
//! a target language.
//!
//! ```
//! use clientgen::{GeneratorConfig, generate_source};
//! use serde_json::json;
//!
//! let spec = json!({
//!     "swagger": "2.0",
//!     "definitions": {
//!         "Pet": {
//!             "properties": {
//!                 "status": { "type": "string", "enum": ["available", "sold"] }
//!             }
//!         }
//!     },
//!     "paths": {}
//! });
//!
//! let code = generate_source(&spec, &GeneratorConfig::default()).unwrap();
//! assert!(code.contains("class PetStatus(str, Enum):"));
//! assert!(code.contains("status: PetStatus = PetStatus.AVAILABLE"));
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod generation;
pub mod openapi;
pub mod output;
pub mod render;

pub use config::{GeneratorConfig, TargetLanguage};
pub use error::{GenerationError, Result};

use serde_json::Value as JsonValue;

/// Run the whole pipeline on an already-loaded document and return the
/// rendered source, preamble included when the configuration asks for it.
pub fn generate_source(spec: &JsonValue, config: &GeneratorConfig) -> Result<String> {
    let document = openapi::SchemaDocument::from_json(spec)?;
    let module = generation::generate(&document, config)?;
    let renderer = render::renderer_for(config.target);
    let body = renderer.render(&module)?;

    if config.include_preamble {
        Ok(format!("{}\n{}", renderer.preamble(), body))
    } else {
        Ok(body)
    }
}
