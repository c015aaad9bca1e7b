//! OpenAPI input: document model, schema parsing and document fetchers

pub mod document;
pub mod loader;
pub mod schema;

pub use document::{
    Definitions, HttpMethod, ParameterLocation, ParameterSpec, RawOperation, RequestBodySpec,
    ResponseSpec, SchemaDocument,
};
pub use loader::{CompositeOpenApiLoader, FileOpenApiLoader, HttpOpenApiLoader, OpenApiLoader};
pub use schema::{ObjectSchema, PrimitiveKind, SchemaNode};
