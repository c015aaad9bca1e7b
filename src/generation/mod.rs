//! Target-independent generation
//!
//! Takes a parsed [`crate::openapi::SchemaDocument`] and builds a
//! [`ClientModule`]: type mapping, dependency ordering of definitions, model
//! emission, operation classification and service grouping. Nothing in here
//! produces text; see [`crate::render`] for that.

pub mod client;
pub mod context;
pub mod model;
pub mod naming;
pub mod operations;
pub mod resolver;
pub mod services;
pub mod type_mapper;
pub mod types;

pub use client::generate;
pub use context::{GenerationContext, TypeRegistry};
pub use types::*;
