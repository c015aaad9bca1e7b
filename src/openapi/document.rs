//! OpenAPI / Swagger document model and parser
//!
//! Accepts both document shapes:
//! - Swagger 2: `definitions`, `in: body` parameters, `host` + `basePath`
//! - OpenAPI 3: `components.schemas`, `requestBody`, `servers`
//!
//! Parameter, request body and response objects may themselves be `$ref`s into
//! the document; those are resolved here through JSON pointers. Schema `$ref`s
//! are kept as [`SchemaNode::Reference`] and resolved later by the generator.

use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value as JsonValue};

use super::schema::SchemaNode;
use crate::error::{GenerationError, Result};

/// HTTP methods an OpenAPI path item can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Get all HTTP methods as an array
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Head,
            HttpMethod::Options,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a parameter travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Header,
    Cookie,
    FormData,
}

impl ParameterLocation {
    fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "body" => Some(ParameterLocation::Body),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            "formData" => Some(ParameterLocation::FormData),
            _ => None,
        }
    }
}

/// A declared operation parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaNode,
}

/// A declared response, keyed by its status code (`"200"`, `"default"`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub status: String,
    pub schema: Option<SchemaNode>,
}

/// An OpenAPI 3 `requestBody` with a JSON schema
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodySpec {
    pub schema: SchemaNode,
    pub required: bool,
}

/// One `(path, method)` entry as declared in the document
#[derive(Debug, Clone, PartialEq)]
pub struct RawOperation {
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Path-level parameters merged with operation-level ones
    pub parameters: Vec<ParameterSpec>,
    pub request_body: Option<RequestBodySpec>,
    pub responses: Vec<ResponseSpec>,
}

/// Named schema definitions in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    order: Vec<String>,
    nodes: HashMap<String, SchemaNode>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition; a repeated name replaces the node but keeps its position
    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) {
        let name = name.into();
        if !self.nodes.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.nodes.insert(name, node);
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.order.iter().filter_map(|name| self.nodes.get_key_value(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<(String, SchemaNode)> for Definitions {
    fn from_iter<I: IntoIterator<Item = (String, SchemaNode)>>(iter: I) -> Self {
        let mut definitions = Definitions::new();
        for (name, node) in iter {
            definitions.insert(name, node);
        }
        definitions
    }
}

/// The parsed input of a generation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    pub title: Option<String>,
    /// Base URL declared by `servers` or `host`/`basePath`
    pub base_url: Option<String>,
    pub definitions: Definitions,
    pub operations: Vec<RawOperation>,
}

impl SchemaDocument {
    /// Parse a loaded OpenAPI or Swagger document
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        DocumentParser::new(json).parse()
    }
}

struct DocumentParser<'a> {
    json: &'a JsonValue,
}

impl<'a> DocumentParser<'a> {
    fn new(json: &'a JsonValue) -> Self {
        Self { json }
    }

    fn parse(&self) -> Result<SchemaDocument> {
        if !self.json.is_object() {
            return Err(GenerationError::validation(
                "OpenAPI document must be a JSON object",
            ));
        }

        let definitions = self.parse_definitions();
        let operations = self.parse_operations()?;
        tracing::debug!(
            definitions = definitions.len(),
            operations = operations.len(),
            "Parsed OpenAPI document"
        );

        Ok(SchemaDocument {
            title: self
                .json
                .pointer("/info/title")
                .and_then(JsonValue::as_str)
                .map(String::from),
            base_url: self.base_url(),
            definitions,
            operations,
        })
    }

    fn parse_definitions(&self) -> Definitions {
        let legacy = self.json.get("definitions").and_then(JsonValue::as_object);
        let modern = self
            .json
            .pointer("/components/schemas")
            .and_then(JsonValue::as_object);

        legacy
            .into_iter()
            .chain(modern)
            .flat_map(|schemas| schemas.iter())
            .map(|(name, schema)| (name.clone(), SchemaNode::from_json(schema)))
            .collect()
    }

    fn base_url(&self) -> Option<String> {
        if let Some(url) = self
            .json
            .pointer("/servers/0/url")
            .and_then(JsonValue::as_str)
        {
            if url.starts_with("http://") || url.starts_with("https://") {
                return Some(url.trim_end_matches('/').to_string());
            }
            tracing::debug!("Ignoring relative server URL '{}'", url);
        }

        let host = self.json.get("host").and_then(JsonValue::as_str)?;
        let scheme = self
            .json
            .pointer("/schemes/0")
            .and_then(JsonValue::as_str)
            .unwrap_or("https");
        let base_path = self
            .json
            .get("basePath")
            .and_then(JsonValue::as_str)
            .unwrap_or("");
        Some(format!("{scheme}://{host}{}", base_path.trim_end_matches('/')))
    }

    fn parse_operations(&self) -> Result<Vec<RawOperation>> {
        let Some(paths) = self.json.get("paths").and_then(JsonValue::as_object) else {
            return Ok(Vec::new());
        };

        let mut operations = Vec::new();
        for (path, path_item) in paths {
            let shared_parameters = self.parse_parameters(path_item, path)?;
            for method in HttpMethod::all() {
                let Some(method_item) = path_item.get(method.as_str()).and_then(JsonValue::as_object)
                else {
                    continue;
                };
                operations.push(self.build_operation(
                    path,
                    *method,
                    &shared_parameters,
                    method_item,
                )?);
            }
        }
        Ok(operations)
    }

    fn build_operation(
        &self,
        path: &str,
        method: HttpMethod,
        shared_parameters: &[ParameterSpec],
        method_item: &JsonMap<String, JsonValue>,
    ) -> Result<RawOperation> {
        let location = format!("{method} {path}");
        let own_parameters =
            self.parse_parameters(&JsonValue::Object(method_item.clone()), &location)?;

        // Operation-level parameters override path-level ones with the same name and location
        let mut parameters: Vec<ParameterSpec> = shared_parameters
            .iter()
            .filter(|shared| {
                !own_parameters
                    .iter()
                    .any(|own| own.name == shared.name && own.location == shared.location)
            })
            .cloned()
            .collect();
        parameters.extend(own_parameters);

        let request_body = method_item
            .get("requestBody")
            .map(|body| self.parse_request_body(body, &location))
            .transpose()?
            .flatten();

        let responses = method_item
            .get("responses")
            .and_then(JsonValue::as_object)
            .map(|map| {
                map.iter()
                    .map(|(status, response)| self.parse_response(status, response, &location))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let tags = method_item
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(RawOperation {
            path: path.to_string(),
            method,
            operation_id: string_field(method_item, "operationId"),
            summary: string_field(method_item, "summary"),
            description: string_field(method_item, "description"),
            tags,
            parameters,
            request_body,
            responses,
        })
    }

    fn parse_parameters(&self, item: &JsonValue, location: &str) -> Result<Vec<ParameterSpec>> {
        let Some(params) = item.get("parameters").and_then(JsonValue::as_array) else {
            return Ok(Vec::new());
        };

        let mut parsed = Vec::with_capacity(params.len());
        for param in params {
            let param = self.follow_ref(param, location)?;
            parsed.push(self.parse_parameter(&param, location)?);
        }
        Ok(parsed)
    }

    fn parse_parameter(&self, param: &JsonValue, location: &str) -> Result<ParameterSpec> {
        let name = param
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                GenerationError::validation(format!("Parameter missing name in {location}"))
            })?
            .to_string();

        let param_location = param
            .get("in")
            .and_then(JsonValue::as_str)
            .and_then(ParameterLocation::parse)
            .ok_or_else(|| {
                GenerationError::validation(format!(
                    "Invalid location for parameter '{name}' in {location}"
                ))
            })?;

        // Swagger 2 non-body parameters carry their type inline
        let schema = match param.get("schema") {
            Some(schema) => SchemaNode::from_json(schema),
            None => SchemaNode::from_json(param),
        };

        Ok(ParameterSpec {
            name,
            location: param_location,
            required: param
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(param_location == ParameterLocation::Path),
            schema,
        })
    }

    fn parse_request_body(
        &self,
        body: &JsonValue,
        location: &str,
    ) -> Result<Option<RequestBodySpec>> {
        let body = self.follow_ref(body, location)?;
        let required = body
            .get("required")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        Ok(content_schema(&body).map(|schema| RequestBodySpec {
            schema: SchemaNode::from_json(schema),
            required,
        }))
    }

    fn parse_response(
        &self,
        status: &str,
        response: &JsonValue,
        location: &str,
    ) -> Result<ResponseSpec> {
        let response = self.follow_ref(response, location)?;
        let schema = response
            .get("schema")
            .or_else(|| content_schema(&response))
            .map(SchemaNode::from_json);

        Ok(ResponseSpec {
            status: status.to_string(),
            schema,
        })
    }

    /// Resolve a non-schema object that may be a `$ref` into the document
    fn follow_ref(&self, value: &JsonValue, location: &str) -> Result<JsonValue> {
        match value.get("$ref").and_then(JsonValue::as_str) {
            Some(ref_str) => self.resolve_ref(ref_str, location),
            None => Ok(value.clone()),
        }
    }

    fn resolve_ref(&self, ref_str: &str, location: &str) -> Result<JsonValue> {
        ref_str
            .strip_prefix('#')
            .and_then(|pointer| self.json.pointer(pointer))
            .cloned()
            .ok_or_else(|| GenerationError::unresolved(ref_str, location))
    }
}

/// Schema of the JSON media type of a `content` map, falling back to the first entry
fn content_schema(object: &JsonValue) -> Option<&JsonValue> {
    let content = object.get("content")?.as_object()?;
    content
        .iter()
        .find(|(media_type, _)| media_type.contains("json"))
        .or_else(|| content.iter().next())
        .and_then(|(_, media)| media.get("schema"))
}

fn string_field(object: &JsonMap<String, JsonValue>, key: &str) -> Option<String> {
    object.get(key).and_then(JsonValue::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::schema::PrimitiveKind;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn test_swagger2_document() {
        let spec = json!({
            "swagger": "2.0",
            "info": {"title": "Petstore", "version": "1.0"},
            "host": "petstore.swagger.io",
            "basePath": "/v2",
            "schemes": ["https", "http"],
            "definitions": {
                "Pet": {"properties": {"name": {"type": "string"}}},
                "Category": {"properties": {"id": {"type": "integer"}}}
            },
            "paths": {
                "/pet": {
                    "post": {
                        "operationId": "addPet",
                        "tags": ["pet"],
                        "parameters": [{
                            "in": "body",
                            "name": "body",
                            "required": true,
                            "schema": {"$ref": "#/definitions/Pet"}
                        }],
                        "responses": {"405": {"description": "Invalid input"}}
                    }
                }
            }
        });

        let doc = SchemaDocument::from_json(&spec).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Petstore"));
        assert_eq!(doc.base_url.as_deref(), Some("https://petstore.swagger.io/v2"));
        assert_eq!(doc.definitions.names(), &["Pet".to_string(), "Category".to_string()]);

        let op = &doc.operations[0];
        assert_eq!(op.method, HttpMethod::Post);
        assert_eq!(op.operation_id.as_deref(), Some("addPet"));
        assert_eq!(op.tags, vec!["pet".to_string()]);
        assert_eq!(op.parameters[0].location, ParameterLocation::Body);
        assert_eq!(op.parameters[0].schema, SchemaNode::Reference("Pet".to_string()));
        assert_eq!(op.responses[0].status, "405");
        assert!(op.responses[0].schema.is_none());
    }

    #[test]
    fn test_openapi3_document() {
        let spec = json!({
            "openapi": "3.0.3",
            "info": {"title": "Store", "version": "1.0"},
            "servers": [{"url": "https://api.store.test/v3/"}],
            "paths": {
                "/orders/{orderId}": {
                    "parameters": [
                        {"name": "orderId", "in": "path", "schema": {"type": "integer"}}
                    ],
                    "put": {
                        "requestBody": {"$ref": "#/components/requestBodies/OrderBody"},
                        "responses": {
                            "200": {"$ref": "#/components/responses/OrderResponse"}
                        }
                    }
                }
            },
            "components": {
                "schemas": {"Order": {"type": "object"}},
                "requestBodies": {
                    "OrderBody": {
                        "required": true,
                        "content": {
                            "application/json": {"schema": {"$ref": "#/components/schemas/Order"}}
                        }
                    }
                },
                "responses": {
                    "OrderResponse": {
                        "description": "ok",
                        "content": {
                            "application/json": {"schema": {"$ref": "#/components/schemas/Order"}}
                        }
                    }
                }
            }
        });

        let doc = SchemaDocument::from_json(&spec).unwrap();
        assert_eq!(doc.base_url.as_deref(), Some("https://api.store.test/v3"));

        let op = &doc.operations[0];
        assert_eq!(op.method, HttpMethod::Put);
        assert_eq!(op.parameters.len(), 1);
        assert!(op.parameters[0].required);
        assert_eq!(
            op.parameters[0].schema,
            SchemaNode::Primitive(PrimitiveKind::Integer)
        );
        assert_eq!(
            op.request_body,
            Some(RequestBodySpec {
                schema: SchemaNode::Reference("Order".to_string()),
                required: true,
            })
        );
        assert_eq!(
            op.responses[0].schema,
            Some(SchemaNode::Reference("Order".to_string()))
        );
    }

    #[test]
    fn test_request_body_is_optional_unless_declared_required() {
        let spec = json!({
            "paths": {
                "/notes": {
                    "post": {
                        "requestBody": {"content": {"application/json": {"schema": {"type": "string"}}}},
                        "responses": {}
                    }
                }
            }
        });

        let doc = SchemaDocument::from_json(&spec).unwrap();
        let body = doc.operations[0].request_body.as_ref().unwrap();
        assert!(!body.required);
        assert_eq!(body.schema, SchemaNode::Primitive(PrimitiveKind::String));
    }

    #[test]
    #[traced_test]
    fn test_relative_server_url_is_ignored() {
        let spec = json!({"servers": [{"url": "/api/v3"}]});

        let doc = SchemaDocument::from_json(&spec).unwrap();
        assert_eq!(doc.base_url, None);
        assert!(logs_contain("Ignoring relative server URL '/api/v3'"));
    }

    #[test]
    fn test_relative_server_url_falls_back_to_host() {
        let spec = json!({
            "servers": [{"url": "/api/v3"}],
            "host": "store.test",
            "schemes": ["http"],
            "basePath": "/v1"
        });

        let doc = SchemaDocument::from_json(&spec).unwrap();
        assert_eq!(doc.base_url.as_deref(), Some("http://store.test/v1"));
    }

    #[test]
    fn test_operation_parameters_override_path_parameters() {
        let spec = json!({
            "paths": {
                "/items": {
                    "parameters": [
                        {"name": "limit", "in": "query", "type": "string"},
                        {"name": "page", "in": "query", "type": "integer"}
                    ],
                    "get": {
                        "parameters": [{"name": "limit", "in": "query", "type": "integer"}],
                        "responses": {}
                    }
                }
            }
        });

        let doc = SchemaDocument::from_json(&spec).unwrap();
        let params = &doc.operations[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "page");
        assert_eq!(params[1].name, "limit");
        assert_eq!(params[1].schema, SchemaNode::Primitive(PrimitiveKind::Integer));
    }

    #[test]
    fn test_methods_follow_fixed_order() {
        let spec = json!({
            "paths": {
                "/things": {
                    "delete": {"responses": {}},
                    "get": {"responses": {}},
                    "post": {"responses": {}}
                }
            }
        });

        let doc = SchemaDocument::from_json(&spec).unwrap();
        let methods: Vec<_> = doc.operations.iter().map(|op| op.method).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete]
        );
    }

    #[test]
    fn test_unresolvable_parameter_ref() {
        let spec = json!({
            "paths": {
                "/a": {"get": {"parameters": [{"$ref": "#/parameters/Missing"}]}}
            }
        });

        let err = SchemaDocument::from_json(&spec).unwrap_err();
        assert!(matches!(err, GenerationError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_parameter_without_name_is_invalid() {
        let spec = json!({
            "paths": {"/a": {"get": {"parameters": [{"in": "query"}]}}}
        });

        let err = SchemaDocument::from_json(&spec).unwrap_err();
        assert!(matches!(err, GenerationError::ValidationError(_)));
    }

    #[test]
    fn test_document_without_paths_or_definitions() {
        let doc = SchemaDocument::from_json(&json!({"openapi": "3.0.0"})).unwrap();
        assert!(doc.definitions.is_empty());
        assert!(doc.operations.is_empty());
        assert!(doc.base_url.is_none());

        assert!(SchemaDocument::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_definitions_insert_keeps_first_position() {
        let mut defs = Definitions::new();
        defs.insert("A", SchemaNode::Untyped);
        defs.insert("B", SchemaNode::Untyped);
        defs.insert("A", SchemaNode::Primitive(PrimitiveKind::String));

        assert_eq!(defs.names(), &["A".to_string(), "B".to_string()]);
        assert_eq!(
            defs.get("A"),
            Some(&SchemaNode::Primitive(PrimitiveKind::String))
        );
    }
}
