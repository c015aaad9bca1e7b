//! Typed view over JSON Schema fragments
//!
//! Every schema fragment found in a document is parsed once into a
//! [`SchemaNode`]. Parsing never fails: shapes the generator does not support
//! (`oneOf`, `anyOf`, `not`, missing `type`) become [`SchemaNode::Untyped`].

use serde_json::Value as JsonValue;

/// JSON Schema primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl PrimitiveKind {
    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(PrimitiveKind::String),
            "integer" => Some(PrimitiveKind::Integer),
            "number" => Some(PrimitiveKind::Number),
            "boolean" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }
}

/// An object schema with its properties in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
    pub description: Option<String>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, node)| node)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// A parsed schema fragment
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Primitive(PrimitiveKind),
    /// Any schema carrying a non-empty `enum` list
    Enum(Vec<JsonValue>),
    Object(ObjectSchema),
    Array(Option<Box<SchemaNode>>),
    /// `$ref` to a named definition; holds the definition name only
    Reference(String),
    /// `allOf` members, with sibling properties appended as a trailing object
    Composition(Vec<SchemaNode>),
    Untyped,
}

impl SchemaNode {
    /// Parse a schema fragment
    pub fn from_json(value: &JsonValue) -> Self {
        let Some(obj) = value.as_object() else {
            return SchemaNode::Untyped;
        };

        if let Some(ref_str) = obj.get("$ref").and_then(JsonValue::as_str) {
            return SchemaNode::Reference(ref_name(ref_str));
        }

        if let Some(values) = obj.get("enum").and_then(JsonValue::as_array) {
            if !values.is_empty() {
                return SchemaNode::Enum(values.clone());
            }
        }

        if let Some(members) = obj.get("allOf").and_then(JsonValue::as_array) {
            let mut parsed: Vec<SchemaNode> = members.iter().map(SchemaNode::from_json).collect();
            if obj.contains_key("properties") || obj.contains_key("description") {
                parsed.push(SchemaNode::Object(parse_object(value)));
            }
            return SchemaNode::Composition(parsed);
        }

        if obj.contains_key("oneOf") || obj.contains_key("anyOf") || obj.contains_key("not") {
            tracing::debug!("Unsupported composition keyword, falling back to an untyped schema");
            return SchemaNode::Untyped;
        }

        match schema_type(value) {
            Some("object") => SchemaNode::Object(parse_object(value)),
            Some("array") => SchemaNode::Array(
                obj.get("items")
                    .map(|items| Box::new(SchemaNode::from_json(items))),
            ),
            Some(other) => match PrimitiveKind::from_type_name(other) {
                Some(kind) => SchemaNode::Primitive(kind),
                None => SchemaNode::Untyped,
            },
            None if obj.contains_key("properties") => SchemaNode::Object(parse_object(value)),
            None => SchemaNode::Untyped,
        }
    }

    /// Names of every definition referenced from this node, at any depth, in
    /// first-seen order
    pub fn references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<String>) {
        match self {
            SchemaNode::Reference(name) => {
                if !refs.contains(name) {
                    refs.push(name.clone());
                }
            }
            SchemaNode::Object(object) => {
                for (_, prop) in &object.properties {
                    prop.collect_references(refs);
                }
            }
            SchemaNode::Array(Some(items)) => items.collect_references(refs),
            SchemaNode::Composition(members) => {
                for member in members {
                    member.collect_references(refs);
                }
            }
            SchemaNode::Primitive(_)
            | SchemaNode::Enum(_)
            | SchemaNode::Array(None)
            | SchemaNode::Untyped => {}
        }
    }
}

/// The last path segment of a `$ref`, JSON-pointer unescaped
///
/// `#/definitions/Pet` and `#/components/schemas/Pet` both name `Pet`.
pub fn ref_name(ref_str: &str) -> String {
    ref_str
        .rsplit('/')
        .next()
        .unwrap_or(ref_str)
        .replace("~1", "/")
        .replace("~0", "~")
}

/// The declared `type`, taking the first non-null entry of an OpenAPI 3.1 type list
fn schema_type(value: &JsonValue) -> Option<&str> {
    match value.get("type")? {
        JsonValue::String(s) => Some(s.as_str()),
        JsonValue::Array(types) => types
            .iter()
            .filter_map(JsonValue::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn parse_object(value: &JsonValue) -> ObjectSchema {
    let properties = value
        .get("properties")
        .and_then(JsonValue::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), SchemaNode::from_json(prop)))
                .collect()
        })
        .unwrap_or_default();

    let required = value
        .get("required")
        .and_then(JsonValue::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(JsonValue::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let description = value
        .get("description")
        .and_then(JsonValue::as_str)
        .map(String::from);

    ObjectSchema {
        properties,
        required,
        description,
    }
}
