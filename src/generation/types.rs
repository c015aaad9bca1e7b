//! Target-independent output model
//!
//! The generator builds these values; renderers turn them into source text.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::openapi::HttpMethod;

/// A type expression produced by the type mapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ResolvedType {
    String,
    /// Integers and numbers alike; floats are not distinguished
    Integer,
    Boolean,
    /// A generated record type
    Model(String),
    /// A generated enumeration
    Enum(String),
    /// A named primitive or array definition
    Alias(String),
    List(Box<ResolvedType>),
    /// Anything the generator cannot type
    Dynamic,
}

impl ResolvedType {
    pub fn list_of(inner: ResolvedType) -> Self {
        ResolvedType::List(Box::new(inner))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ResolvedType::Dynamic)
    }
}

/// One enumeration member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub identifier: String,
    pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumDef {
    /// The member used as a default: the first declared value
    pub fn default_member(&self) -> Option<&EnumMember> {
        self.members.first()
    }
}

/// A field default other than "absent"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefaultValue {
    EnumMember { enum_name: String, member: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    /// Identifier used in generated code
    pub name: String,
    /// Property name as it appears on the wire
    pub wire_name: String,
    pub ty: ResolvedType,
    pub optional: bool,
    pub default: Option<DefaultValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

/// A named primitive or array definition, e.g. `PetId: integer`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasDef {
    pub name: String,
    pub target: ResolvedType,
}

/// A top-level model-like declaration, in emission order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Model(ModelDef),
    Alias(AliasDef),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Model(model) => &model.name,
            Declaration::Alias(alias) => &alias.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationParamLocation {
    Path,
    Query,
    Body,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationParam {
    /// Name as declared in the document (query key, path placeholder)
    pub name: String,
    /// Identifier used for the callable's argument
    pub identifier: String,
    pub location: OperationParamLocation,
    pub ty: ResolvedType,
    pub required: bool,
}

/// A status code and the type its payload is decoded into
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMapping {
    pub status: u16,
    pub ty: ResolvedType,
}

/// A classified operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDef {
    pub name: String,
    #[serde(serialize_with = "serialize_method")]
    pub method: HttpMethod,
    /// Path template with placeholders rewritten to parameter identifiers
    pub path: String,
    pub params: Vec<OperationParam>,
    pub request_type: Option<ResolvedType>,
    pub responses: Vec<ResponseMapping>,
    pub return_type: ResolvedType,
    pub tag: String,
    pub summary: Option<String>,
}

fn serialize_method<S: serde::Serializer>(
    method: &HttpMethod,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

impl OperationDef {
    pub fn path_params(&self) -> impl Iterator<Item = &OperationParam> {
        self.params_at(OperationParamLocation::Path)
    }

    pub fn query_params(&self) -> impl Iterator<Item = &OperationParam> {
        self.params_at(OperationParamLocation::Query)
    }

    pub fn body_param(&self) -> Option<&OperationParam> {
        self.params_at(OperationParamLocation::Body).next()
    }

    fn params_at(&self, location: OperationParamLocation) -> impl Iterator<Item = &OperationParam> {
        self.params.iter().filter(move |p| p.location == location)
    }
}

/// One generated callable: the shape of the HTTP call an operation makes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceMethod {
    pub name: String,
    pub http_method: String,
    /// URL path with `{identifier}` placeholders
    pub url_template: String,
    /// Arguments in call order: path, then query, then the body
    pub arguments: Vec<OperationParam>,
    /// `(wire name, identifier)` pairs sent as the query string
    pub query: Vec<(String, String)>,
    /// Identifier of the request payload argument, when there is a body
    pub body: Option<String>,
    pub request_type: Option<ResolvedType>,
    pub response_branches: Vec<ResponseMapping>,
    pub return_type: ResolvedType,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceGroup {
    pub tag: String,
    pub class_name: String,
    pub accessor: String,
    pub methods: Vec<ServiceMethod>,
}

/// How the façade authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthHeaderPolicy {
    /// `Authorization: Bearer <api key>` when a key is supplied, no header otherwise
    BearerWhenKeyPresent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceAccessor {
    pub name: String,
    pub class_name: String,
}

/// The top-level client type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacadeDef {
    pub name: String,
    pub default_base_url: Option<String>,
    pub auth: AuthHeaderPolicy,
    pub accessors: Vec<ServiceAccessor>,
}

/// The complete output of a generation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientModule {
    pub title: Option<String>,
    pub enums: Vec<EnumDef>,
    pub declarations: Vec<Declaration>,
    pub services: Vec<ServiceGroup>,
    pub facade: FacadeDef,
}

impl ClientModule {
    pub fn enum_named(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn model_named(&self, name: &str) -> Option<&ModelDef> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Model(model) if model.name == name => Some(model),
            _ => None,
        })
    }

    pub fn service_named(&self, class_name: &str) -> Option<&ServiceGroup> {
        self.services.iter().find(|s| s.class_name == class_name)
    }

    pub fn declaration_order(&self) -> Vec<&str> {
        self.declarations.iter().map(Declaration::name).collect()
    }
}
