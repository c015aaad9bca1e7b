//! Python renderer
//!
//! Produces a single module built on `dataclasses`, `enum` and `requests`. The
//! typed [`ClientModule`] is converted into Python-ready view structs first
//! (annotations, literals, constructor expressions), then rendered through the
//! embedded `client.py` template.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tera::{Context, Tera};

use crate::config::TargetLanguage;
use crate::error::Result;
use crate::generation::{
    ClientModule, Declaration, DefaultValue, EnumDef, FacadeDef, FieldDef, ModelDef,
    OperationParam, ResolvedType, ServiceGroup, ServiceMethod,
};

use super::Renderer;
use super::sanitizers::{normalize_blank_lines, sanitize_docstring};

const TEMPLATE_NAME: &str = "client.py";
const TEMPLATE: &str = include_str!("../../templates/python/client.py.tera");

const PREAMBLE: &str = "\
from __future__ import annotations

from dataclasses import dataclass, is_dataclass
from enum import Enum
from typing import Any, Dict, List, Optional

import requests
";

/// Names that cannot be used as Python identifiers as-is
const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "self",
    "try", "while", "with", "yield",
];

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Class-level names of every generated dataclass
const MODEL_MEMBERS: &[&str] = &["_FIELDS", "from_dict", "to_dict"];

/// Locals of a service method and the module-level names its body uses
const METHOD_NAMES: &[&str] = &[
    "url", "response", "requests", "Enum", "_payload", "_encode", "_decode", "is_dataclass",
];

/// Payload expression every response branch decodes
const PAYLOAD: &str = "_payload(response)";

#[derive(Debug, Default, Clone, Copy)]
pub struct PythonRenderer;

impl PythonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for PythonRenderer {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Python
    }

    fn preamble(&self) -> &'static str {
        PREAMBLE
    }

    fn render(&self, module: &ClientModule) -> Result<String> {
        let view = ModuleView::build(module);

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        let context = Context::from_serialize(&view)?;
        let rendered = tera.render(TEMPLATE_NAME, &context)?;

        tracing::debug!(bytes = rendered.len(), "Rendered Python client");
        Ok(normalize_blank_lines(&rendered, 2))
    }
}

#[derive(Debug, Serialize)]
struct ModuleView {
    title: Option<String>,
    enums: Vec<EnumView>,
    declarations: Vec<DeclarationView>,
    services: Vec<ServiceView>,
    facade: FacadeView,
}

#[derive(Debug, Serialize)]
struct EnumView {
    name: String,
    bases: &'static str,
    members: Vec<MemberView>,
}

#[derive(Debug, Serialize)]
struct MemberView {
    identifier: String,
    literal: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DeclarationView {
    Model {
        name: String,
        docstring: Option<String>,
        fields: Vec<FieldView>,
        /// `((wire name, field name, decoder), ...)` tuple behind `from_dict`
        /// and `to_dict`
        field_map: String,
    },
    Alias {
        name: String,
        target: String,
    },
}

#[derive(Debug, Serialize)]
struct FieldView {
    name: String,
    annotation: String,
    default: String,
}

#[derive(Debug, Serialize)]
struct ServiceView {
    class_name: String,
    methods: Vec<MethodView>,
}

#[derive(Debug, Serialize)]
struct MethodView {
    name: String,
    /// Arguments after `self`, each with its leading `, `
    signature: String,
    return_annotation: String,
    docstring: Option<String>,
    url_path: String,
    http_method: String,
    query: Option<String>,
    body: Option<String>,
    branches: Vec<BranchView>,
}

#[derive(Debug, Serialize)]
struct BranchView {
    status: u16,
    expr: String,
}

#[derive(Debug, Serialize)]
struct FacadeView {
    name: String,
    base_url_default: String,
    accessors: Vec<AccessorView>,
}

#[derive(Debug, Serialize)]
struct AccessorView {
    name: String,
    class_name: String,
}

impl ModuleView {
    fn build(module: &ClientModule) -> Self {
        Self {
            title: module.title.as_deref().map(sanitize_docstring),
            enums: module.enums.iter().map(enum_view).collect(),
            declarations: module.declarations.iter().map(declaration_view).collect(),
            services: module.services.iter().map(service_view).collect(),
            facade: facade_view(&module.facade),
        }
    }
}

fn enum_view(def: &EnumDef) -> EnumView {
    let values = || def.members.iter().map(|m| &m.value);
    let bases = if values().all(JsonValue::is_string) {
        "str, Enum"
    } else if values().all(|v| v.is_i64() || v.is_u64()) {
        "int, Enum"
    } else {
        "Enum"
    };

    EnumView {
        name: type_name(&def.name),
        bases,
        members: def
            .members
            .iter()
            .map(|member| MemberView {
                identifier: member.identifier.clone(),
                literal: python_literal(&member.value),
            })
            .collect(),
    }
}

fn declaration_view(declaration: &Declaration) -> DeclarationView {
    match declaration {
        Declaration::Model(model) => model_view(model),
        Declaration::Alias(alias) => DeclarationView::Alias {
            name: type_name(&alias.name),
            target: alias_target(&alias.target),
        },
    }
}

fn model_view(model: &ModelDef) -> DeclarationView {
    let names = escape_identifiers(model.fields.iter().map(|f| f.name.as_str()), MODEL_MEMBERS);
    let fields: Vec<FieldView> = model
        .fields
        .iter()
        .zip(names)
        .map(|(field, name)| field_view(field, name))
        .collect();

    let entries: Vec<String> = model
        .fields
        .iter()
        .zip(&fields)
        .map(|(field, view)| {
            format!(
                "({}, {}, {})",
                string_literal(&field.wire_name),
                string_literal(&view.name),
                decoder(&field.ty)
            )
        })
        .collect();
    let field_map = match entries.as_slice() {
        [single] => format!("({single},)"),
        _ => format!("({})", entries.join(", ")),
    };

    DeclarationView::Model {
        name: type_name(&model.name),
        docstring: model.description.as_deref().map(sanitize_docstring),
        fields,
        field_map,
    }
}

fn field_view(field: &FieldDef, name: String) -> FieldView {
    let annotation = annotation(&field.ty);
    match &field.default {
        Some(DefaultValue::EnumMember { enum_name, member }) => FieldView {
            name,
            annotation,
            default: format!("{}.{}", type_name(enum_name), member),
        },
        None if field.optional => FieldView {
            name,
            annotation: format!("Optional[{annotation}]"),
            default: "None".to_string(),
        },
        None => FieldView {
            name,
            annotation,
            default: "None".to_string(),
        },
    }
}

/// Converter applied to a field's raw JSON value in `from_dict`
fn decoder(ty: &ResolvedType) -> String {
    if needs_construction(ty) {
        format!("lambda value: {}", construct(ty, "value"))
    } else {
        "None".to_string()
    }
}

fn service_view(group: &ServiceGroup) -> ServiceView {
    ServiceView {
        class_name: type_name(&group.class_name),
        methods: group.methods.iter().map(method_view).collect(),
    }
}

fn method_view(method: &ServiceMethod) -> MethodView {
    let escaped: Vec<String> = escape_identifiers(
        method.arguments.iter().map(|arg| arg.identifier.as_str()),
        METHOD_NAMES,
    );
    let python_name = |ident: &str| -> String {
        method
            .arguments
            .iter()
            .zip(&escaped)
            .find(|(arg, _)| arg.identifier == ident)
            .map_or_else(|| identifier(ident), |(_, name)| name.clone())
    };

    let signature: String = method
        .arguments
        .iter()
        .zip(&escaped)
        .map(|(arg, name)| argument(arg, name))
        .collect();

    let url_path = PLACEHOLDER
        .replace_all(&method.url_template, |caps: &regex::Captures| {
            format!("{{{}}}", python_name(&caps[1]))
        })
        .replace('"', "\\\"");

    let query = (!method.query.is_empty()).then(|| {
        let entries: Vec<String> = method
            .query
            .iter()
            .map(|(key, ident)| format!("{}: {}", string_literal(key), python_name(ident)))
            .collect();
        format!("{{{}}}", entries.join(", "))
    });

    let body = method
        .body
        .as_deref()
        .map(|ident| format!("_encode({})", python_name(ident)));

    MethodView {
        name: identifier(&method.name),
        signature,
        return_annotation: annotation(&method.return_type),
        docstring: method.summary.as_deref().map(sanitize_docstring),
        url_path,
        http_method: method.http_method.clone(),
        query,
        body,
        branches: method
            .response_branches
            .iter()
            .map(|branch| BranchView {
                status: branch.status,
                expr: construct(&branch.ty, PAYLOAD),
            })
            .collect(),
    }
}

fn argument(param: &OperationParam, name: &str) -> String {
    let annotation = annotation(&param.ty);
    if param.required {
        format!(", {name}: {annotation}")
    } else {
        format!(", {name}: Optional[{annotation}] = None")
    }
}

fn facade_view(facade: &FacadeDef) -> FacadeView {
    FacadeView {
        name: type_name(&facade.name),
        base_url_default: facade
            .default_base_url
            .as_deref()
            .map(|url| format!(" = {}", string_literal(url)))
            .unwrap_or_default(),
        accessors: facade
            .accessors
            .iter()
            .map(|accessor| AccessorView {
                name: identifier(&accessor.name),
                class_name: type_name(&accessor.class_name),
            })
            .collect(),
    }
}

/// Type annotation for a resolved type
fn annotation(ty: &ResolvedType) -> String {
    match ty {
        ResolvedType::String => "str".to_string(),
        ResolvedType::Integer => "int".to_string(),
        ResolvedType::Boolean => "bool".to_string(),
        ResolvedType::Model(name) | ResolvedType::Enum(name) | ResolvedType::Alias(name) => {
            type_name(name)
        }
        ResolvedType::List(inner) => format!("List[{}]", annotation(inner)),
        ResolvedType::Dynamic => "Any".to_string(),
    }
}

/// Right-hand side of an alias; models inside lists are quoted so the alias
/// does not need them defined first
fn alias_target(ty: &ResolvedType) -> String {
    fn quoted(ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Model(name) | ResolvedType::Alias(name) => {
                format!("\"{}\"", type_name(name))
            }
            ResolvedType::List(inner) => format!("List[{}]", quoted(inner)),
            other => annotation(other),
        }
    }

    match ty {
        ResolvedType::List(inner) => format!("List[{}]", quoted(inner)),
        other => annotation(other),
    }
}

/// Expression turning a decoded JSON payload into the declared type
fn construct(ty: &ResolvedType, payload: &str) -> String {
    match ty {
        ResolvedType::Model(name) => format!("{}.from_dict({payload})", type_name(name)),
        ResolvedType::Enum(name) => format!("{}({payload})", type_name(name)),
        ResolvedType::List(inner) if needs_construction(inner) => {
            format!("[{} for item in {payload}]", construct(inner, "item"))
        }
        _ => payload.to_string(),
    }
}

fn needs_construction(ty: &ResolvedType) -> bool {
    match ty {
        ResolvedType::Model(_) | ResolvedType::Enum(_) => true,
        ResolvedType::List(inner) => needs_construction(inner),
        _ => false,
    }
}

fn identifier(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Python identifiers for one scope, in order: keywords and `also_reserved`
/// names get a trailing `_` and the results stay unique
fn escape_identifiers<'a>(
    names: impl IntoIterator<Item = &'a str>,
    also_reserved: &[&str],
) -> Vec<String> {
    let mut taken = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut escaped = if also_reserved.contains(&name) {
                format!("{name}_")
            } else {
                identifier(name)
            };
            while !taken.insert(escaped.clone()) {
                escaped.push('_');
            }
            escaped
        })
        .collect()
}

fn type_name(name: &str) -> String {
    identifier(name)
}

fn string_literal(value: &str) -> String {
    JsonValue::String(value.to_string()).to_string()
}

/// Python literal for a JSON value
fn python_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "None".to_string(),
        JsonValue::Bool(true) => "True".to_string(),
        JsonValue::Bool(false) => "False".to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => string_literal(s),
        JsonValue::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        JsonValue::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", string_literal(k), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}
