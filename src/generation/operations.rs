//! Classification of raw operations into [`OperationDef`]s

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::openapi::{ParameterLocation, RawOperation};

use super::context::GenerationContext;
use super::naming::{sanitize_field_name, to_pascal_case, to_snake_case};
use super::type_mapper::map_type;
use super::types::{
    OperationDef, OperationParam, OperationParamLocation, ResolvedType, ResponseMapping,
};

static PATH_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").unwrap());

const BODY_IDENTIFIER: &str = "data";
const DEFAULT_GROUP: &str = "default";

/// Class name of the service a tag is grouped under
pub fn service_class_name(tag: &str) -> String {
    format!("{}Service", to_pascal_case(tag))
}

/// Classify every operation of the document, in declaration order.
///
/// Callable names are unique within their service group.
pub fn classify_operations(ctx: &mut GenerationContext<'_>) -> Result<Vec<OperationDef>> {
    let document = ctx.document;
    let mut taken: HashMap<String, HashSet<String>> = HashMap::new();
    let mut operations = Vec::with_capacity(document.operations.len());

    for raw in &document.operations {
        let mut op = classify(raw, ctx)?;

        let names = taken.entry(service_class_name(&op.tag)).or_default();
        if !names.insert(op.name.clone()) {
            let base = op.name.clone();
            let mut n = 2;
            while !names.insert(format!("{base}_{n}")) {
                n += 1;
            }
            op.name = format!("{base}_{n}");
            tracing::debug!("Callable '{}' renamed to '{}' to avoid a clash", base, op.name);
        }

        operations.push(op);
    }

    tracing::debug!("Classified {} operations", operations.len());
    Ok(operations)
}

/// Classify one `(path, method)` entry
pub fn classify(raw: &RawOperation, ctx: &mut GenerationContext<'_>) -> Result<OperationDef> {
    let name = to_snake_case(&match &raw.operation_id {
        Some(id) => id.clone(),
        None => format!("{}_{}", raw.method.as_str(), raw.path.replace('/', "_")),
    });
    let context = to_pascal_case(&name);

    let mut params = Vec::new();
    let mut identifiers = HashSet::new();
    let mut path = raw.path.clone();
    let mut request_type = None;

    for spec in &raw.parameters {
        let location = match spec.location {
            ParameterLocation::Path => OperationParamLocation::Path,
            ParameterLocation::Query => OperationParamLocation::Query,
            ParameterLocation::Body => OperationParamLocation::Body,
            other => {
                tracing::debug!(
                    "Skipping {:?} parameter '{}' of {} {}",
                    other,
                    spec.name,
                    raw.method,
                    raw.path
                );
                continue;
            }
        };

        if location == OperationParamLocation::Body && request_type.is_some() {
            tracing::debug!("Ignoring extra body parameter '{}' of {}", spec.name, name);
            continue;
        }

        let ty = map_type(&spec.schema, &context, &spec.name, ctx)?;
        let identifier = if location == OperationParamLocation::Body {
            request_type = Some(ty.clone());
            unique_identifier(BODY_IDENTIFIER, &mut identifiers)
        } else {
            unique_identifier(&sanitize_field_name(&spec.name), &mut identifiers)
        };

        if location == OperationParamLocation::Path {
            path = path.replace(&format!("{{{}}}", spec.name), &format!("{{{identifier}}}"));
        }

        params.push(OperationParam {
            name: spec.name.clone(),
            identifier,
            location,
            ty,
            required: spec.required || location == OperationParamLocation::Path,
        });
    }

    // Placeholders without a declared parameter still need an argument
    for capture in PATH_PLACEHOLDER.captures_iter(&raw.path) {
        let placeholder = &capture[1];
        let declared = raw
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Path && p.name == placeholder);
        if declared {
            continue;
        }
        let identifier = unique_identifier(&sanitize_field_name(placeholder), &mut identifiers);
        path = path.replace(&format!("{{{placeholder}}}"), &format!("{{{identifier}}}"));
        params.push(OperationParam {
            name: placeholder.to_string(),
            identifier,
            location: OperationParamLocation::Path,
            ty: ResolvedType::String,
            required: true,
        });
    }

    if let (Some(body), None) = (&raw.request_body, &request_type) {
        let ty = map_type(&body.schema, &context, "Body", ctx)?;
        request_type = Some(ty.clone());
        params.push(OperationParam {
            name: "body".to_string(),
            identifier: unique_identifier(BODY_IDENTIFIER, &mut identifiers),
            location: OperationParamLocation::Body,
            ty,
            required: body.required,
        });
    }

    let mut responses = Vec::new();
    for response in &raw.responses {
        let Ok(status) = response.status.parse::<u16>() else {
            tracing::debug!("Skipping '{}' response of {}", response.status, name);
            continue;
        };
        let Some(schema) = &response.schema else {
            continue;
        };
        let ty = map_type(schema, &context, &format!("Response{status}"), ctx)?;
        if !ty.is_dynamic() {
            responses.push(ResponseMapping { status, ty });
        }
    }

    Ok(OperationDef {
        tag: group_tag(raw),
        return_type: return_type(&responses),
        name,
        method: raw.method,
        path,
        params,
        request_type,
        responses,
        summary: raw.summary.clone().or_else(|| raw.description.clone()),
    })
}

/// First declared tag, else the first path segment, else `default`
fn group_tag(raw: &RawOperation) -> String {
    raw.tags
        .first()
        .cloned()
        .or_else(|| {
            raw.path
                .split('/')
                .map(|segment| segment.trim_matches(|c| c == '{' || c == '}'))
                .find(|segment| !segment.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_GROUP.to_string())
}

/// The single distinct response type, or Dynamic
fn return_type(responses: &[ResponseMapping]) -> ResolvedType {
    let mut distinct: Vec<&ResolvedType> = Vec::new();
    for response in responses {
        if !distinct.contains(&&response.ty) {
            distinct.push(&response.ty);
        }
    }
    match distinct.as_slice() {
        [single] => (*single).clone(),
        _ => ResolvedType::Dynamic,
    }
}

fn unique_identifier(base: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}_{n}");
        n += 1;
    }
    candidate
}
