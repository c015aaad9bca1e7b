//! Dependency ordering of named definitions
//!
//! Definitions are peeled off in rounds: a round takes, in declaration order,
//! every definition whose references have all been emitted already. When a
//! round comes up empty the remaining graph is cyclic; one definition on a
//! cycle is then emitted anyway and peeling resumes. Self-references never
//! block a definition.

use std::collections::HashSet;

use crate::error::{GenerationError, Result};
use crate::openapi::{Definitions, ObjectSchema, SchemaDocument, SchemaNode};

use super::context::GenerationContext;
use super::model::{EmittedDefinition, emit_definition};
use super::types::Declaration;

/// Order definition names so that each appears after the definitions it
/// references, cycles aside
pub fn definition_order(definitions: &Definitions) -> Result<Vec<String>> {
    let mut pending: Vec<(&str, Vec<String>)> = Vec::with_capacity(definitions.len());
    for (name, node) in definitions.iter() {
        let mut deps = node.references();
        deps.retain(|dep| dep != name);
        if let Some(missing) = deps.iter().find(|dep| !definitions.contains(dep)) {
            return Err(GenerationError::unresolved(
                missing.as_str(),
                format!("definition '{name}'"),
            ));
        }
        pending.push((name.as_str(), deps));
    }

    let mut emitted: HashSet<&str> = HashSet::with_capacity(pending.len());
    let mut order = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let (ready, blocked): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|(_, deps)| deps.iter().all(|dep| emitted.contains(dep.as_str())));

        pending = if ready.is_empty() {
            let mut blocked = blocked;
            let index = cycle_member(&blocked, &emitted);
            let (forced, _) = blocked.remove(index);
            tracing::warn!(
                "Reference cycle through '{}', emitting it before its dependencies",
                forced
            );
            emitted.insert(forced);
            order.push(forced.to_string());
            blocked
        } else {
            for (name, _) in ready {
                emitted.insert(name);
                order.push(name.to_string());
            }
            blocked
        };
    }

    Ok(order)
}

/// Index of a blocked definition that lies on a cycle, found by following
/// unemitted dependencies from the first blocked definition until one repeats
fn cycle_member(blocked: &[(&str, Vec<String>)], emitted: &HashSet<&str>) -> usize {
    let mut seen = Vec::with_capacity(blocked.len());
    let mut current = 0;
    while !seen.contains(&current) {
        seen.push(current);
        let next = blocked[current]
            .1
            .iter()
            .find(|dep| !emitted.contains(dep.as_str()))
            .and_then(|dep| blocked.iter().position(|(name, _)| *name == dep.as_str()));
        match next {
            Some(index) => current = index,
            None => break,
        }
    }
    current
}

/// Emit every named definition in dependency order.
///
/// Enum definitions go to the context's registry; models and aliases are
/// returned, each preceded by the inline models it introduced.
pub fn resolve(ctx: &mut GenerationContext<'_>) -> Result<Vec<Declaration>> {
    let order = definition_order(&ctx.document.definitions)?;
    let mut declarations = Vec::with_capacity(order.len());

    for name in &order {
        let Some(node) = ctx.definition(name) else {
            continue;
        };
        match emit_definition(name, node, ctx)? {
            EmittedDefinition::Enum(def) => {
                if !ctx.registry.register_enum(def) {
                    tracing::debug!("Enum '{}' already registered, keeping the first", name);
                }
            }
            EmittedDefinition::Declaration(declaration) => {
                declarations.extend(
                    ctx.registry
                        .take_inline_models()
                        .into_iter()
                        .map(Declaration::Model),
                );
                declarations.push(declaration);
            }
        }
    }

    tracing::debug!("Resolved {} declarations", declarations.len());
    Ok(declarations)
}

/// Merge `allOf` members into one object schema.
///
/// Referenced members are followed through the document's definitions.
/// Properties keep their first position; a later member redefining a property
/// replaces its schema. `required` lists are unioned and the last description
/// wins.
pub fn flatten_composition(
    members: &[SchemaNode],
    owner: &str,
    document: &SchemaDocument,
) -> Result<ObjectSchema> {
    let mut merged = ObjectSchema::default();
    let mut visiting = vec![owner.to_string()];
    for member in members {
        merge_member(member, owner, document, &mut merged, &mut visiting)?;
    }
    Ok(merged)
}

fn merge_member(
    node: &SchemaNode,
    owner: &str,
    document: &SchemaDocument,
    merged: &mut ObjectSchema,
    visiting: &mut Vec<String>,
) -> Result<()> {
    match node {
        SchemaNode::Object(object) => {
            for (name, schema) in &object.properties {
                match merged.properties.iter_mut().find(|(prop, _)| prop == name) {
                    Some(existing) => existing.1 = schema.clone(),
                    None => merged.properties.push((name.clone(), schema.clone())),
                }
            }
            for name in &object.required {
                if !merged.is_required(name) {
                    merged.required.push(name.clone());
                }
            }
            if object.description.is_some() {
                merged.description = object.description.clone();
            }
        }
        SchemaNode::Reference(name) => {
            if visiting.contains(name) {
                tracing::warn!("allOf of '{}' loops back to '{}', skipping", owner, name);
                return Ok(());
            }
            let target = document.definitions.get(name).ok_or_else(|| {
                GenerationError::unresolved(name.as_str(), format!("allOf of '{owner}'"))
            })?;
            visiting.push(name.clone());
            merge_member(target, owner, document, merged, visiting)?;
            visiting.pop();
        }
        SchemaNode::Composition(members) => {
            for member in members {
                merge_member(member, owner, document, merged, visiting)?;
            }
        }
        _ => {
            tracing::debug!("Ignoring a non-object allOf member of '{}'", owner);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, json};
    use tracing_test::traced_test;

    fn document(definitions: JsonValue) -> SchemaDocument {
        SchemaDocument::from_json(&json!({ "definitions": definitions })).unwrap()
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_dependencies_come_first() {
        let doc = document(json!({
            "Order": {"type": "object", "properties": {"pet": {"$ref": "#/definitions/Pet"}}},
            "Pet": {"type": "object", "properties": {"tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}}}},
            "Tag": {"type": "object", "properties": {"name": {"type": "string"}}}
        }));

        let order = definition_order(&doc.definitions).unwrap();
        assert_eq!(order, vec!["Tag", "Pet", "Order"]);
    }

    #[test]
    fn test_independent_definitions_keep_declaration_order() {
        let doc = document(json!({
            "Zebra": {"type": "object"},
            "Apple": {"type": "object"},
            "Mango": {"type": "string"}
        }));

        let order = definition_order(&doc.definitions).unwrap();
        assert_eq!(order, vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn test_self_reference_does_not_block() {
        let doc = document(json!({
            "Node": {"type": "object", "properties": {
                "children": {"type": "array", "items": {"$ref": "#/definitions/Node"}}
            }}
        }));

        assert_eq!(definition_order(&doc.definitions).unwrap(), vec!["Node"]);
    }

    #[test]
    fn test_cycle_terminates_with_every_definition_once() {
        let doc = document(json!({
            "Leaf": {"type": "object", "properties": {"a": {"$ref": "#/definitions/A"}}},
            "A": {"type": "object", "properties": {"b": {"$ref": "#/definitions/B"}}},
            "B": {"type": "object", "properties": {"a": {"$ref": "#/definitions/A"}}},
            "Plain": {"type": "object"}
        }));

        let order = definition_order(&doc.definitions).unwrap();
        assert_eq!(order.len(), 4);
        let distinct: HashSet<_> = order.iter().collect();
        assert_eq!(distinct.len(), 4);

        // Leaf only hangs off the cycle, so A is the one forced out
        assert_eq!(order, vec!["Plain", "A", "Leaf", "B"]);
        assert!(position(&order, "A") < position(&order, "Leaf"));
    }

    #[test]
    #[traced_test]
    fn test_cycle_is_logged() {
        let doc = document(json!({
            "Parent": {"type": "object", "properties": {"child": {"$ref": "#/definitions/Child"}}},
            "Child": {"type": "object", "properties": {"parent": {"$ref": "#/definitions/Parent"}}}
        }));

        let order = definition_order(&doc.definitions).unwrap();
        assert_eq!(order, vec!["Parent", "Child"]);
        assert!(logs_contain("Reference cycle through 'Parent'"));
    }

    #[test]
    fn test_dangling_reference_is_an_error() {
        let doc = document(json!({
            "Pet": {"type": "object", "properties": {"owner": {"$ref": "#/definitions/Person"}}}
        }));

        let err = definition_order(&doc.definitions).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::UnresolvedReference { ref name, .. } if name == "Person"
        ));
        assert!(err.to_string().contains("Person"));
    }

    #[test]
    fn test_resolve_places_inline_models_before_their_owner() {
        let doc = document(json!({
            "Foo": {"type": "object", "properties": {
                "items": {"type": "array", "items": {"type": "object", "properties": {"n": {"type": "integer"}}}}
            }}
        }));
        let mut ctx = GenerationContext::new(&doc);

        let declarations = resolve(&mut ctx).unwrap();
        let names: Vec<_> = declarations.iter().map(Declaration::name).collect();
        assert_eq!(names, vec!["FooItemsItem", "Foo"]);
    }

    #[test]
    fn test_resolve_registers_top_level_enums() {
        let doc = document(json!({
            "Color": {"type": "string", "enum": ["red", "green"]},
            "Paint": {"type": "object", "properties": {"color": {"$ref": "#/definitions/Color"}}}
        }));
        let mut ctx = GenerationContext::new(&doc);

        let declarations = resolve(&mut ctx).unwrap();
        assert_eq!(declarations.len(), 1);
        assert_eq!(ctx.registry.enums()[0].name, "Color");
    }

    #[test]
    fn test_flatten_composition_merges_members() {
        let doc = document(json!({
            "Base": {"type": "object", "required": ["id"], "properties": {
                "id": {"type": "integer"},
                "name": {"type": "string"}
            }}
        }));
        let members = vec![
            SchemaNode::from_json(&json!({"$ref": "#/definitions/Base"})),
            SchemaNode::from_json(&json!({
                "type": "object",
                "required": ["name"],
                "properties": {"name": {"type": "integer"}, "extra": {"type": "boolean"}}
            })),
        ];

        let merged = flatten_composition(&members, "Derived", &doc).unwrap();
        let names: Vec<_> = merged.properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "extra"]);
        assert_eq!(
            merged.property("name"),
            Some(&SchemaNode::from_json(&json!({"type": "integer"})))
        );
        assert_eq!(merged.required, vec!["id", "name"]);
    }

    #[test]
    fn test_flatten_composition_stops_on_loops() {
        let doc = document(json!({
            "A": {"allOf": [{"$ref": "#/definitions/B"}]},
            "B": {"allOf": [{"$ref": "#/definitions/A"}, {"type": "object", "properties": {"x": {"type": "string"}}}]}
        }));
        let Some(SchemaNode::Composition(members)) = doc.definitions.get("A") else {
            panic!("A should parse as a composition");
        };

        let merged = flatten_composition(members, "A", &doc).unwrap();
        assert_eq!(merged.properties.len(), 1);
    }
}
