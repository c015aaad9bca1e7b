//! Emission of enums, models and aliases from named definitions

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::openapi::{ObjectSchema, SchemaNode};

use super::context::GenerationContext;
use super::naming::{sanitize_field_name, to_pascal_case, unique_member_names};
use super::resolver::flatten_composition;
use super::type_mapper::map_type;
use super::types::{
    AliasDef, Declaration, DefaultValue, EnumDef, EnumMember, FieldDef, ModelDef, ResolvedType,
};

/// What a named definition produced
#[derive(Debug, Clone, PartialEq)]
pub enum EmittedDefinition {
    Enum(EnumDef),
    Declaration(Declaration),
}

/// Emit the declaration for one named definition
pub fn emit_definition(
    name: &str,
    node: &SchemaNode,
    ctx: &mut GenerationContext<'_>,
) -> Result<EmittedDefinition> {
    let type_name = ctx
        .type_name(name)
        .map_or_else(|| to_pascal_case(name), str::to_string);
    let emitted = match node {
        SchemaNode::Enum(values) => EmittedDefinition::Enum(build_enum(&type_name, values)),
        SchemaNode::Object(object) => {
            EmittedDefinition::Declaration(Declaration::Model(emit_model(&type_name, object, ctx)?))
        }
        SchemaNode::Composition(members) => {
            let flattened = flatten_composition(members, name, ctx.document)?;
            EmittedDefinition::Declaration(Declaration::Model(emit_model(
                &type_name, &flattened, ctx,
            )?))
        }
        other => {
            let target = map_type(other, &type_name, "", ctx)?;
            EmittedDefinition::Declaration(Declaration::Alias(AliasDef {
                name: type_name,
                target,
            }))
        }
    };
    Ok(emitted)
}

/// Build an enum from its declared values; member names are unique
pub fn build_enum(name: &str, values: &[JsonValue]) -> EnumDef {
    let members = unique_member_names(values)
        .into_iter()
        .zip(values)
        .map(|(identifier, value)| EnumMember {
            identifier,
            value: value.clone(),
        })
        .collect();

    EnumDef {
        name: name.to_string(),
        members,
    }
}

/// Build a model from an object schema, one field per property in declaration
/// order.
///
/// A field typed by a synthesized enum defaults to the enum's first member.
/// Every other field is optional unless listed in `required`.
pub fn emit_model(
    name: &str,
    object: &ObjectSchema,
    ctx: &mut GenerationContext<'_>,
) -> Result<ModelDef> {
    let mut fields = Vec::with_capacity(object.properties.len());
    let mut taken = HashSet::new();

    for (property, schema) in &object.properties {
        let ty = map_type(schema, name, property, ctx)?;

        let default = match (schema, &ty) {
            (SchemaNode::Enum(_), ResolvedType::Enum(enum_name)) => ctx
                .registry
                .enums()
                .iter()
                .find(|e| &e.name == enum_name)
                .and_then(EnumDef::default_member)
                .map(|member| DefaultValue::EnumMember {
                    enum_name: enum_name.clone(),
                    member: member.identifier.clone(),
                }),
            _ => None,
        };

        let base = sanitize_field_name(property);
        let mut field_name = base.clone();
        let mut n = 2;
        while !taken.insert(field_name.clone()) {
            field_name = format!("{base}_{n}");
            n += 1;
        }

        fields.push(FieldDef {
            name: field_name,
            wire_name: property.clone(),
            ty,
            optional: !object.is_required(property),
            default,
        });
    }

    Ok(ModelDef {
        name: name.to_string(),
        description: object.description.clone(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::SchemaDocument;
    use serde_json::json;

    fn document(definitions: JsonValue) -> SchemaDocument {
        SchemaDocument::from_json(&json!({ "definitions": definitions })).unwrap()
    }

    fn emit(doc: &SchemaDocument, name: &str) -> (EmittedDefinition, Vec<EnumDef>) {
        let mut ctx = GenerationContext::new(doc);
        let node = doc.definitions.get(name).unwrap();
        let emitted = emit_definition(name, node, &mut ctx).unwrap();
        (emitted, ctx.registry.into_enums())
    }

    fn model(emitted: EmittedDefinition) -> ModelDef {
        match emitted {
            EmittedDefinition::Declaration(Declaration::Model(model)) => model,
            other => panic!("expected a model, got {other:?}"),
        }
    }

    #[test]
    fn test_enum_property_gets_synthesized_enum_and_default() {
        let doc = document(json!({
            "Pet": {"type": "object", "properties": {
                "status": {"type": "string", "enum": ["available", "sold"]}
            }}
        }));

        let (emitted, enums) = emit(&doc, "Pet");
        let pet = model(emitted);

        assert_eq!(enums.len(), 1);
        assert_eq!(enums[0].name, "PetStatus");
        let members: Vec<_> = enums[0].members.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(members, vec!["AVAILABLE", "SOLD"]);
        assert_eq!(enums[0].members[0].value, json!("available"));

        let status = &pet.fields[0];
        assert_eq!(status.name, "status");
        assert_eq!(status.ty, ResolvedType::Enum("PetStatus".into()));
        assert!(status.optional);
        assert_eq!(
            status.default,
            Some(DefaultValue::EnumMember {
                enum_name: "PetStatus".into(),
                member: "AVAILABLE".into(),
            })
        );
    }

    #[test]
    fn test_required_and_optional_fields() {
        let doc = document(json!({
            "User": {
                "type": "object",
                "required": ["id"],
                "description": "A user",
                "properties": {
                    "id": {"type": "integer"},
                    "nick-name": {"type": "string"}
                }
            }
        }));

        let user = model(emit(&doc, "User").0);
        assert_eq!(user.description.as_deref(), Some("A user"));
        assert!(!user.fields[0].optional);
        assert!(user.fields[1].optional);
        assert_eq!(user.fields[1].name, "nick_name");
        assert_eq!(user.fields[1].wire_name, "nick-name");
        assert!(user.fields.iter().all(|f| f.default.is_none()));
    }

    #[test]
    fn test_colliding_field_names_are_suffixed() {
        let doc = document(json!({
            "Rate": {"type": "object", "properties": {
                "x-limit": {"type": "integer"},
                "x_limit": {"type": "integer"}
            }}
        }));

        let rate = model(emit(&doc, "Rate").0);
        let names: Vec<_> = rate.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x_limit", "x_limit_2"]);
    }

    #[test]
    fn test_top_level_enum_definition() {
        let doc = document(json!({"order-status": {"type": "string", "enum": ["placed", "in-transit"]}}));

        let (emitted, _) = emit(&doc, "order-status");
        match emitted {
            EmittedDefinition::Enum(def) => {
                assert_eq!(def.name, "OrderStatus");
                assert_eq!(def.members[1].identifier, "IN_TRANSIT");
            }
            other => panic!("expected an enum, got {other:?}"),
        }
    }

    #[test]
    fn test_primitive_and_array_definitions_become_aliases() {
        let doc = document(json!({
            "PetId": {"type": "integer"},
            "Pet": {"type": "object"},
            "PetList": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}
        }));

        assert_eq!(
            emit(&doc, "PetId").0,
            EmittedDefinition::Declaration(Declaration::Alias(AliasDef {
                name: "PetId".into(),
                target: ResolvedType::Integer,
            }))
        );
        assert_eq!(
            emit(&doc, "PetList").0,
            EmittedDefinition::Declaration(Declaration::Alias(AliasDef {
                name: "PetList".into(),
                target: ResolvedType::list_of(ResolvedType::Model("Pet".into())),
            }))
        );
    }

    #[test]
    fn test_all_of_definition_is_flattened() {
        let doc = document(json!({
            "Animal": {"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}},
            "Dog": {"allOf": [
                {"$ref": "#/definitions/Animal"},
                {"type": "object", "properties": {"barks": {"type": "boolean"}}}
            ]}
        }));

        let dog = model(emit(&doc, "Dog").0);
        let names: Vec<_> = dog.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "barks"]);
        assert!(!dog.fields[0].optional);
        assert!(dog.fields[1].optional);
    }

    #[test]
    fn test_referenced_enum_has_no_default() {
        let doc = document(json!({
            "Color": {"type": "string", "enum": ["red"]},
            "Paint": {"type": "object", "properties": {"color": {"$ref": "#/definitions/Color"}}}
        }));

        let paint = model(emit(&doc, "Paint").0);
        assert_eq!(paint.fields[0].ty, ResolvedType::Enum("Color".into()));
        assert_eq!(paint.fields[0].default, None);
    }
}
