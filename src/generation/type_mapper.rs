//! Schema fragment → [`ResolvedType`] mapping
//!
//! | schema                               | resolved type                          |
//! |--------------------------------------|----------------------------------------|
//! | `string`                             | `String`                               |
//! | `integer`, `number`                  | `Integer`                              |
//! | `boolean`                            | `Boolean`                              |
//! | `$ref`                               | model, enum or alias of the definition |
//! | `enum`                               | synthesized `<Context><Property>` enum |
//! | `array`                              | `List` of the item type                |
//! | inline object with properties        | synthesized `<Context><Property>` model|
//! | anything else                        | `Dynamic`                              |
//!
//! Array items are mapped under the property name suffixed with `_Item`, so an
//! inline object inside `Foo.items` becomes `FooItemsItem`.

use crate::error::{GenerationError, Result};
use crate::openapi::{ObjectSchema, PrimitiveKind, SchemaNode};

use super::context::{DefinitionKind, GenerationContext};
use super::model::{build_enum, emit_model};
use super::naming::to_pascal_case;
use super::resolver::flatten_composition;
use super::types::ResolvedType;

/// Map a schema fragment found at `context_name.property_name`
pub fn map_type(
    node: &SchemaNode,
    context_name: &str,
    property_name: &str,
    ctx: &mut GenerationContext<'_>,
) -> Result<ResolvedType> {
    match node {
        SchemaNode::Primitive(kind) => Ok(map_primitive(*kind)),
        SchemaNode::Reference(name) => map_reference(name, context_name, property_name, ctx),
        SchemaNode::Enum(values) => {
            let name = synthesized_name(context_name, property_name, ctx);
            ctx.registry.register_enum(build_enum(&name, values));
            Ok(ResolvedType::Enum(name))
        }
        SchemaNode::Array(items) => {
            let item_property = format!("{property_name}_Item");
            let item_type = match items {
                Some(items) => map_type(items, context_name, &item_property, ctx)?,
                None => ResolvedType::Dynamic,
            };
            Ok(ResolvedType::list_of(item_type))
        }
        SchemaNode::Object(object) if !object.properties.is_empty() => {
            let name = synthesized_name(context_name, property_name, ctx);
            inline_model(name, object, ctx)
        }
        SchemaNode::Composition(members) => match members.as_slice() {
            [single] => map_type(single, context_name, property_name, ctx),
            _ => {
                let flattened = flatten_composition(members, context_name, ctx.document)?;
                if flattened.properties.is_empty() {
                    return Ok(degrade(context_name, property_name));
                }
                let name = synthesized_name(context_name, property_name, ctx);
                inline_model(name, &flattened, ctx)
            }
        },
        SchemaNode::Object(_) | SchemaNode::Untyped => Ok(degrade(context_name, property_name)),
    }
}

fn map_primitive(kind: PrimitiveKind) -> ResolvedType {
    match kind {
        PrimitiveKind::String => ResolvedType::String,
        PrimitiveKind::Integer | PrimitiveKind::Number => ResolvedType::Integer,
        PrimitiveKind::Boolean => ResolvedType::Boolean,
    }
}

fn map_reference(
    name: &str,
    context_name: &str,
    property_name: &str,
    ctx: &GenerationContext<'_>,
) -> Result<ResolvedType> {
    let (Some(kind), Some(type_name)) = (ctx.definition_kind(name), ctx.type_name(name)) else {
        return Err(GenerationError::unresolved(
            name,
            location(context_name, property_name),
        ));
    };

    let type_name = type_name.to_string();
    Ok(match kind {
        DefinitionKind::Model => ResolvedType::Model(type_name),
        DefinitionKind::Enum => ResolvedType::Enum(type_name),
        DefinitionKind::Alias => ResolvedType::Alias(type_name),
    })
}

fn inline_model(
    name: String,
    object: &ObjectSchema,
    ctx: &mut GenerationContext<'_>,
) -> Result<ResolvedType> {
    let model = emit_model(&name, object, ctx)?;
    ctx.registry.register_inline_model(model);
    Ok(ResolvedType::Model(name))
}

/// A fresh `<Context><Property>` name; a name already taken by a definition
/// or an earlier synthesized type gets a numeric suffix
fn synthesized_name(
    context_name: &str,
    property_name: &str,
    ctx: &mut GenerationContext<'_>,
) -> String {
    let base = to_pascal_case(&format!("{context_name}_{property_name}"));
    let name = ctx.registry.claim(&base);
    if name != base {
        tracing::debug!(
            "Type name '{}' for {} is taken, using '{}'",
            base,
            location(context_name, property_name),
            name
        );
    }
    name
}

fn location(context_name: &str, property_name: &str) -> String {
    if property_name.is_empty() {
        format!("'{context_name}'")
    } else {
        format!("'{context_name}.{property_name}'")
    }
}

fn degrade(context_name: &str, property_name: &str) -> ResolvedType {
    tracing::debug!(
        "No concrete type for {}, using a dynamic type",
        location(context_name, property_name)
    );
    ResolvedType::Dynamic
}
