//! Per-run generation state
//!
//! A [`GenerationContext`] is created for one run and dropped with it. It owns
//! the registries of synthesized enums and inline models so nothing leaks from
//! one document to the next.

use std::collections::{HashMap, HashSet};

use crate::openapi::{SchemaDocument, SchemaNode};

use super::naming::to_pascal_case;
use super::types::{EnumDef, ModelDef};

/// Enums and inline models discovered while mapping types
#[derive(Debug, Default)]
pub struct TypeRegistry {
    enums: Vec<EnumDef>,
    inline_models: Vec<ModelDef>,
    names: HashSet<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a generated type with this name is already known
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Claim a type name, suffixing `_2`, `_3`, ... while `base` is taken
    pub fn claim(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 2;
        while !self.names.insert(name.clone()) {
            name = format!("{base}_{n}");
            n += 1;
        }
        name
    }

    /// Register an enum; returns false when the name was already registered
    pub fn register_enum(&mut self, def: EnumDef) -> bool {
        if self.enums.iter().any(|e| e.name == def.name) {
            return false;
        }
        self.names.insert(def.name.clone());
        self.enums.push(def);
        true
    }

    /// Register an inline model; returns false when the name was already registered
    pub fn register_inline_model(&mut self, def: ModelDef) -> bool {
        if self.inline_models.iter().any(|m| m.name == def.name) {
            return false;
        }
        self.names.insert(def.name.clone());
        self.inline_models.push(def);
        true
    }

    pub fn enums(&self) -> &[EnumDef] {
        &self.enums
    }

    /// Inline models registered since the last call, in registration order
    pub fn take_inline_models(&mut self) -> Vec<ModelDef> {
        std::mem::take(&mut self.inline_models)
    }

    pub fn into_enums(self) -> Vec<EnumDef> {
        self.enums
    }
}

/// What a named definition turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Model,
    Enum,
    Alias,
}

impl DefinitionKind {
    pub fn of(node: &SchemaNode) -> Self {
        match node {
            SchemaNode::Enum(_) => DefinitionKind::Enum,
            SchemaNode::Object(_) | SchemaNode::Composition(_) => DefinitionKind::Model,
            SchemaNode::Primitive(_)
            | SchemaNode::Array(_)
            | SchemaNode::Reference(_)
            | SchemaNode::Untyped => DefinitionKind::Alias,
        }
    }
}

/// State threaded through every mapper and emitter call of one run
pub struct GenerationContext<'a> {
    pub document: &'a SchemaDocument,
    pub registry: TypeRegistry,
    /// Definition name → generated type name
    type_names: HashMap<String, String>,
}

impl<'a> GenerationContext<'a> {
    /// Every definition claims its type name up front, in declaration order,
    /// so synthesized enums and inline models never take a definition's name.
    pub fn new(document: &'a SchemaDocument) -> Self {
        let mut registry = TypeRegistry::new();
        let mut type_names = HashMap::with_capacity(document.definitions.len());

        for name in document.definitions.names() {
            let base = to_pascal_case(name);
            let type_name = registry.claim(&base);
            if type_name != base {
                tracing::warn!(
                    "Definition '{}' clashes with an earlier one, generating it as '{}'",
                    name,
                    type_name
                );
            }
            type_names.insert(name.clone(), type_name);
        }

        Self {
            document,
            registry,
            type_names,
        }
    }

    /// Generated type name of a named definition
    pub fn type_name(&self, definition: &str) -> Option<&str> {
        self.type_names.get(definition).map(String::as_str)
    }

    pub fn definition(&self, name: &str) -> Option<&'a SchemaNode> {
        self.document.definitions.get(name)
    }

    pub fn definition_kind(&self, name: &str) -> Option<DefinitionKind> {
        self.definition(name).map(DefinitionKind::of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enum_def(name: &str) -> EnumDef {
        EnumDef {
            name: name.to_string(),
            members: vec![],
        }
    }

    #[test]
    fn test_register_enum_is_idempotent() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_enum(enum_def("PetStatus")));
        assert!(!registry.register_enum(enum_def("PetStatus")));
        assert_eq!(registry.enums().len(), 1);
        assert!(registry.contains("PetStatus"));
    }

    #[test]
    fn test_take_inline_models_drains() {
        let mut registry = TypeRegistry::new();
        registry.register_inline_model(ModelDef {
            name: "FooItemsItem".to_string(),
            description: None,
            fields: vec![],
        });

        assert_eq!(registry.take_inline_models().len(), 1);
        assert!(registry.take_inline_models().is_empty());
        assert!(registry.contains("FooItemsItem"));
    }

    #[test]
    fn test_claim_suffixes_taken_names() {
        let mut registry = TypeRegistry::new();
        assert_eq!(registry.claim("FooBar"), "FooBar");
        assert_eq!(registry.claim("FooBar"), "FooBar_2");
        assert_eq!(registry.claim("FooBar"), "FooBar_3");
        assert!(registry.contains("FooBar_2"));
    }

    #[test]
    fn test_definitions_claim_distinct_type_names() {
        let doc = SchemaDocument::from_json(&json!({"definitions": {
            "pet-status": {"enum": ["a"]},
            "PetStatus": {"enum": ["b"]},
            "Pet": {"type": "object"}
        }}))
        .unwrap();
        let ctx = GenerationContext::new(&doc);

        assert_eq!(ctx.type_name("pet-status"), Some("PetStatus"));
        assert_eq!(ctx.type_name("PetStatus"), Some("PetStatus_2"));
        assert_eq!(ctx.type_name("Pet"), Some("Pet"));
        assert_eq!(ctx.type_name("Missing"), None);
        assert!(ctx.registry.contains("PetStatus_2"));
    }

    #[test]
    fn test_definition_kind() {
        assert_eq!(
            DefinitionKind::of(&SchemaNode::from_json(&json!({"enum": ["a"]}))),
            DefinitionKind::Enum
        );
        assert_eq!(
            DefinitionKind::of(&SchemaNode::from_json(&json!({"type": "object"}))),
            DefinitionKind::Model
        );
        assert_eq!(
            DefinitionKind::of(&SchemaNode::from_json(&json!({"type": "integer"}))),
            DefinitionKind::Alias
        );
    }
}
