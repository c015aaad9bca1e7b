//! Assembly of the complete [`ClientModule`]

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::openapi::SchemaDocument;

use super::context::GenerationContext;
use super::naming::to_pascal_case;
use super::operations::classify_operations;
use super::resolver::resolve;
use super::services::group_services;
use super::types::{AuthHeaderPolicy, ClientModule, Declaration, FacadeDef, ServiceAccessor};

/// Build the client for a parsed document.
///
/// The module lists enums first, then models and aliases in dependency order,
/// then the service groups and finally the façade. Any unresolved reference
/// aborts the run.
pub fn generate(document: &SchemaDocument, config: &GeneratorConfig) -> Result<ClientModule> {
    let mut ctx = GenerationContext::new(document);

    let mut declarations = resolve(&mut ctx)?;
    let operations = classify_operations(&mut ctx)?;
    // Inline request and response models introduced by operations
    declarations.extend(
        ctx.registry
            .take_inline_models()
            .into_iter()
            .map(Declaration::Model),
    );

    let services = group_services(&operations);
    let facade = FacadeDef {
        name: to_pascal_case(&config.client_name),
        default_base_url: config
            .base_url
            .clone()
            .or_else(|| document.base_url.clone()),
        auth: AuthHeaderPolicy::BearerWhenKeyPresent,
        accessors: services
            .iter()
            .map(|group| ServiceAccessor {
                name: group.accessor.clone(),
                class_name: group.class_name.clone(),
            })
            .collect(),
    };

    let enums = ctx.registry.into_enums();
    tracing::info!(
        enums = enums.len(),
        declarations = declarations.len(),
        services = services.len(),
        "Generated client '{}'",
        facade.name
    );

    Ok(ClientModule {
        title: document.title.clone(),
        enums,
        declarations,
        services,
        facade,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::generation::types::ResolvedType;
    use serde_json::json;

    fn petstore() -> SchemaDocument {
        SchemaDocument::from_json(&json!({
            "swagger": "2.0",
            "info": {"title": "Petstore"},
            "host": "petstore.example.com",
            "basePath": "/v2",
            "schemes": ["https"],
            "definitions": {
                "Pet": {"type": "object", "required": ["name"], "properties": {
                    "name": {"type": "string"},
                    "category": {"$ref": "#/definitions/Category"},
                    "status": {"type": "string", "enum": ["available", "sold"]}
                }},
                "Category": {"type": "object", "properties": {"id": {"type": "integer"}}}
            },
            "paths": {
                "/pet/{petId}": {
                    "get": {
                        "operationId": "getPetById",
                        "tags": ["pet"],
                        "parameters": [{"name": "petId", "in": "path", "required": true, "type": "integer"}],
                        "responses": {"200": {"schema": {"$ref": "#/definitions/Pet"}}}
                    }
                },
                "/store/inventory": {
                    "get": {
                        "operationId": "getInventory",
                        "tags": ["store"],
                        "responses": {"200": {"schema": {"type": "object", "properties": {
                            "total": {"type": "integer"}
                        }}}}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_generate_assembles_every_part() {
        let module = generate(&petstore(), &GeneratorConfig::default()).unwrap();

        assert_eq!(module.title.as_deref(), Some("Petstore"));
        assert_eq!(module.enums.len(), 1);
        assert!(module.enum_named("PetStatus").is_some());
        assert_eq!(
            module.declaration_order(),
            vec!["Category", "Pet", "GetInventoryResponse200"]
        );

        let pet_service = module.service_named("PetService").unwrap();
        assert_eq!(pet_service.methods[0].name, "get_pet_by_id");
        assert_eq!(
            pet_service.methods[0].return_type,
            ResolvedType::Model("Pet".into())
        );

        assert_eq!(module.facade.name, "APIClient");
        assert_eq!(
            module.facade.default_base_url.as_deref(),
            Some("https://petstore.example.com/v2")
        );
        let accessors: Vec<_> = module.facade.accessors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(accessors, vec!["pet_service", "store_service"]);
    }

    #[test]
    fn test_config_overrides_name_and_base_url() {
        let config = GeneratorConfig {
            client_name: "petstore client".to_string(),
            base_url: Some("http://localhost:8080".to_string()),
            ..GeneratorConfig::default()
        };

        let module = generate(&petstore(), &config).unwrap();
        assert_eq!(module.facade.name, "PetstoreClient");
        assert_eq!(
            module.facade.default_base_url.as_deref(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_runs_do_not_share_registries() {
        let doc = petstore();
        let first = generate(&doc, &GeneratorConfig::default()).unwrap();
        let second = generate(&doc, &GeneratorConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dangling_reference_aborts() {
        let doc = SchemaDocument::from_json(&json!({
            "definitions": {"Pet": {"type": "object", "properties": {
                "owner": {"$ref": "#/definitions/Person"}
            }}}
        }))
        .unwrap();

        let err = generate(&doc, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GenerationError::UnresolvedReference { .. }));
    }
}
