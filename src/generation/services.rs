//! Service methods and their grouping into service classes

use super::naming::to_snake_case;
use super::operations::service_class_name;
use super::types::{OperationDef, ServiceGroup, ServiceMethod};

/// Describe the HTTP call one operation makes
pub fn emit_method(op: &OperationDef) -> ServiceMethod {
    let mut arguments = op.params.clone();
    // Required arguments precede optional ones; the sort is stable
    arguments.sort_by_key(|param| !param.required);

    ServiceMethod {
        name: op.name.clone(),
        http_method: op.method.as_str().to_string(),
        url_template: op.path.clone(),
        query: op
            .query_params()
            .map(|param| (param.name.clone(), param.identifier.clone()))
            .collect(),
        body: op.body_param().map(|param| param.identifier.clone()),
        arguments,
        request_type: op.request_type.clone(),
        response_branches: op.responses.clone(),
        return_type: op.return_type.clone(),
        summary: op.summary.clone(),
    }
}

/// Group operations by service class, in order of first appearance
pub fn group_services(operations: &[OperationDef]) -> Vec<ServiceGroup> {
    let mut groups: Vec<ServiceGroup> = Vec::new();

    for op in operations {
        let class_name = service_class_name(&op.tag);
        let method = emit_method(op);
        match groups.iter_mut().find(|g| g.class_name == class_name) {
            Some(group) => group.methods.push(method),
            None => groups.push(ServiceGroup {
                tag: op.tag.clone(),
                accessor: to_snake_case(&class_name),
                class_name,
                methods: vec![method],
            }),
        }
    }

    groups
}
