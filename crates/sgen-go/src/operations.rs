//! Types derived from operations: query parameter structs and JSON bodies.

use log::warn;
use sgen_core::ResolveError;
use sgen_core::graph::Scalar;
use sgen_core::ir::{ResolvedProperty, ResolvedSchema, SchemaKind, TypeDefinition};
use sgen_core::naming::{child_path, to_type_name};
use sgen_core::parse::parameter::{Parameter, ParameterLocation};
use sgen_core::parse::refs::{resolve_parameter, resolve_request_body};
use sgen_core::parse::spec::OpenApiSpec;
use sgen_core::validation::derive_rules;

use crate::render::{field_lines, struct_decl};
use crate::resolver::{any_schema, resolve_type};
use crate::type_mapper::scalar_to_go;

const JSON_MEDIA_TYPE: &str = "application/json";

/// `<OpId>Params` and `<OpId>JSONBody` types for every operation with an
/// `operationId`, in path then method order.
pub fn operation_types(spec: &OpenApiSpec) -> Result<Vec<TypeDefinition>, ResolveError> {
    let components = spec.components.as_ref();
    let mut paths: Vec<_> = spec.paths.iter().collect();
    paths.sort_by(|a, b| a.0.cmp(b.0));

    let mut defs = Vec::new();
    for (_, item) in paths {
        for op in item.operations() {
            let Some(op_id) = op.operation_id.as_deref() else {
                continue;
            };
            let base = to_type_name(op_id);

            // Operation-level parameters override path-level ones of the same name.
            let mut query: Vec<&Parameter> = Vec::new();
            for param in item.parameters.iter().chain(&op.parameters) {
                let param = resolve_parameter(components, param)?;
                if param.location != ParameterLocation::Query {
                    continue;
                }
                match query.iter_mut().find(|p| p.name == param.name) {
                    Some(slot) => *slot = param,
                    None => query.push(param),
                }
            }
            if !query.is_empty() {
                let name = format!("{base}Params");
                defs.push(TypeDefinition {
                    schema: params_struct(&query, &name)?,
                    json_name: op_id.to_string(),
                    name,
                });
            }

            if let Some(body) = &op.request_body {
                let body = resolve_request_body(components, body)?;
                if let Some(schema) = body.json_schema() {
                    let name = format!("{base}JSONBody");
                    defs.push(TypeDefinition {
                        schema: resolve_type(Some(schema), std::slice::from_ref(&name))?,
                        json_name: op_id.to_string(),
                        name,
                    });
                }
            }
        }
    }
    Ok(defs)
}

fn params_struct(params: &[&Parameter], type_name: &str) -> Result<ResolvedSchema, ResolveError> {
    let path = vec![type_name.to_string()];
    let mut out = ResolvedSchema {
        kind: SchemaKind::Structured,
        ..ResolvedSchema::default()
    };
    for param in params {
        let schema = parameter_type(param, &child_path(&path, &param.name))?;
        let inline = param.schema.as_ref().and_then(|s| s.as_schema());
        out.properties.push(ResolvedProperty {
            name: param.name.clone(),
            schema,
            required: param.required,
            nullable: inline.is_some_and(|s| s.is_nullable()),
            description: param.description.clone(),
            validation: derive_rules(inline, param.required),
            search_tag: String::new(),
        });
    }
    out.type_decl = struct_decl(&field_lines(&out.properties));
    Ok(out)
}

/// The type of one parameter: its `schema`, or failing that its `content`.
/// Content other than a single JSON media type is carried as a plain string.
pub fn parameter_type(param: &Parameter, path: &[String]) -> Result<ResolvedSchema, ResolveError> {
    if let Some(schema) = &param.schema {
        return resolve_type(Some(schema), path);
    }
    if param.content.is_empty() {
        warn!("parameter {} has neither schema nor content", param.name);
        return Ok(any_schema());
    }
    match param.content.get(JSON_MEDIA_TYPE) {
        Some(media) if param.content.len() == 1 => resolve_type(media.schema.as_ref(), path),
        _ => Ok(ResolvedSchema {
            kind: SchemaKind::Scalar,
            type_decl: scalar_to_go(Scalar::String).to_string(),
            ..ResolvedSchema::default()
        }),
    }
}
