use minijinja::{Environment, context};
use sgen_core::GeneratorError;
use sgen_core::ir::{SchemaKind, TypeDefinition};
use sgen_core::naming::to_type_name;

const OPENAPI_TYPES_IMPORT: &str =
    "openapi_types \"github.com/deepmap/oapi-codegen/pkg/types\"";

/// Emit `types.gen.go`: package clause, imports, enum constants, one type
/// declaration per definition, and accessors for open structs.
pub fn emit_types(types: &[TypeDefinition], package: &str) -> Result<String, GeneratorError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("types.go.j2", include_str!("../../templates/types.go.j2"))
        .expect("template should be valid");
    let tmpl = env
        .get_template("types.go.j2")
        .map_err(|e| GeneratorError::Render(e.to_string()))?;

    let decls: Vec<&str> = types.iter().map(|t| t.schema.type_decl()).collect();
    let (std_imports, ext_imports) = detect_imports(&decls);

    let enums: Vec<minijinja::Value> = types.iter().filter_map(enum_to_ctx).collect();
    let items: Vec<minijinja::Value> = types
        .iter()
        .map(|t| {
            context! {
                name => t.name.clone(),
                json_name => t.json_name.clone(),
                decl => t.schema.type_decl().to_string(),
            }
        })
        .collect();
    let accessors: Vec<minijinja::Value> = types
        .iter()
        .filter(|t| t.schema.kind == SchemaKind::Structured)
        .filter_map(|t| {
            let value = t.schema.additional_properties.as_ref()?;
            Some(context! {
                name => t.name.clone(),
                value_type => value.type_decl().to_string(),
            })
        })
        .collect();

    tmpl.render(context! {
        package => package,
        std_imports => std_imports,
        ext_imports => ext_imports,
        enums => enums,
        types => items,
        accessors => accessors,
    })
    .map_err(|e| GeneratorError::Render(e.to_string()))
}

/// Imports required by the declarations: standard library paths (sorted)
/// and third-party import specs. Only type positions count; comments and
/// struct tags are skipped.
fn detect_imports(decls: &[&str]) -> (Vec<&'static str>, Vec<&'static str>) {
    let code: Vec<&str> = decls
        .iter()
        .flat_map(|d| d.lines())
        .map(str::trim_start)
        .filter(|line| !line.starts_with("//"))
        .map(|line| line.split('`').next().unwrap_or(line))
        .collect();
    let uses = |needle: &str| code.iter().any(|line| line.contains(needle));
    let mut std_imports = Vec::new();
    if uses("json.RawMessage") {
        std_imports.push("encoding/json");
    }
    if uses("time.Time") {
        std_imports.push("time");
    }
    let mut ext_imports = Vec::new();
    if uses("openapi_types.") {
        ext_imports.push(OPENAPI_TYPES_IMPORT);
    }
    (std_imports, ext_imports)
}

/// Constants for a top-level string enum, named `<Type><Value>`.
fn enum_to_ctx(def: &TypeDefinition) -> Option<minijinja::Value> {
    let schema = &def.schema;
    if schema.kind != SchemaKind::Scalar || schema.enum_values.is_empty() {
        return None;
    }
    if schema.type_decl() != "string" {
        return None;
    }
    let values: Vec<minijinja::Value> = schema
        .enum_values
        .iter()
        .map(|v| {
            context! {
                name => format!("{}{}", def.name, to_type_name(v)),
                literal => serde_json::Value::String(v.clone()).to_string(),
            }
        })
        .collect();
    Some(context! {
        type_name => def.name.clone(),
        values => values,
    })
}
