//! Schema node → Go type resolution.

use log::debug;
use sgen_core::ResolveError;
use sgen_core::graph::{NodeKind, Primitive, SEARCH_TAG_EXTENSION, Scalar, classify_scalar};
use sgen_core::ir::{ResolvedProperty, ResolvedSchema, SchemaKind, TypeDefinition};
use sgen_core::naming::{child_path, path_to_type_name, ref_to_type_name, sorted_keys};
use sgen_core::parse::schema::{Schema, SchemaOrRef};
use sgen_core::validation::derive_rules;

use crate::merge::merge_all_of;
use crate::render::{additional_properties_field, field_lines, struct_decl};
use crate::type_mapper::{ANY_TYPE, OPEN_MAP_TYPE, scalar_to_go};

pub(crate) fn any_schema() -> ResolvedSchema {
    ResolvedSchema {
        kind: SchemaKind::Any,
        type_decl: ANY_TYPE.to_string(),
        ..ResolvedSchema::default()
    }
}

fn open_map_schema() -> ResolvedSchema {
    ResolvedSchema {
        kind: SchemaKind::OpenMap,
        type_decl: OPEN_MAP_TYPE.to_string(),
        ..ResolvedSchema::default()
    }
}

/// Resolve a schema node found at `path`. A missing node is "any"; a
/// reference is never expanded.
pub fn resolve_type(
    node: Option<&SchemaOrRef>,
    path: &[String],
) -> Result<ResolvedSchema, ResolveError> {
    match node {
        None => Ok(any_schema()),
        Some(SchemaOrRef::Ref { ref_path }) => {
            Ok(ResolvedSchema::reference(ref_to_type_name(ref_path)?))
        }
        Some(SchemaOrRef::Schema(schema)) => resolve_schema(schema, path),
    }
}

/// Resolve an inline schema.
pub fn resolve_schema(schema: &Schema, path: &[String]) -> Result<ResolvedSchema, ResolveError> {
    match schema.kind() {
        NodeKind::Union => {
            debug!("{}: anyOf/oneOf resolved as {ANY_TYPE}", path.join("."));
            Ok(any_schema())
        }
        NodeKind::Null => Ok(any_schema()),
        NodeKind::AllOf(members) => {
            if schema.properties.is_empty() {
                return merge_all_of(members, path);
            }
            // Sibling properties act as one more inline member.
            let mut sibling = schema.clone();
            sibling.all_of.clear();
            let mut all = members.to_vec();
            all.push(SchemaOrRef::Schema(Box::new(sibling)));
            merge_all_of(&all, path)
        }
        NodeKind::Object { explicit } => resolve_object(schema, explicit, path),
        NodeKind::Array(items) => {
            let item = resolve_type(items, path)?;
            Ok(ResolvedSchema {
                kind: SchemaKind::Array,
                type_decl: format!("[]{}", item.type_decl()),
                properties: item.properties,
                auxiliary_types: item.auxiliary_types,
                ..ResolvedSchema::default()
            })
        }
        NodeKind::Primitive(primitive) => {
            let scalar = classify_scalar(primitive, schema.format(), path)?;
            let mut out = ResolvedSchema {
                kind: SchemaKind::Scalar,
                type_decl: scalar_to_go(scalar).to_string(),
                skip_optional_wrapper: scalar == Scalar::RawJson,
                ..ResolvedSchema::default()
            };
            if primitive == Primitive::String {
                out.enum_values = schema.enum_literals();
            }
            Ok(out)
        }
    }
}

fn resolve_object(
    schema: &Schema,
    explicit: bool,
    path: &[String],
) -> Result<ResolvedSchema, ResolveError> {
    if schema.properties.is_empty() && !schema.has_additional_properties() {
        return Ok(if explicit {
            open_map_schema()
        } else {
            any_schema()
        });
    }

    let mut hoisted = Vec::new();
    let mut out = ResolvedSchema {
        kind: SchemaKind::Structured,
        properties: resolve_properties(schema, path, &mut hoisted)?,
        ..ResolvedSchema::default()
    };
    out.auxiliary_types = hoisted;

    if schema.has_additional_properties() {
        let value = resolve_type(schema.additional_properties_schema(), path)?;
        out.additional_properties = Some(Box::new(value));
    }

    let mut lines = field_lines(&out.properties);
    if let Some(additional) = &out.additional_properties {
        lines.push(additional_properties_field(additional));
    }
    out.type_decl = struct_decl(&lines);
    Ok(out)
}

/// Resolve every property in sorted key order. Open, non-reference children
/// are pushed into `hoisted` and replaced by a reference to their synthetic
/// name.
pub(crate) fn resolve_properties(
    schema: &Schema,
    path: &[String],
    hoisted: &mut Vec<TypeDefinition>,
) -> Result<Vec<ResolvedProperty>, ResolveError> {
    let mut properties = Vec::with_capacity(schema.properties.len());
    for name in sorted_keys(&schema.properties) {
        let node = &schema.properties[name];
        let prop_path = child_path(path, name);
        let mut resolved = resolve_type(Some(node), &prop_path)?;

        if resolved.has_additional_properties() && !resolved.is_ref() {
            let type_name = path_to_type_name(&prop_path);
            debug!("hoisting {} as {type_name}", prop_path.join("."));
            hoisted.push(TypeDefinition {
                name: type_name.clone(),
                json_name: prop_path.join("."),
                schema: resolved,
            });
            resolved = ResolvedSchema::reference(type_name);
        }

        let required = schema.required.iter().any(|r| r == name);
        let inline = node.as_schema();
        properties.push(ResolvedProperty {
            name: name.to_string(),
            schema: resolved,
            required,
            nullable: inline.is_some_and(Schema::is_nullable),
            description: inline.and_then(|s| s.description.clone()),
            validation: derive_rules(inline, required),
            search_tag: inline
                .map(|s| s.extension_values(SEARCH_TAG_EXTENSION).join(","))
                .unwrap_or_default(),
        });
    }
    Ok(properties)
}
