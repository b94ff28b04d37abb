//! `allOf` composition.

use sgen_core::ResolveError;
use sgen_core::ir::{ResolvedSchema, SchemaKind};
use sgen_core::naming::ref_to_type_name;
use sgen_core::parse::schema::SchemaOrRef;

use crate::render::{INDENT, additional_properties_field, field_lines, struct_decl};
use crate::resolver::resolve_schema;

/// Merge `allOf` members into one structured schema.
///
/// Referenced members are embedded by type name and never expanded. Inline
/// members contribute their fields; a field name seen twice must agree on
/// type and required-ness and is declared once.
pub fn merge_all_of(
    members: &[SchemaOrRef],
    path: &[String],
) -> Result<ResolvedSchema, ResolveError> {
    let mut out = ResolvedSchema {
        kind: SchemaKind::Structured,
        ..ResolvedSchema::default()
    };
    let mut lines = Vec::new();

    for member in members {
        match member {
            SchemaOrRef::Ref { ref_path } => {
                let name = ref_to_type_name(ref_path)?;
                lines.push(format!("{INDENT}// Embedded struct due to allOf({ref_path})"));
                lines.push(format!("{INDENT}{name}"));
            }
            SchemaOrRef::Schema(schema) => {
                let resolved = resolve_schema(schema, path)?;
                let mut fresh = Vec::new();
                for prop in resolved.properties {
                    let seen = out.properties.iter().any(|p| p.name == prop.name);
                    out.merge_property(prop.clone(), path)?;
                    if !seen {
                        fresh.push(prop);
                    }
                }
                if let Some(additional) = resolved.additional_properties {
                    merge_additional(&mut out, *additional, path)?;
                }
                out.auxiliary_types.extend(resolved.auxiliary_types);
                lines.push(format!("{INDENT}// Embedded fields due to inline allOf schema"));
                lines.extend(field_lines(&fresh));
            }
        }
    }

    if let Some(additional) = &out.additional_properties {
        lines.push(additional_properties_field(additional));
    }
    out.type_decl = struct_decl(&lines);
    Ok(out)
}

fn merge_additional(
    out: &mut ResolvedSchema,
    value: ResolvedSchema,
    path: &[String],
) -> Result<(), ResolveError> {
    match &out.additional_properties {
        Some(existing) if existing.type_decl() != value.type_decl() => {
            Err(ResolveError::AdditionalPropertiesConflict {
                path: path.join("."),
            })
        }
        Some(_) => Ok(()),
        None => {
            out.additional_properties = Some(Box::new(value));
            Ok(())
        }
    }
}
