//! Text rendering of Go struct declarations.

use sgen_core::ir::{ResolvedProperty, ResolvedSchema};
use sgen_core::naming::to_type_name;

use crate::type_mapper::{additional_map_type, go_comment};

pub(crate) const INDENT: &str = "    ";

/// Field type, pointer-wrapped when the value may be absent or null.
pub fn field_type(prop: &ResolvedProperty) -> String {
    let decl = prop.schema.type_decl();
    if !prop.schema.skip_optional_wrapper && (!prop.required || prop.nullable) {
        format!("*{decl}")
    } else {
        decl.to_string()
    }
}

/// Struct tags of a field: `json` always, `validate` when rules exist.
pub fn field_tags(prop: &ResolvedProperty) -> String {
    let mut json = prop.name.clone();
    if !prop.required && !prop.nullable {
        json.push_str(",omitempty");
    }
    let mut tags = format!("json:\"{json}\"");
    if let Some(rules) = prop.validation.tag_value() {
        tags.push_str(&format!(" validate:\"{}\"", rules.replace('"', "\\\"")));
    }
    tags
}

/// One line per field, each preceded by its description comment.
pub fn field_lines(props: &[ResolvedProperty]) -> Vec<String> {
    let mut lines = Vec::with_capacity(props.len());
    for prop in props {
        if let Some(description) = &prop.description {
            lines.push(go_comment(description, INDENT));
        }
        lines.push(format!(
            "{INDENT}{} {} `{}`",
            to_type_name(&prop.name),
            field_type(prop),
            field_tags(prop)
        ));
    }
    lines
}

/// Catch-all field of an open object; excluded from default JSON handling.
pub fn additional_properties_field(value: &ResolvedSchema) -> String {
    format!(
        "{INDENT}AdditionalProperties {} `json:\"-\"`",
        additional_map_type(value.type_decl())
    )
}

pub fn struct_decl(lines: &[String]) -> String {
    if lines.is_empty() {
        return "struct{}".to_string();
    }
    format!("struct {{\n{}\n}}", lines.join("\n"))
}
