//! Search-tag directives → mapping fragments.

use serde_json::{Value, json};
use sgen_core::ir::MappingFragment;

const NESTED: &str = "nested";

/// Translate a comma-separated directive list into mapping members.
///
/// `text` maps to an analyzed field with a `keyword` sub-field, `fielddata`
/// enables field data, and anything else names the field type directly.
/// Later directives override earlier ones on the same key.
pub fn directives_to_fragment(tag: &str) -> MappingFragment {
    let mut fragment = MappingFragment::new();
    for directive in tag.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match directive {
            "text" => {
                fragment.insert("type".to_string(), json!("text"));
                fragment.insert(
                    "fields".to_string(),
                    json!({"keyword": {"type": "keyword", "ignore_above": 256}}),
                );
            }
            "fielddata" => {
                fragment.insert("fielddata".to_string(), Value::Bool(true));
            }
            other => {
                fragment.insert("type".to_string(), json!(other));
            }
        }
    }
    fragment
}

/// Mark a fragment that carries `properties` as a nested document. Anything
/// else passes through unchanged.
pub fn nest(mut fragment: MappingFragment) -> MappingFragment {
    if fragment.contains_key("properties") {
        fragment.insert("type".to_string(), json!(NESTED));
    }
    fragment
}

/// The fragment an expansion halts on: a nested document of unknown shape.
pub fn bare_nested() -> MappingFragment {
    let mut fragment = MappingFragment::new();
    fragment.insert("type".to_string(), json!(NESTED));
    fragment
}

/// `{"properties": {...}}`, or nothing when there are no mapped fields.
pub fn object_fragment(properties: MappingFragment) -> MappingFragment {
    let mut fragment = MappingFragment::new();
    if !properties.is_empty() {
        fragment.insert("properties".to_string(), Value::Object(properties));
    }
    fragment
}
