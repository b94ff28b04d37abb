use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use sgen_core::GeneratorError;
use sgen_core::ir::MappingFragment;

#[derive(Debug, Serialize)]
struct IndexTemplate<'a> {
    mappings: &'a MappingFragment,
}

/// Emit `index_templates.json`: one `{"mappings": ...}` entry per type,
/// keys sorted, four-space indentation.
pub fn emit_index_templates(
    templates: &[(String, MappingFragment)],
) -> Result<String, GeneratorError> {
    let document: BTreeMap<&str, IndexTemplate<'_>> = templates
        .iter()
        .map(|(name, mappings)| (name.as_str(), IndexTemplate { mappings }))
        .collect();

    let mut out = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    document
        .serialize(&mut ser)
        .map_err(|e| GeneratorError::Render(e.to_string()))?;
    let mut text = String::from_utf8(out).map_err(|e| GeneratorError::Render(e.to_string()))?;
    text.push('\n');
    Ok(text)
}
