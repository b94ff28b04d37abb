use heck::ToPascalCase;
use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::parse::refs::split_ref;

/// Convert a schema or property name into an exported type identifier.
///
/// Examples:
/// - `fhir-code-system` → `FhirCodeSystem`
/// - `created_at` → `CreatedAt`
/// - `3dModel` → `N3dModel`
pub fn to_type_name(name: &str) -> String {
    let pascal = sanitize_identifier(name).to_pascal_case();
    match pascal.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("N{pascal}"),
        Some(_) => pascal,
        None => "Unnamed".to_string(),
    }
}

/// Synthesize a type name from the property path that led to an anonymous
/// type, e.g. `["Pet", "owner", "tags"]` → `PetOwnerTags`.
pub fn path_to_type_name(path: &[String]) -> String {
    path.iter().map(|segment| to_type_name(segment)).collect()
}

/// Map a local `$ref` to the type name generated for its target.
pub fn ref_to_type_name(ref_path: &str) -> Result<String, ResolveError> {
    let (_, name) = split_ref(ref_path)?;
    Ok(to_type_name(name))
}

/// Keys of a property map in sorted order. All resolvers iterate properties
/// through this so output order never depends on document order.
pub fn sorted_keys<V>(map: &IndexMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

/// Extend a traversal path by one segment.
pub fn child_path(path: &[String], segment: &str) -> Vec<String> {
    let mut child = path.to_vec();
    child.push(segment.to_string());
    child
}

/// Replace every run of non-alphanumeric characters with a single `_`.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    result
}
