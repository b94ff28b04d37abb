//! Validation rules derived from schema constraints.
//!
//! Rules are engine-agnostic name → expression pairs; the expression syntax
//! (`min=3`, `oneof=a b`) is the one understood by struct-tag driven
//! validators. Nothing here validates data.

use indexmap::IndexMap;

use crate::graph::CUSTOM_TAG_EXTENSION;
use crate::parse::schema::{Schema, SchemaType};

/// Ordered rule set attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationRules {
    rules: IndexMap<String, String>,
    omit_if_absent: bool,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.rules.get(name).map(String::as_str)
    }

    /// Comma-joined tag value, `omitempty` first when applicable. `None` when
    /// there are no rules at all.
    pub fn tag_value(&self) -> Option<String> {
        if self.rules.is_empty() {
            return None;
        }
        let mut parts: Vec<&str> = Vec::with_capacity(self.rules.len() + 1);
        if self.omit_if_absent {
            parts.push("omitempty");
        }
        parts.extend(self.rules.values().map(String::as_str));
        Some(parts.join(","))
    }

    fn insert(&mut self, name: &str, expression: String) {
        self.rules.insert(name.to_string(), expression);
    }
}

/// Derive the rule set for a field. Absent constraints produce no rule; a
/// missing schema (a reference) produces an empty set.
pub fn derive_rules(schema: Option<&Schema>, required: bool) -> ValidationRules {
    let mut v = ValidationRules::default();
    let Some(schema) = schema else {
        v.omit_if_absent = !required;
        return v;
    };
    v.omit_if_absent = !required || schema.is_nullable();

    if let Some(min) = schema.min_length.filter(|n| *n > 0) {
        v.insert("minlength", format!("min={min}"));
    }
    if let Some(max) = schema.max_length {
        v.insert("maxlength", format!("max={max}"));
    }

    let integer = schema.primary_type() == Some(SchemaType::Integer);
    if let Some(min) = schema.minimum {
        v.insert("min", format!("min={}", bound(min, integer)));
    }
    if let Some(max) = schema.maximum {
        v.insert("max", format!("max={}", bound(max, integer)));
    }

    if let Some(pattern) = &schema.pattern {
        // Regex dialects differ between schema documents and validators; the
        // pattern is passed through untranslated.
        log::warn!("pattern {pattern:?} emitted verbatim; validator regex support is best-effort");
        v.insert("regex", format!("regex={pattern}"));
    }

    if schema.is_array() {
        if let Some(min) = schema.min_items.filter(|n| *n > 0) {
            v.insert("minitems", format!("min={min}"));
        }
        if let Some(max) = schema.max_items {
            v.insert("maxitems", format!("max={max}"));
        }
    } else if !schema.enum_values.is_empty() {
        v.insert("oneof", format!("oneof={}", schema.enum_literals().join(" ")));
    }

    let custom = schema.extension_values(CUSTOM_TAG_EXTENSION);
    if !custom.is_empty() {
        v.insert("custom-tag", custom.join(","));
    }

    v
}

fn bound(value: f64, integer: bool) -> String {
    if integer {
        format!("{}", value.trunc() as i64)
    } else {
        format!("{value:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_no_constraints_no_rules() {
        let rules = derive_rules(Some(&schema("type: string")), true);
        assert!(rules.is_empty());
        assert_eq!(rules.tag_value(), None);
    }

    #[test]
    fn test_reference_has_no_rules() {
        assert!(derive_rules(None, false).is_empty());
    }

    #[test]
    fn test_string_lengths() {
        let rules = derive_rules(
            Some(&schema("type: string\nminLength: 2\nmaxLength: 10\n")),
            true,
        );
        assert_eq!(rules.get("minlength"), Some("min=2"));
        assert_eq!(rules.get("maxlength"), Some("max=10"));
        assert_eq!(rules.tag_value().as_deref(), Some("min=2,max=10"));
    }

    #[test]
    fn test_zero_min_length_is_ignored() {
        let rules = derive_rules(Some(&schema("type: string\nminLength: 0\n")), true);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_integer_bounds() {
        let rules = derive_rules(
            Some(&schema("type: integer\nminimum: 1\nmaximum: 100\n")),
            true,
        );
        assert_eq!(rules.get("min"), Some("min=1"));
        assert_eq!(rules.get("max"), Some("max=100"));
    }

    #[test]
    fn test_number_bounds_are_floating() {
        let rules = derive_rules(Some(&schema("type: number\nminimum: 0.5\n")), true);
        assert_eq!(rules.get("min"), Some("min=0.500000"));
    }

    #[test]
    fn test_pattern_is_verbatim() {
        let rules = derive_rules(Some(&schema("type: string\npattern: '^[a-z]+$'\n")), true);
        assert_eq!(rules.get("regex"), Some("regex=^[a-z]+$"));
    }

    #[test]
    fn test_array_item_counts() {
        let rules = derive_rules(
            Some(&schema(
                "type: array\nminItems: 1\nmaxItems: 5\nitems:\n  type: string\n",
            )),
            true,
        );
        assert_eq!(rules.get("minitems"), Some("min=1"));
        assert_eq!(rules.get("maxitems"), Some("max=5"));
    }

    #[test]
    fn test_enum_one_of() {
        let rules = derive_rules(
            Some(&schema("type: string\nenum: [active, inactive]\n")),
            true,
        );
        assert_eq!(rules.get("oneof"), Some("oneof=active inactive"));
    }

    #[test]
    fn test_array_enum_has_no_one_of() {
        let rules = derive_rules(
            Some(&schema("type: array\nenum: [[a]]\nitems:\n  type: string\n")),
            true,
        );
        assert_eq!(rules.get("oneof"), None);
    }

    #[test]
    fn test_custom_tag_single_and_list() {
        let single = derive_rules(Some(&schema("type: string\nx-go-custom-tag: fhirID\n")), true);
        assert_eq!(single.get("custom-tag"), Some("fhirID"));

        let list = derive_rules(
            Some(&schema("type: string\nx-go-custom-tag: [fhirID, fhirString]\n")),
            true,
        );
        assert_eq!(list.get("custom-tag"), Some("fhirID,fhirString"));
    }

    #[test]
    fn test_omitempty_for_optional_or_nullable() {
        let s = schema("type: string\nmaxLength: 3\n");
        assert_eq!(
            derive_rules(Some(&s), false).tag_value().as_deref(),
            Some("omitempty,max=3")
        );
        assert_eq!(
            derive_rules(Some(&s), true).tag_value().as_deref(),
            Some("max=3")
        );

        let nullable = schema("type: string\nmaxLength: 3\nnullable: true\n");
        assert_eq!(
            derive_rules(Some(&nullable), true).tag_value().as_deref(),
            Some("omitempty,max=3")
        );
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let s = schema("type: string\nminLength: 1\npattern: x\nx-go-custom-tag: a\n");
        assert_eq!(derive_rules(Some(&s), false), derive_rules(Some(&s), false));
    }
}
