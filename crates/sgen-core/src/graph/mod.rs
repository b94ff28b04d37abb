//! Read-only classification layer over the parsed schema model.
//!
//! The resolvers never inspect raw `Schema` fields to decide how to walk a
//! node; they switch on [`NodeKind`] and use the normalized lookups here.

mod scalar;

pub use scalar::{Primitive, Scalar, classify_scalar};

use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, TypeSet};

/// Extension carrying validator tag names copied verbatim into rule sets.
pub const CUSTOM_TAG_EXTENSION: &str = "x-go-custom-tag";

/// Extension carrying search-engine mapping directives.
pub const SEARCH_TAG_EXTENSION: &str = "x-es-tag";

/// Extension listing free-form labels; used to select index-template roots.
pub const TAGS_EXTENSION: &str = "x-tags";

/// Structural kind of an inline schema node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    /// `anyOf` / `oneOf`; resolved to the generic fallback.
    Union,
    AllOf(&'a [SchemaOrRef]),
    /// `explicit` is false for schemas without a `type` keyword.
    Object { explicit: bool },
    Array(Option<&'a SchemaOrRef>),
    Primitive(Primitive),
    Null,
}

impl Schema {
    /// The first non-`null` entry of `type`, if any.
    pub fn primary_type(&self) -> Option<SchemaType> {
        match &self.schema_type {
            Some(TypeSet::Single(t)) if *t != SchemaType::Null => Some(*t),
            Some(TypeSet::Multiple(types)) => {
                types.iter().copied().find(|t| *t != SchemaType::Null)
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> NodeKind<'_> {
        if !self.any_of.is_empty() || !self.one_of.is_empty() {
            return NodeKind::Union;
        }
        if !self.all_of.is_empty() {
            return NodeKind::AllOf(&self.all_of);
        }
        match self.primary_type() {
            Some(SchemaType::Object) => NodeKind::Object { explicit: true },
            Some(SchemaType::Array) => NodeKind::Array(self.items.as_deref()),
            Some(SchemaType::String) => NodeKind::Primitive(Primitive::String),
            Some(SchemaType::Integer) => NodeKind::Primitive(Primitive::Integer),
            Some(SchemaType::Number) => NodeKind::Primitive(Primitive::Number),
            Some(SchemaType::Boolean) => NodeKind::Primitive(Primitive::Boolean),
            Some(SchemaType::Null) => NodeKind::Null,
            None if self.schema_type.is_some() => NodeKind::Null,
            None => NodeKind::Object { explicit: false },
        }
    }

    /// `nullable: true`, or `null` listed among the types.
    pub fn is_nullable(&self) -> bool {
        let listed = matches!(
            &self.schema_type,
            Some(TypeSet::Multiple(types)) if types.contains(&SchemaType::Null)
        );
        self.nullable.unwrap_or(false) || listed
    }

    pub fn is_array(&self) -> bool {
        self.primary_type() == Some(SchemaType::Array)
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or("")
    }

    /// Whether the schema admits arbitrary extra keys: `additionalProperties`
    /// is `true` or a schema.
    pub fn has_additional_properties(&self) -> bool {
        matches!(
            self.additional_properties,
            Some(AdditionalProperties::Bool(true)) | Some(AdditionalProperties::Schema(_))
        )
    }

    /// The declared value schema of an open object, if any.
    pub fn additional_properties_schema(&self) -> Option<&SchemaOrRef> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(s)) => Some(s),
            _ => None,
        }
    }

    /// Values of an extension, normalized to a list of strings whether the
    /// document wrote a single string or a sequence. Anything else is ignored.
    pub fn extension_values(&self, key: &str) -> Vec<String> {
        match self.extensions.get(key) {
            None => Vec::new(),
            Some(serde_json::Value::String(s)) => vec![s.clone()],
            Some(serde_json::Value::Array(items)) => {
                let values: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if values.len() != items.len() {
                    log::warn!("extension {key} contains non-string entries; they are ignored");
                }
                values
            }
            Some(other) => {
                log::warn!("extension {key} must be a string or a list of strings, got {other}");
                Vec::new()
            }
        }
    }

    /// Enum literals rendered as plain text, in declared order.
    pub fn enum_literals(&self) -> Vec<String> {
        self.enum_values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_kind_untyped_is_implicit_object() {
        assert_eq!(schema("{}").kind(), NodeKind::Object { explicit: false });
        assert_eq!(
            schema("type: object").kind(),
            NodeKind::Object { explicit: true }
        );
    }

    #[test]
    fn test_kind_union_wins_over_type() {
        let s = schema("type: object\noneOf:\n  - type: string\n");
        assert_eq!(s.kind(), NodeKind::Union);
    }

    #[test]
    fn test_type_list_with_null() {
        let s = schema("type: [string, 'null']");
        assert_eq!(s.kind(), NodeKind::Primitive(Primitive::String));
        assert!(s.is_nullable());
        assert_eq!(schema("type: ['null']").kind(), NodeKind::Null);
    }

    #[test]
    fn test_additional_properties_shapes() {
        assert!(!schema("type: object").has_additional_properties());
        assert!(!schema("additionalProperties: false").has_additional_properties());
        assert!(schema("additionalProperties: true").has_additional_properties());
        let s = schema("additionalProperties:\n  type: string\n");
        assert!(s.has_additional_properties());
        assert!(s.additional_properties_schema().is_some());
    }

    #[test]
    fn test_extension_single_and_list() {
        let s = schema("x-es-tag: keyword\nx-go-custom-tag: [fhirID, fhirCode]\n");
        assert_eq!(s.extension_values(SEARCH_TAG_EXTENSION), vec!["keyword"]);
        assert_eq!(
            s.extension_values(CUSTOM_TAG_EXTENSION),
            vec!["fhirID", "fhirCode"]
        );
        assert!(s.extension_values("x-missing").is_empty());
    }

    #[test]
    fn test_extension_malformed_is_ignored() {
        let s = schema("x-es-tag: 42\n");
        assert!(s.extension_values(SEARCH_TAG_EXTENSION).is_empty());
    }

    #[test]
    fn test_enum_literals_keep_order() {
        let s = schema("type: string\nenum: [b, a, 3]\n");
        assert_eq!(s.enum_literals(), vec!["b", "a", "3"]);
    }
}
