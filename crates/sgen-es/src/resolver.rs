//! Schema node → index-template fragment resolution.
//!
//! Unlike type resolution, references are expanded here: a mapping has to
//! spell out every nested field. The [`CycleGuard`] threaded through each
//! descent stops recursive definitions at their first reentry.

use log::debug;
use serde_json::Value;
use sgen_core::ResolveError;
use sgen_core::cycle::CycleGuard;
use sgen_core::graph::{NodeKind, SEARCH_TAG_EXTENSION, classify_scalar};
use sgen_core::ir::{MappingFragment, ResolvedProperty, ResolvedSchema, SchemaKind};
use sgen_core::naming::{child_path, sorted_keys};
use sgen_core::parse::components::Components;
use sgen_core::parse::refs::lookup_schema;
use sgen_core::parse::schema::{Schema, SchemaOrRef};

use crate::type_mapper::{bare_nested, directives_to_fragment, nest, object_fragment};

const SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// Resolves index-template fragments against a document's components.
///
/// Only `index_template` and `properties` of the returned schemas are
/// meaningful.
#[derive(Debug, Clone, Copy)]
pub struct IndexTemplateResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> IndexTemplateResolver<'a> {
    pub fn new(components: Option<&'a Components>) -> Self {
        Self { components }
    }

    /// Resolve the named component with its own reference already on the
    /// chain, so a self-reference halts one level down.
    ///
    /// The result is a root mapping: a plain `properties` document that is
    /// never marked nested, and an `allOf` root keeps its fields even when
    /// it carries a search tag.
    pub fn resolve_component(&self, name: &str) -> Result<ResolvedSchema, ResolveError> {
        let ref_path = format!("{SCHEMAS_PREFIX}{name}");
        let node = lookup_schema(self.components, &ref_path)?;
        let path = [name.to_string()];
        let guard = CycleGuard::rooted_at(ref_path);
        let mut resolved = match node {
            SchemaOrRef::Schema(schema) => match schema.kind() {
                NodeKind::AllOf(members) => self.resolve_all_of(schema, members, &path, &guard)?,
                _ => self.resolve_schema(schema, &path, &guard)?,
            },
            SchemaOrRef::Ref { .. } => self.resolve(Some(node), &path, &guard)?,
        };
        if resolved.index_template.contains_key("properties") {
            resolved.index_template.remove("type");
        }
        Ok(resolved)
    }

    pub fn resolve(
        &self,
        node: Option<&SchemaOrRef>,
        path: &[String],
        guard: &CycleGuard,
    ) -> Result<ResolvedSchema, ResolveError> {
        match node {
            None => Ok(ResolvedSchema::default()),
            Some(SchemaOrRef::Ref { ref_path }) => self.resolve_reference(ref_path, path, guard),
            Some(SchemaOrRef::Schema(schema)) => self.resolve_schema(schema, path, guard),
        }
    }

    fn resolve_reference(
        &self,
        ref_path: &str,
        path: &[String],
        guard: &CycleGuard,
    ) -> Result<ResolvedSchema, ResolveError> {
        let guard = guard.descend(ref_path);
        if guard.is_reentrant() {
            debug!(
                "{}: cycle halted at {}",
                path.join("."),
                guard.chain().join(" -> ")
            );
            return Ok(ResolvedSchema {
                kind: SchemaKind::Reference,
                index_template: bare_nested(),
                ..ResolvedSchema::default()
            });
        }
        let target = lookup_schema(self.components, ref_path)?;
        let mut resolved = self.resolve(Some(target), path, &guard)?;
        resolved.index_template = nest(resolved.index_template);
        Ok(resolved)
    }

    fn resolve_schema(
        &self,
        schema: &Schema,
        path: &[String],
        guard: &CycleGuard,
    ) -> Result<ResolvedSchema, ResolveError> {
        let tag = search_tag(schema);
        match schema.kind() {
            NodeKind::Union => {
                debug!("{}: anyOf/oneOf has no index template", path.join("."));
                Ok(ResolvedSchema::default())
            }
            NodeKind::Null => Ok(ResolvedSchema::default()),
            NodeKind::AllOf(members) => {
                if !tag.is_empty() {
                    return Ok(ResolvedSchema {
                        kind: SchemaKind::Structured,
                        index_template: bare_nested(),
                        ..ResolvedSchema::default()
                    });
                }
                let mut resolved = self.resolve_all_of(schema, members, path, guard)?;
                resolved.index_template = nest(resolved.index_template);
                Ok(resolved)
            }
            NodeKind::Object { .. } => {
                let mut resolved = self.resolve_object(schema, path, guard)?;
                if resolved.index_template.is_empty() {
                    resolved.index_template = directives_to_fragment(&tag);
                }
                Ok(resolved)
            }
            NodeKind::Array(items) => {
                let item = self.resolve(items, path, guard)?;
                let index_template = if item.index_template.contains_key("properties") {
                    nest(item.index_template)
                } else if !item.index_template.is_empty() {
                    item.index_template
                } else {
                    directives_to_fragment(&tag)
                };
                Ok(ResolvedSchema {
                    kind: SchemaKind::Array,
                    index_template,
                    properties: item.properties,
                    ..ResolvedSchema::default()
                })
            }
            NodeKind::Primitive(primitive) => {
                classify_scalar(primitive, schema.format(), path)?;
                Ok(ResolvedSchema {
                    kind: SchemaKind::Scalar,
                    index_template: directives_to_fragment(&tag),
                    ..ResolvedSchema::default()
                })
            }
        }
    }

    fn resolve_object(
        &self,
        schema: &Schema,
        path: &[String],
        guard: &CycleGuard,
    ) -> Result<ResolvedSchema, ResolveError> {
        if schema.has_additional_properties() {
            debug!(
                "{}: additional properties are not mapped",
                path.join(".")
            );
        }
        if schema.properties.is_empty() {
            return Ok(ResolvedSchema::default());
        }

        let mut mapped = MappingFragment::new();
        let mut properties = Vec::with_capacity(schema.properties.len());
        for name in sorted_keys(&schema.properties) {
            let node = &schema.properties[name];
            let mut resolved = self.resolve(Some(node), &child_path(path, name), guard)?;
            let inline = node.as_schema();
            let tag = inline.map(search_tag).unwrap_or_default();
            if resolved.index_template.is_empty() && !tag.is_empty() {
                resolved.index_template = directives_to_fragment(&tag);
            }
            if !resolved.index_template.is_empty() {
                mapped.insert(
                    name.to_string(),
                    Value::Object(resolved.index_template.clone()),
                );
            }
            properties.push(ResolvedProperty {
                name: name.to_string(),
                schema: resolved,
                required: schema.required.iter().any(|r| r == name),
                nullable: inline.is_some_and(Schema::is_nullable),
                description: inline.and_then(|s| s.description.clone()),
                search_tag: tag,
                ..ResolvedProperty::default()
            });
        }

        Ok(ResolvedSchema {
            kind: SchemaKind::Structured,
            index_template: object_fragment(mapped),
            properties,
            ..ResolvedSchema::default()
        })
    }

    /// Union the mapped fields of every member (and of sibling `properties`)
    /// into one object document.
    fn resolve_all_of(
        &self,
        schema: &Schema,
        members: &[SchemaOrRef],
        path: &[String],
        guard: &CycleGuard,
    ) -> Result<ResolvedSchema, ResolveError> {
        let mut resolved_members = Vec::with_capacity(members.len() + 1);
        for member in members {
            resolved_members.push(self.resolve(Some(member), path, guard)?);
        }
        if !schema.properties.is_empty() {
            resolved_members.push(self.resolve_object(schema, path, guard)?);
        }

        let mut mapped = MappingFragment::new();
        let mut properties: Vec<ResolvedProperty> = Vec::new();
        for member in resolved_members {
            if let Some(Value::Object(fields)) = member.index_template.get("properties") {
                for (name, fragment) in fields {
                    mapped.insert(name.clone(), fragment.clone());
                }
            }
            for prop in member.properties {
                if !properties.iter().any(|p| p.name == prop.name) {
                    properties.push(prop);
                }
            }
        }

        Ok(ResolvedSchema {
            kind: SchemaKind::Structured,
            index_template: object_fragment(mapped),
            properties,
            ..ResolvedSchema::default()
        })
    }
}

/// Resolve a single node with a fresh reference chain.
pub fn resolve_index_template(
    components: Option<&Components>,
    node: Option<&SchemaOrRef>,
    path: &[String],
) -> Result<ResolvedSchema, ResolveError> {
    IndexTemplateResolver::new(components).resolve(node, path, &CycleGuard::new())
}

/// The node's `x-es-tag` directives as one comma-separated string.
fn search_tag(schema: &Schema) -> String {
    schema.extension_values(SEARCH_TAG_EXTENSION).join(",")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn components(yaml: &str) -> Components {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn template(resolved: &ResolvedSchema) -> Value {
        Value::Object(resolved.index_template.clone())
    }

    fn inline(yaml: &str) -> ResolvedSchema {
        let node: SchemaOrRef = serde_yaml_ng::from_str(yaml).unwrap();
        resolve_index_template(None, Some(&node), &["Root".to_string()]).unwrap()
    }

    #[test]
    fn test_tagged_scalars() {
        let r = inline(
            r#"
type: object
properties:
  id:
    type: string
    x-es-tag: keyword
  count:
    type: integer
  note:
    type: string
    x-es-tag: [text, fielddata]
"#,
        );
        assert_eq!(
            template(&r),
            json!({
                "properties": {
                    "id": {"type": "keyword"},
                    "note": {
                        "type": "text",
                        "fields": {"keyword": {"type": "keyword", "ignore_above": 256}},
                        "fielddata": true
                    }
                }
            })
        );
        let names: Vec<&str> = r.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["count", "id", "note"]);
        assert_eq!(r.properties[1].search_tag, "keyword");
    }

    #[test]
    fn test_object_without_properties_has_no_template() {
        assert!(inline("type: object").index_template.is_empty());
        assert!(
            inline("type: object\nadditionalProperties: {type: string}\n")
                .index_template
                .is_empty()
        );
    }

    #[test]
    fn test_inline_object_property_not_nested() {
        let r = inline(
            r#"
properties:
  address:
    properties:
      city:
        type: string
        x-es-tag: keyword
"#,
        );
        assert_eq!(
            template(&r),
            json!({"properties": {"address": {"properties": {"city": {"type": "keyword"}}}}})
        );
    }

    #[test]
    fn test_tagged_property_with_empty_fragment_uses_tag() {
        let r = inline(
            r#"
properties:
  raw:
    type: object
    x-es-tag: flattened
"#,
        );
        assert_eq!(template(&r), json!({"properties": {"raw": {"type": "flattened"}}}));
    }

    #[test]
    fn test_array_of_scalars() {
        let item_tagged = inline(
            "properties:\n  tags:\n    type: array\n    items:\n      type: string\n      x-es-tag: keyword\n",
        );
        assert_eq!(
            template(&item_tagged),
            json!({"properties": {"tags": {"type": "keyword"}}})
        );

        let array_tagged = inline(
            "properties:\n  tags:\n    type: array\n    x-es-tag: keyword\n    items:\n      type: string\n",
        );
        assert_eq!(
            template(&array_tagged),
            json!({"properties": {"tags": {"type": "keyword"}}})
        );
    }

    #[test]
    fn test_array_of_objects_is_nested() {
        let r = inline(
            r#"
type: array
items:
  properties:
    code:
      type: string
      x-es-tag: keyword
"#,
        );
        assert_eq!(
            template(&r),
            json!({"type": "nested", "properties": {"code": {"type": "keyword"}}})
        );
        assert_eq!(r.properties.len(), 1);
    }

    #[test]
    fn test_union_has_no_template() {
        let r = inline("anyOf:\n  - type: string\n    x-es-tag: keyword\n");
        assert!(r.index_template.is_empty());
    }

    #[test]
    fn test_all_of_tag_short_circuits() {
        let r = inline(
            r#"
x-es-tag: object
allOf:
  - properties:
      a: {type: string, x-es-tag: keyword}
"#,
        );
        assert_eq!(template(&r), json!({"type": "nested"}));
    }

    #[test]
    fn test_all_of_unions_member_properties() {
        let c = components(
            r#"
schemas:
  Base:
    properties:
      id: {type: string, x-es-tag: keyword}
"#,
        );
        let node: SchemaOrRef = serde_yaml_ng::from_str(
            r#"
allOf:
  - $ref: '#/components/schemas/Base'
  - properties:
      name: {type: string, x-es-tag: text}
properties:
  rank: {type: integer, x-es-tag: integer}
"#,
        )
        .unwrap();
        let r = IndexTemplateResolver::new(Some(&c))
            .resolve(Some(&node), &["Root".to_string()], &CycleGuard::new())
            .unwrap();
        let t = template(&r);
        assert_eq!(t["type"], json!("nested"));
        assert_eq!(t["properties"]["id"], json!({"type": "keyword"}));
        assert_eq!(t["properties"]["name"]["type"], json!("text"));
        assert_eq!(t["properties"]["rank"], json!({"type": "integer"}));
        // A single "type" key despite members contributing nested fragments.
        assert_eq!(t.as_object().unwrap().len(), 2);
        assert_eq!(r.properties.len(), 3);
    }

    #[test]
    fn test_reference_to_tagged_object_uses_target_tag() {
        let c = components(
            r#"
schemas:
  Code:
    type: object
    x-es-tag: flattened
  Holder:
    properties:
      by_ref: {$ref: '#/components/schemas/Code'}
      inline: {type: object, x-es-tag: flattened}
"#,
        );
        let r = IndexTemplateResolver::new(Some(&c))
            .resolve_component("Holder")
            .unwrap();
        assert_eq!(
            template(&r),
            json!({
                "properties": {
                    "by_ref": {"type": "flattened"},
                    "inline": {"type": "flattened"}
                }
            })
        );
    }

    #[test]
    fn test_all_of_component_root_is_not_nested() {
        let c = components(
            r#"
schemas:
  Base:
    properties:
      id: {type: string, x-es-tag: keyword}
  Order:
    allOf:
      - $ref: '#/components/schemas/Base'
      - properties:
          total: {type: number, x-es-tag: double}
  Tagged:
    x-es-tag: object
    allOf:
      - $ref: '#/components/schemas/Base'
"#,
        );
        let resolver = IndexTemplateResolver::new(Some(&c));
        let order = resolver.resolve_component("Order").unwrap();
        assert_eq!(
            template(&order),
            json!({
                "properties": {
                    "id": {"type": "keyword"},
                    "total": {"type": "double"}
                }
            })
        );
        let tagged = resolver.resolve_component("Tagged").unwrap();
        assert_eq!(
            template(&tagged),
            json!({"properties": {"id": {"type": "keyword"}}})
        );
    }

    #[test]
    fn test_invalid_format() {
        let node: SchemaOrRef =
            serde_yaml_ng::from_str("properties:\n  n:\n    type: integer\n    format: decimal\n")
                .unwrap();
        let err = IndexTemplateResolver::new(None)
            .resolve(Some(&node), &["Root".to_string()], &CycleGuard::new())
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidFormat {
                kind: "integer".to_string(),
                format: "decimal".to_string(),
                path: "Root.n".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_reference_target() {
        let c = components("schemas: {}\n");
        let err = IndexTemplateResolver::new(Some(&c))
            .resolve_component("Ghost")
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnresolvedReference("#/components/schemas/Ghost".to_string())
        );

        let node: SchemaOrRef =
            serde_yaml_ng::from_str("$ref: '#/components/schemas/Ghost'").unwrap();
        assert!(matches!(
            IndexTemplateResolver::new(Some(&c)).resolve(
                Some(&node),
                &["Root".to_string()],
                &CycleGuard::new()
            ),
            Err(ResolveError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn test_self_reference_halts() {
        let c = components(
            r#"
schemas:
  Node:
    properties:
      name: {type: string, x-es-tag: keyword}
      child:
        $ref: '#/components/schemas/Node'
"#,
        );
        let r = IndexTemplateResolver::new(Some(&c))
            .resolve_component("Node")
            .unwrap();
        assert_eq!(
            template(&r),
            json!({
                "properties": {
                    "child": {"type": "nested"},
                    "name": {"type": "keyword"}
                }
            })
        );
    }

    #[test]
    fn test_mutual_reference_halts() {
        let c = components(
            r#"
schemas:
  A:
    properties:
      b: {$ref: '#/components/schemas/B'}
  B:
    properties:
      a: {$ref: '#/components/schemas/A'}
      label: {type: string, x-es-tag: keyword}
"#,
        );
        let r = IndexTemplateResolver::new(Some(&c))
            .resolve_component("A")
            .unwrap();
        assert_eq!(
            template(&r),
            json!({
                "properties": {
                    "b": {
                        "type": "nested",
                        "properties": {
                            "a": {"type": "nested"},
                            "label": {"type": "keyword"}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_long_cycle_terminates() {
        let mut yaml = String::from("schemas:\n");
        for i in 0..12 {
            yaml.push_str(&format!(
                "  S{i}:\n    properties:\n      next: {{$ref: '#/components/schemas/S{}'}}\n      v: {{type: string, x-es-tag: keyword}}\n",
                (i + 1) % 12
            ));
        }
        let c = components(&yaml);
        let r = IndexTemplateResolver::new(Some(&c))
            .resolve_component("S0")
            .unwrap();
        let mut depth = 0;
        let mut cursor = template(&r);
        while let Some(next) = cursor["properties"].get("next").cloned() {
            depth += 1;
            if next.get("properties").is_none() {
                assert_eq!(next, json!({"type": "nested"}));
                break;
            }
            cursor = next;
        }
        assert_eq!(depth, 12);
    }

    #[test]
    fn test_siblings_do_not_share_visits() {
        let c = components(
            r#"
schemas:
  Leaf:
    properties:
      v: {type: string, x-es-tag: keyword}
  Pair:
    properties:
      left: {$ref: '#/components/schemas/Leaf'}
      right: {$ref: '#/components/schemas/Leaf'}
"#,
        );
        let r = IndexTemplateResolver::new(Some(&c))
            .resolve_component("Pair")
            .unwrap();
        let t = template(&r);
        assert_eq!(t["properties"]["left"], t["properties"]["right"]);
        assert_eq!(t["properties"]["right"]["properties"]["v"], json!({"type": "keyword"}));
    }
}
