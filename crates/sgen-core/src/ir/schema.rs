use crate::error::ResolveError;
use crate::validation::ValidationRules;

/// Members of one field's search mapping object, e.g.
/// `{"type": "nested", "properties": {...}}`. Empty when the node contributes
/// nothing to the index template.
pub type MappingFragment = serde_json::Map<String, serde_json::Value>;

/// What a resolved schema stands for. Emitters switch on this rather than
/// sniffing declaration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaKind {
    /// Fully generic value.
    #[default]
    Any,
    /// Object without declared properties: a map of string to any.
    OpenMap,
    Scalar,
    Array,
    /// Object with fields, possibly with an additional-properties catch-all.
    Structured,
    /// Indirection to a named type; see [`ResolvedSchema::ref_name`].
    Reference,
}

/// A schema node after resolution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedSchema {
    pub kind: SchemaKind,
    /// Self-contained declaration text in the host language.
    pub type_decl: String,
    /// Set iff this schema is a reference; such a schema carries nothing else.
    pub ref_name: Option<String>,
    pub index_template: MappingFragment,
    pub enum_values: Vec<String>,
    pub properties: Vec<ResolvedProperty>,
    /// `Some` iff the object is open; holds the value type of extra keys.
    pub additional_properties: Option<Box<ResolvedSchema>>,
    /// Synthetic types hoisted out of descendants.
    pub auxiliary_types: Vec<TypeDefinition>,
    /// Never wrap as optional-by-reference, even when the field may be absent.
    pub skip_optional_wrapper: bool,
}

impl ResolvedSchema {
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            kind: SchemaKind::Reference,
            ref_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_ref(&self) -> bool {
        self.ref_name.is_some()
    }

    /// The text used wherever this schema is named as a type: the referenced
    /// name for references, the declaration otherwise.
    pub fn type_decl(&self) -> &str {
        self.ref_name.as_deref().unwrap_or(&self.type_decl)
    }

    pub fn has_additional_properties(&self) -> bool {
        self.additional_properties.is_some()
    }

    /// Add a property, rejecting a same-named property that disagrees on type
    /// or required-ness. An identical duplicate is kept once.
    pub fn merge_property(
        &mut self,
        property: ResolvedProperty,
        path: &[String],
    ) -> Result<(), ResolveError> {
        if let Some(existing) = self.properties.iter().find(|p| p.name == property.name) {
            if !existing.is_compatible_with(&property) {
                return Err(ResolveError::PropertyConflict {
                    name: property.name,
                    path: path.join("."),
                });
            }
            return Ok(());
        }
        self.properties.push(property);
        Ok(())
    }

    /// Every auxiliary type produced anywhere below this schema, depth first,
    /// properties before the schema's own hoisted types.
    pub fn all_auxiliary_types(&self) -> Vec<TypeDefinition> {
        let mut out = Vec::new();
        self.collect_auxiliary_types(&mut out);
        out
    }

    fn collect_auxiliary_types(&self, out: &mut Vec<TypeDefinition>) {
        for prop in &self.properties {
            prop.schema.collect_auxiliary_types(out);
        }
        if let Some(additional) = &self.additional_properties {
            additional.collect_auxiliary_types(out);
        }
        for def in &self.auxiliary_types {
            out.push(def.clone());
            def.schema.collect_auxiliary_types(out);
        }
    }
}

/// A named field of a structured schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedProperty {
    pub name: String,
    pub schema: ResolvedSchema,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
    pub validation: ValidationRules,
    /// Raw search-type annotation; empty when the field has none.
    pub search_tag: String,
}

impl ResolvedProperty {
    /// Same name, same declared type, same required-ness.
    pub fn is_compatible_with(&self, other: &ResolvedProperty) -> bool {
        self.name == other.name
            && self.schema.type_decl() == other.schema.type_decl()
            && self.required == other.required
    }
}

/// A synthetic type hoisted out of an anonymous nested open-shaped object.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    /// Dotted property path the type was found at.
    pub json_name: String,
    pub schema: ResolvedSchema,
}
