use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::operation::PathItem;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,
}

/// Top-level OpenAPI 3.x specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiSpec {
    /// Component schemas in sorted name order.
    pub fn sorted_schemas(&self) -> Vec<(&str, &super::schema::SchemaOrRef)> {
        let Some(components) = &self.components else {
            return Vec::new();
        };
        let mut schemas: Vec<_> = components
            .schemas
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
            .collect();
        schemas.sort_by(|a, b| a.0.cmp(b.0));
        schemas
    }
}
