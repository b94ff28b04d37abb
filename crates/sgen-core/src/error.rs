use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// Failures of a single resolution call. Every variant is terminal for the
/// whole document: callers must not emit partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid format '{format}' for {kind} at '{path}'")]
    InvalidFormat {
        kind: String,
        format: String,
        path: String,
    },

    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("property '{name}' already exists with a different type at '{path}'")]
    PropertyConflict { name: String, path: String },

    #[error("additional properties in allOf have incompatible types at '{path}'")]
    AdditionalPropertiesConflict { path: String },
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("render error: {0}")]
    Render(String),
}
