use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level project configuration loaded from `.sgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SgenConfig {
    pub input: String,
    pub go: GoConfig,
    pub es: EsConfig,
}

impl Default for SgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            go: GoConfig::default(),
            es: EsConfig::default(),
        }
    }
}

/// Structural type generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoConfig {
    pub enabled: bool,
    /// Output file path.
    pub output: String,
    /// Package clause of the generated file.
    pub package: String,
    /// Also emit `<Op>Params` and `<Op>JSONBody` types for operations.
    pub operation_types: bool,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: "gen/types.gen.go".to_string(),
            package: "api".to_string(),
            operation_types: true,
        }
    }
}

/// Search index template generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EsConfig {
    pub enabled: bool,
    pub output: String,
    /// Only components whose `x-tags` contain this label get a template.
    /// `None` selects every component.
    pub marker_tag: Option<String>,
}

impl Default for EsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: "gen/index_templates.json".to_string(),
            marker_tag: Some("elastic".to_string()),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".sgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<SgenConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: SgenConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# sgen configuration
input: openapi.yaml

go:
  enabled: true
  output: gen/types.gen.go
  package: api
  operation_types: true   # <Op>Params / <Op>JSONBody types

es:
  enabled: true
  output: gen/index_templates.json
  marker_tag: elastic     # components listing this in x-tags; null = every component
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SgenConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert!(config.go.enabled);
        assert_eq!(config.go.package, "api");
        assert!(config.go.operation_types);
        assert!(config.es.enabled);
        assert_eq!(config.es.marker_tag.as_deref(), Some("elastic"));
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: SgenConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        let defaults = SgenConfig::default();
        assert_eq!(config.input, defaults.input);
        assert_eq!(config.go.output, defaults.go.output);
        assert_eq!(config.es.output, defaults.es.output);
        assert_eq!(config.es.marker_tag, defaults.es.marker_tag);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
go:
  package: models
  operation_types: false
es:
  output: out/mappings.json
  marker_tag: null
"#;
        let config: SgenConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.go.package, "models");
        assert!(!config.go.operation_types);
        // Defaults applied within a partially specified section
        assert_eq!(config.go.output, "gen/types.gen.go");
        assert_eq!(config.es.output, "out/mappings.json");
        assert_eq!(config.es.marker_tag, None);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "input: api.yaml\nes:\n  enabled: false\n").unwrap();
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.input, "api.yaml");
        assert!(!config.es.enabled);
        assert!(config.go.enabled);
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "go: [not, a, map]\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.starts_with("failed to parse config"));
    }
}
