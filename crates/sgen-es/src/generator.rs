use std::collections::HashSet;

use log::{debug, warn};
use sgen_core::config::EsConfig;
use sgen_core::graph::TAGS_EXTENSION;
use sgen_core::ir::MappingFragment;
use sgen_core::naming::to_type_name;
use sgen_core::parse::spec::OpenApiSpec;
use sgen_core::{CodeGenerator, GeneratedFile, GeneratorError, ResolveError};

use crate::emitters;
use crate::resolver::IndexTemplateResolver;

/// Search index template generator.
pub struct IndexTemplateGenerator;

impl IndexTemplateGenerator {
    /// Component names whose `x-tags` list the marker, in name order.
    /// Without a marker every component is selected.
    pub fn selected_components<'s>(spec: &'s OpenApiSpec, marker_tag: Option<&str>) -> Vec<&'s str> {
        spec.sorted_schemas()
            .into_iter()
            .filter(|(_, node)| match marker_tag {
                None => true,
                Some(marker) => node
                    .as_schema()
                    .is_some_and(|s| s.extension_values(TAGS_EXTENSION).iter().any(|t| t == marker)),
            })
            .map(|(name, _)| name)
            .collect()
    }

    /// Mapping fragments of the selected components, keyed by type name.
    /// The first component producing a type name wins.
    pub fn collect_templates(
        spec: &OpenApiSpec,
        marker_tag: Option<&str>,
    ) -> Result<Vec<(String, MappingFragment)>, ResolveError> {
        let resolver = IndexTemplateResolver::new(spec.components.as_ref());
        let mut seen = HashSet::new();
        let mut templates = Vec::new();
        for name in Self::selected_components(spec, marker_tag) {
            let type_name = to_type_name(name);
            if !seen.insert(type_name.clone()) {
                warn!("duplicate type name {type_name} ({name}) skipped");
                continue;
            }
            let resolved = resolver.resolve_component(name)?;
            if resolved.index_template.is_empty() {
                debug!("{name} has no mapped fields");
            }
            templates.push((type_name, resolved.index_template));
        }
        Ok(templates)
    }
}

impl CodeGenerator for IndexTemplateGenerator {
    type Config = EsConfig;
    type Error = GeneratorError;

    fn generate(
        &self,
        spec: &OpenApiSpec,
        config: &EsConfig,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let templates = Self::collect_templates(spec, config.marker_tag.as_deref())?;
        Ok(vec![GeneratedFile {
            path: config.output.clone(),
            content: emitters::templates::emit_index_templates(&templates)?,
        }])
    }
}
