use std::collections::HashSet;

use log::{debug, warn};
use sgen_core::config::GoConfig;
use sgen_core::ir::TypeDefinition;
use sgen_core::naming::to_type_name;
use sgen_core::parse::spec::OpenApiSpec;
use sgen_core::{CodeGenerator, GeneratedFile, GeneratorError, ResolveError};

use crate::emitters;
use crate::operations::operation_types;
use crate::resolver::resolve_type;

/// Go type declaration generator.
pub struct GoTypesGenerator;

impl GoTypesGenerator {
    /// Every type the output declares: components in name order, then the
    /// auxiliary types hoisted out of them, then operation types. The first
    /// definition of a name wins.
    pub fn collect_types(
        spec: &OpenApiSpec,
        include_operations: bool,
    ) -> Result<Vec<TypeDefinition>, ResolveError> {
        let mut components = Vec::new();
        for (name, node) in spec.sorted_schemas() {
            let path = vec![name.to_string()];
            components.push(TypeDefinition {
                name: to_type_name(name),
                json_name: name.to_string(),
                schema: resolve_type(Some(node), &path)?,
            });
        }

        let mut all = components.clone();
        for def in &components {
            all.extend(def.schema.all_auxiliary_types());
        }
        if include_operations {
            for def in operation_types(spec)? {
                let auxiliary = def.schema.all_auxiliary_types();
                all.push(def);
                all.extend(auxiliary);
            }
        }

        let mut seen = HashSet::new();
        all.retain(|def| {
            if seen.insert(def.name.clone()) {
                true
            } else {
                warn!("duplicate type name {} ({}) skipped", def.name, def.json_name);
                false
            }
        });
        debug!("collected {} type definitions", all.len());
        Ok(all)
    }
}

impl CodeGenerator for GoTypesGenerator {
    type Config = GoConfig;
    type Error = GeneratorError;

    fn generate(
        &self,
        spec: &OpenApiSpec,
        config: &GoConfig,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let types = Self::collect_types(spec, config.operation_types)?;
        let content = emitters::types::emit_types(&types, &config.package)?;
        Ok(vec![GeneratedFile {
            path: config.output.clone(),
            content,
        }])
    }
}
