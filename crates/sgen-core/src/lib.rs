pub mod config;
pub mod cycle;
pub mod error;
pub mod graph;
pub mod ir;
pub mod naming;
pub mod parse;
pub mod validation;

pub use error::{GeneratorError, ParseError, ResolveError};

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from a parsed document.
pub trait CodeGenerator {
    type Config;
    type Error: std::error::Error;
    fn generate(
        &self,
        spec: &parse::spec::OpenApiSpec,
        config: &Self::Config,
    ) -> Result<Vec<GeneratedFile>, Self::Error>;
}
