pub mod emitters;
pub mod generator;
pub mod resolver;
pub mod type_mapper;

pub use generator::IndexTemplateGenerator;
pub use resolver::{IndexTemplateResolver, resolve_index_template};
