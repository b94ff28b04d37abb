pub mod emitters;
pub mod generator;
pub mod merge;
pub mod operations;
pub mod render;
pub mod resolver;
pub mod type_mapper;

pub use generator::GoTypesGenerator;
pub use merge::merge_all_of;
pub use resolver::resolve_type;
