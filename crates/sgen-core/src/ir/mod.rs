mod schema;

pub use schema::{
    MappingFragment, ResolvedProperty, ResolvedSchema, SchemaKind, TypeDefinition,
};
