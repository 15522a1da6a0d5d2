// searchmap library entry point
//
// Compiles entity schemas into search-engine mapping documents.

pub mod internal;
pub mod mapping;
pub mod schema;

pub use internal::error::{Error, Result};
pub use mapping::{MapperConfig, MappingBuilder, MappingDocument};
pub use schema::{EntitySchema, PropertyDescriptor, SchemaParser, SchemaRegistry, SchemaValidator};
