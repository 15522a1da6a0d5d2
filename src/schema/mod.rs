// Schema module for searchmap
//
// This module provides the compile-time description of mapped entities and
// the tooling around it. It includes:
//
// 1. Entity schema and property descriptor types
// 2. The mapping parameter vocabulary
// 3. JSON schema definitions parser
// 4. Schema graph validation

// Re-export public types and functions
pub use self::parameters::{
    CompletionContextSpec, CompletionSpec, ContextKind, DateFormat, DynamicMapping, FieldType,
    IndexOptions, IndexPrefixes, InnerField, MappingParameters, MultiFieldSpec, NamedDateFormat,
    Similarity, TermVector,
};
pub use self::parser::SchemaParser;
pub use self::types::{
    EntitySchema, LeafKind, PropertyDescriptor, PropertyFlags, ScalarKind, SchemaRegistry,
    ValueShape,
};
pub use self::validator::{SchemaValidator, ValidatorConfig};

// Sub-modules
pub mod parameters;
pub mod parser;
pub mod types;
pub mod validator;
