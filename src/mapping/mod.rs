// Mapping compiler for searchmap
//
// This module compiles entity schemas into search-engine mapping documents.
// It includes:
//
// 1. Field type resolution by precedence
// 2. The implicit default table and parameter serialization
// 3. Multi-field and completion emission
// 4. The cycle-safe schema walker
// 5. Document assembly
//
// Compilation is a pure function of the schema graph. A `MappingBuilder` only
// borrows the registry, so any number of builds may run in parallel.

use tracing::debug;

use crate::internal::error::{Error, Result};
use crate::schema::types::{EntitySchema, SchemaRegistry};
use crate::schema::validator::{SchemaValidator, ValidatorConfig};

pub use self::document::{assemble, MappingDocument};
pub use self::inference::{resolve, Resolution, TypeSource};
pub use self::serializer::{serialize, Fragment};
pub use self::walker::{SuppressionSet, Walker};

pub mod completion;
pub mod defaults;
pub mod document;
pub mod inference;
pub mod multi_field;
pub mod serializer;
pub mod walker;

/// Mapping keys shared by the emitters
pub const FIELD_TYPE: &str = "type";
pub const FIELD_PROPERTIES: &str = "properties";
pub const FIELD_FIELDS: &str = "fields";
pub const FIELD_CONTEXTS: &str = "contexts";
pub const FIELD_DYNAMIC: &str = "dynamic";
pub const FIELD_PARENT: &str = "_parent";
pub const FIELD_INCLUDE_IN_PARENT: &str = "include_in_parent";

/// Configuration for mapping compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperConfig {
    /// Whether `build_mapping` validates the reachable schema graph first
    pub validate: bool,

    /// Whether root-level id properties without an explicit type map to `keyword`
    pub id_as_keyword: bool,

    /// Validator settings used when `validate` is on
    pub validator: ValidatorConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            validate: true,
            id_as_keyword: true,
            validator: ValidatorConfig::default(),
        }
    }
}

/// Builds mapping documents for the schemas of a registry
#[derive(Debug, Clone, Copy)]
pub struct MappingBuilder<'a> {
    registry: &'a SchemaRegistry,
    config: MapperConfig,
}

impl<'a> MappingBuilder<'a> {
    /// Creates a new mapping builder with default configuration
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            config: MapperConfig::default(),
        }
    }

    /// Replaces the configuration
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Builds the mapping of a registered schema
    ///
    /// Fails when the schema is unknown or, with validation on, when its
    /// reachable graph is invalid.
    pub fn build_mapping(&self, name: &str) -> Result<MappingDocument> {
        let schema = self
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownSchema(name.to_string()))?;

        if self.config.validate {
            SchemaValidator::with_config(self.config.validator)
                .validate_schema(self.registry, &schema)?;
        }

        Ok(self.build_for(&schema))
    }

    /// Builds the mapping of a schema without validation
    ///
    /// Nested references are looked up in the builder's registry; `schema`
    /// itself need not be registered.
    pub fn build_for(&self, schema: &EntitySchema) -> MappingDocument {
        debug!(schema = %schema.name, index = %schema.index_name, "Building mapping");

        let walker = Walker::with_config(self.registry, self.config);
        let properties = walker.walk(schema, &SuppressionSet::new());
        assemble(properties, schema.dynamic, schema.parent_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parameters::{DynamicMapping, FieldType};
    use crate::schema::types::{PropertyDescriptor, ScalarKind, ValueShape};
    use serde_json::json;

    #[test]
    fn test_unknown_schema() {
        let registry = SchemaRegistry::new();
        let err = MappingBuilder::new(&registry).build_mapping("Missing").unwrap_err();
        assert!(matches!(err, Error::UnknownSchema(ref name) if name == "Missing"));
    }

    #[test]
    fn test_build_for_unregistered_schema() {
        let registry = SchemaRegistry::new();
        let schema = EntitySchema::new("Sample", "sample")
            .with_dynamic(DynamicMapping::Strict)
            .with_property(PropertyDescriptor::scalar("price", ScalarKind::Double).with_type(FieldType::Double));

        let document = MappingBuilder::new(&registry).build_for(&schema);
        assert_eq!(
            document.to_value(),
            json!({"dynamic": "strict", "properties": {"price": {"type": "double"}}})
        );
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                EntitySchema::new("Book", "books")
                    .with_property(PropertyDescriptor::scalar("title", ScalarKind::String))
                    .with_property(PropertyDescriptor::new(
                        "author",
                        ValueShape::Entity("Author".into()),
                    )),
            )
            .unwrap();

        let builder = MappingBuilder::new(&registry);
        assert!(matches!(
            builder.build_mapping("Book"),
            Err(Error::ValidationError(_))
        ));

        let unchecked = builder.with_config(MapperConfig {
            validate: false,
            ..Default::default()
        });
        let document = unchecked.build_mapping("Book").unwrap();
        assert_eq!(
            document.to_value(),
            json!({"properties": {"title": {}, "author": {"type": "object", "properties": {}}}})
        );
    }
}
