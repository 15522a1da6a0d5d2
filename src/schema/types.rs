// Schema type system for searchmap
//
// This module defines the compile-time description of mapped entities:
// the value shapes a property can hold, the property descriptors with their
// mapping metadata, entity schemas, and the registry that lets schemas refer
// to each other by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use bitflags::bitflags;
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::internal::error::{Error, Result};
use crate::schema::parameters::{
    CompletionSpec, DynamicMapping, FieldType, MappingParameters, MultiFieldSpec,
};

/// Scalar value shapes a property may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ScalarKind {
    #[strum(serialize = "bool", serialize = "boolean")]
    Bool,
    Byte,
    Short,
    #[strum(serialize = "int", serialize = "integer")]
    Int,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    Char,
    String,
    Date,
    DateTime,
    Instant,
    LocalDate,
    LocalDateTime,
    Bytes,
    GeoPoint,
    Completion,
}

/// Declared value shape of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueShape {
    /// A scalar value
    Scalar(ScalarKind),
    /// A single nested entity, referenced by schema name
    Entity(String),
    /// A collection of nested entities, referenced by schema name
    EntityCollection(String),
    /// A type the schema extractor did not classify
    Opaque(String),
}

impl ValueShape {
    /// Returns the referenced schema name for entity shapes
    pub fn schema_ref(&self) -> Option<&str> {
        match self {
            ValueShape::Entity(name) | ValueShape::EntityCollection(name) => Some(name),
            _ => None,
        }
    }
}

bitflags! {
    /// Boolean markers on a property
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u8 {
        /// Never emitted and never recursed into
        const TRANSIENT = 1 << 0;
        /// The entity's identifier
        const ID = 1 << 1;
        /// Nested containers also index their fields into the parent document
        const INCLUDE_IN_PARENT = 1 << 2;
    }
}

/// Composite leaf kind of a property; the kinds are mutually exclusive
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LeafKind {
    #[default]
    Plain,
    MultiField(MultiFieldSpec),
    Completion(CompletionSpec),
    GeoPoint,
}

/// One field of an entity schema
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Declared name
    pub name: String,
    /// Name written to the mapping when it differs from the declared one
    pub field_name: Option<String>,
    pub shape: ValueShape,
    /// Explicit field type; wins over everything else during resolution
    pub field_type: Option<FieldType>,
    pub kind: LeafKind,
    pub flags: PropertyFlags,
    /// Property names to skip when recursing into this property's nested schema
    pub ignore_fields: Vec<String>,
    pub parameters: MappingParameters,
    /// Dynamic-mapping override for the nested object level
    pub dynamic: DynamicMapping,
    /// Marks this property as the parent reference of its schema
    pub parent_type: Option<String>,
    /// Pre-built fragment emitted verbatim instead of a computed one
    pub raw_mapping: Option<Map<String, Value>>,
}

impl PropertyDescriptor {
    /// Creates a property with no mapping metadata
    pub fn new(name: &str, shape: ValueShape) -> Self {
        Self {
            name: name.to_string(),
            field_name: None,
            shape,
            field_type: None,
            kind: LeafKind::Plain,
            flags: PropertyFlags::empty(),
            ignore_fields: Vec::new(),
            parameters: MappingParameters::default(),
            dynamic: DynamicMapping::Inherit,
            parent_type: None,
            raw_mapping: None,
        }
    }

    /// Shorthand for a scalar property
    pub fn scalar(name: &str, kind: ScalarKind) -> Self {
        Self::new(name, ValueShape::Scalar(kind))
    }

    /// Returns the name this property is written under
    pub fn emitted_name(&self) -> &str {
        self.field_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_transient(&self) -> bool {
        self.flags.contains(PropertyFlags::TRANSIENT)
    }

    pub fn is_id(&self) -> bool {
        self.flags.contains(PropertyFlags::ID)
    }

    pub fn with_field_name(mut self, field_name: &str) -> Self {
        self.field_name = Some(field_name.to_string());
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_parameters(mut self, parameters: MappingParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_ignore_fields(mut self, names: &[&str]) -> Self {
        self.ignore_fields = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_dynamic(mut self, dynamic: DynamicMapping) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn transient(self) -> Self {
        self.with_flags(PropertyFlags::TRANSIENT)
    }

    pub fn id(self) -> Self {
        self.with_flags(PropertyFlags::ID)
    }

    pub fn multi_field(mut self, spec: MultiFieldSpec) -> Self {
        self.kind = LeafKind::MultiField(spec);
        self
    }

    pub fn completion(mut self, spec: CompletionSpec) -> Self {
        self.kind = LeafKind::Completion(spec);
        self
    }

    pub fn geo_point(mut self) -> Self {
        self.kind = LeafKind::GeoPoint;
        self
    }

    pub fn parent_of(mut self, parent_type: &str) -> Self {
        self.parent_type = Some(parent_type.to_string());
        self
    }

    pub fn with_raw_mapping(mut self, mapping: Map<String, Value>) -> Self {
        self.raw_mapping = Some(mapping);
        self
    }
}

/// Compile-time description of one mapped entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    /// Type name; the key other schemas use to reference this one
    pub name: String,
    /// Logical index name, carried through for the index collaborators
    pub index_name: String,
    /// Class-level dynamic-mapping mode
    pub dynamic: DynamicMapping,
    /// Properties in declaration order
    pub properties: Vec<PropertyDescriptor>,
}

impl EntitySchema {
    /// Creates an empty schema
    pub fn new(name: &str, index_name: &str) -> Self {
        Self {
            name: name.to_string(),
            index_name: index_name.to_string(),
            dynamic: DynamicMapping::Inherit,
            properties: Vec::new(),
        }
    }

    pub fn with_dynamic(mut self, dynamic: DynamicMapping) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns the parent type declared by the schema's parent property, if any
    pub fn parent_type(&self) -> Option<&str> {
        self.properties
            .iter()
            .filter(|property| !property.is_transient())
            .find_map(|property| property.parent_type.as_deref())
    }

    /// Finds a property by the name it is emitted under
    pub fn property(&self, emitted_name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|property| property.emitted_name() == emitted_name)
    }
}

/// A registry of entity schemas
///
/// Properties reference nested schemas by name, so self and mutual
/// references are back-references through the registry rather than cycles in
/// ownership. Schemas are frozen once registered.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    /// Map of schema names to schemas
    schemas: BTreeMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    /// Creates a new, empty schema registry
    pub fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// Registers a schema; names must be unique
    pub fn register(&mut self, schema: EntitySchema) -> Result<Arc<EntitySchema>> {
        if self.schemas.contains_key(&schema.name) {
            return Err(Error::SchemaError(format!(
                "Schema '{}' is already registered",
                schema.name
            )));
        }

        let schema = Arc::new(schema);
        self.schemas.insert(schema.name.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Gets a schema by name
    pub fn get(&self, name: &str) -> Option<Arc<EntitySchema>> {
        self.schemas.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterates over the registered schemas in name order
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<EntitySchema>> {
        self.schemas.values()
    }
}
