// Schema tree walker
//
// Walks the properties of one schema in declaration order and produces the
// `properties` map of a mapping. Object and nested properties that reference a
// registered schema are descended into; everything else is a leaf handed to
// the serializer, multi-field expander or completion emitter.
//
// Self and mutual references terminate only through the suppression lists
// declared on the referencing properties. The set of suppressed names is
// carried down each recursion path and extended, never mutated, at every
// descent. The walker does no visited-node tracking of its own; a reference
// cycle without a declared break recurses until the stack is exhausted, which
// is why `MappingBuilder` validates the schema graph first by default.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::mapping::completion::completion_fragment;
use crate::mapping::inference::{resolve, Resolution};
use crate::mapping::multi_field::expand;
use crate::mapping::serializer::{serialize, Fragment};
use crate::mapping::{
    MapperConfig, FIELD_DYNAMIC, FIELD_INCLUDE_IN_PARENT, FIELD_PROPERTIES, FIELD_TYPE,
};
use crate::schema::parameters::{CompletionSpec, FieldType};
use crate::schema::types::{
    EntitySchema, LeafKind, PropertyDescriptor, PropertyFlags, SchemaRegistry,
};

/// Property names suppressed on the current recursion path
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuppressionSet {
    names: BTreeSet<String>,
}

impl SuppressionSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns a copy of this set with `names` added
    pub fn extended(&self, names: &[String]) -> Self {
        let mut extended = self.clone();
        extended.names.extend(names.iter().cloned());
        extended
    }
}

impl<S: Into<String>> FromIterator<S> for SuppressionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Recursive walker producing `properties` maps
#[derive(Debug, Clone, Copy)]
pub struct Walker<'a> {
    registry: &'a SchemaRegistry,
    config: MapperConfig,
}

impl<'a> Walker<'a> {
    /// Creates a walker that resolves nested schemas through `registry`
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self::with_config(registry, MapperConfig::default())
    }

    pub fn with_config(registry: &'a SchemaRegistry, config: MapperConfig) -> Self {
        Self { registry, config }
    }

    /// Walks a root schema
    pub fn walk(&self, schema: &EntitySchema, suppressed: &SuppressionSet) -> Fragment {
        self.walk_level(schema, suppressed, true)
    }

    fn walk_level(
        &self,
        schema: &EntitySchema,
        suppressed: &SuppressionSet,
        is_root: bool,
    ) -> Fragment {
        let mut properties = Fragment::new();

        for property in &schema.properties {
            let name = property.emitted_name();

            if property.is_transient() {
                trace!(schema = %schema.name, property = name, "Skipping transient property");
                continue;
            }

            if suppressed.contains(name) {
                debug!(
                    schema = %schema.name,
                    property = name,
                    "Property suppressed by cycle-break list"
                );
                continue;
            }

            // attached once at the root by the assembler
            if property.parent_type.is_some() {
                continue;
            }

            let fragment = self.property_fragment(property, suppressed, is_root);
            properties.insert(name.to_string(), Value::Object(fragment));
        }

        properties
    }

    fn property_fragment(
        &self,
        property: &PropertyDescriptor,
        suppressed: &SuppressionSet,
        is_root: bool,
    ) -> Fragment {
        if let Some(raw) = &property.raw_mapping {
            trace!(property = property.emitted_name(), "Emitting raw mapping fragment");
            return raw.clone();
        }

        let resolution = resolve(property);

        match property.shape.schema_ref() {
            Some(schema_ref) if resolution.field_type.is_container() => {
                self.container_fragment(property, resolution.field_type, schema_ref, suppressed)
            }
            _ => self.leaf_fragment(property, &resolution, is_root),
        }
    }

    fn container_fragment(
        &self,
        property: &PropertyDescriptor,
        field_type: FieldType,
        schema_ref: &str,
        suppressed: &SuppressionSet,
    ) -> Fragment {
        let mut fragment = Fragment::new();
        fragment.insert(FIELD_TYPE.to_string(), Value::from(field_type.as_ref()));

        if field_type == FieldType::Nested
            && property.flags.contains(PropertyFlags::INCLUDE_IN_PARENT)
        {
            fragment.insert(FIELD_INCLUDE_IN_PARENT.to_string(), Value::Bool(true));
        }

        if let Some(dynamic) = property.dynamic.mapping_value() {
            fragment.insert(FIELD_DYNAMIC.to_string(), Value::from(dynamic));
        }

        let nested_properties = match self.registry.get(schema_ref) {
            Some(nested) => {
                let suppressed = suppressed.extended(&property.ignore_fields);
                debug!(
                    property = property.emitted_name(),
                    schema = %nested.name,
                    suppressed = suppressed.len(),
                    "Descending into nested schema"
                );
                self.walk_level(&nested, &suppressed, false)
            }
            None => {
                warn!(
                    property = property.emitted_name(),
                    schema = schema_ref,
                    "Nested schema is not registered - emitting an empty object"
                );
                Fragment::new()
            }
        };

        fragment.insert(FIELD_PROPERTIES.to_string(), Value::Object(nested_properties));
        fragment
    }

    fn leaf_fragment(
        &self,
        property: &PropertyDescriptor,
        resolution: &Resolution,
        is_root: bool,
    ) -> Fragment {
        trace!(
            property = property.emitted_name(),
            field_type = %resolution.field_type,
            source = %resolution.source,
            "Emitting leaf field"
        );

        let plain_id = is_root
            && property.is_id()
            && property.field_type.is_none()
            && property.kind == LeafKind::Plain
            && !matches!(
                resolution.field_type,
                FieldType::GeoPoint | FieldType::Completion
            );
        if plain_id && self.config.id_as_keyword {
            return serialize(&Resolution::explicit(FieldType::Keyword), &Default::default());
        }

        match (&property.kind, resolution.field_type) {
            (LeafKind::MultiField(spec), _) => expand(resolution, &property.parameters, spec),
            (LeafKind::Completion(spec), _) => completion_fragment(&property.parameters, spec),
            (_, FieldType::Completion) => {
                completion_fragment(&property.parameters, &CompletionSpec::default())
            }
            // geo parameters are not supported; only the type is written
            (_, FieldType::GeoPoint) => {
                serialize(&Resolution::explicit(FieldType::GeoPoint), &Default::default())
            }
            _ => serialize(resolution, &property.parameters),
        }
    }
}
