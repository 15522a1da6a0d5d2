// Schema validator for searchmap
//
// This module checks schema graphs before they are compiled. Per schema it
// enforces unique emitted names, a single parent marker, resolvable nested
// references and well-formed multi-field, completion and scaled_float
// declarations. Across the graph it follows the same recursion the mapping
// walker performs and rejects graphs that nest too deep or that would recurse
// forever because a reference cycle has no declared break.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::internal::error::{Error, Result};
use crate::mapping::inference::resolve;
use crate::mapping::walker::SuppressionSet;
use crate::schema::parameters::{FieldType, MappingParameters};
use crate::schema::types::{EntitySchema, LeafKind, PropertyDescriptor, SchemaRegistry};

/// Configuration for schema validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum object nesting depth of a compiled mapping
    pub max_nesting_depth: usize,

    /// Whether cycle-break names must exist in the referenced schema
    pub check_suppression_names: bool,

    /// Whether to reject reference cycles without a declared break
    pub check_recursion: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 20, // The engine's default mapping depth limit
            check_suppression_names: true,
            check_recursion: true,
        }
    }
}

/// Schema validator
#[derive(Debug, Default)]
pub struct SchemaValidator {
    config: ValidatorConfig,
}

/// One step of a recursion path: a schema reached with a suppression set
type WalkState = (String, SuppressionSet);

impl SchemaValidator {
    /// Creates a new schema validator with default configuration
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    /// Creates a new schema validator with custom configuration
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validates every schema in a registry
    pub fn validate(&self, registry: &SchemaRegistry) -> Result<()> {
        for schema in registry.schemas() {
            self.validate_schema(registry, schema)?;
        }
        Ok(())
    }

    /// Validates a schema and every schema reachable from it
    pub fn validate_schema(&self, registry: &SchemaRegistry, schema: &EntitySchema) -> Result<()> {
        self.check_properties(registry, schema)?;

        let mut checked = BTreeSet::from([schema.name.clone()]);
        let mut pending = nested_schemas(registry, schema);
        while let Some(current) = pending.pop() {
            if !checked.insert(current.name.clone()) {
                continue;
            }
            self.check_properties(registry, &current)?;
            pending.extend(nested_schemas(registry, &current));
        }

        let mut path = HashSet::new();
        self.check_recursion(registry, schema, &SuppressionSet::new(), 1, &mut path)?;

        debug!(schema = %schema.name, schemas = checked.len(), "Schema graph validated");
        Ok(())
    }

    /// Checks the declarations of a single schema
    fn check_properties(&self, registry: &SchemaRegistry, schema: &EntitySchema) -> Result<()> {
        let parents = schema
            .properties
            .iter()
            .filter(|property| property.parent_type.is_some())
            .count();
        if parents > 1 {
            return Err(invalid(
                schema,
                format!("declares {} parent properties, at most one is allowed", parents),
            ));
        }

        let mut names = HashSet::new();
        for property in walked_properties(schema) {
            let name = property.emitted_name();
            if name.is_empty() {
                return Err(invalid(schema, "has a property with an empty name".to_string()));
            }
            if !names.insert(name) {
                return Err(invalid(schema, format!("emits property '{}' more than once", name)));
            }

            if property.raw_mapping.is_some() {
                continue;
            }

            if let Some(nested) = container_ref(property) {
                self.check_reference(registry, schema, property, nested)?;
            }

            let field_type = resolve(property).field_type;
            check_scaling_factor(schema, name, field_type, &property.parameters)?;

            match &property.kind {
                LeafKind::MultiField(spec) => {
                    let mut suffixes = HashSet::new();
                    for inner in &spec.inner_fields {
                        if inner.suffix.is_empty() {
                            return Err(invalid(
                                schema,
                                format!("multi-field '{}' has an inner field without a name", name),
                            ));
                        }
                        if !suffixes.insert(inner.suffix.as_str()) {
                            return Err(invalid(
                                schema,
                                format!("multi-field '{}' repeats inner field '{}'", name, inner.suffix),
                            ));
                        }
                        check_scaling_factor(
                            schema,
                            &format!("{}.{}", name, inner.suffix),
                            inner.field_type,
                            &inner.parameters,
                        )?;
                    }
                }
                LeafKind::Completion(spec) => {
                    if spec.contexts.iter().any(|context| context.name.is_empty()) {
                        return Err(invalid(
                            schema,
                            format!("completion field '{}' has a context without a name", name),
                        ));
                    }
                }
                LeafKind::Plain | LeafKind::GeoPoint => {}
            }
        }

        Ok(())
    }

    fn check_reference(
        &self,
        registry: &SchemaRegistry,
        schema: &EntitySchema,
        property: &PropertyDescriptor,
        nested: &str,
    ) -> Result<()> {
        let referenced = registry.get(nested).ok_or_else(|| {
            invalid(
                schema,
                format!(
                    "property '{}' references unknown schema '{}'",
                    property.emitted_name(),
                    nested
                ),
            )
        })?;

        if self.config.check_suppression_names {
            for ignored in &property.ignore_fields {
                if referenced.property(ignored).is_none() {
                    return Err(invalid(
                        schema,
                        format!(
                            "property '{}' ignores '{}', which schema '{}' does not declare",
                            property.emitted_name(),
                            ignored,
                            nested
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Follows the walker's recursion and rejects unbounded or too deep paths
    ///
    /// The walker's output below a schema depends only on the schema and the
    /// suppression set it is reached with. Reaching the same pair again on one
    /// path therefore means the recursion never ends.
    fn check_recursion(
        &self,
        registry: &SchemaRegistry,
        schema: &EntitySchema,
        suppressed: &SuppressionSet,
        depth: usize,
        path: &mut HashSet<WalkState>,
    ) -> Result<()> {
        if depth > self.config.max_nesting_depth {
            return Err(invalid(
                schema,
                format!(
                    "nests deeper than the limit of {} levels",
                    self.config.max_nesting_depth
                ),
            ));
        }

        let state = (schema.name.clone(), suppressed.clone());
        if self.config.check_recursion && path.contains(&state) {
            return Err(invalid(
                schema,
                "is reached again through a reference cycle without a cycle-break declaration"
                    .to_string(),
            ));
        }
        path.insert(state.clone());

        for property in walked_properties(schema) {
            if suppressed.contains(property.emitted_name()) || property.raw_mapping.is_some() {
                continue;
            }
            let Some(nested) = container_ref(property).and_then(|name| registry.get(name)) else {
                continue;
            };

            let extended = suppressed.extended(&property.ignore_fields);
            self.check_recursion(registry, &nested, &extended, depth + 1, path)?;
        }

        path.remove(&state);
        Ok(())
    }
}

/// Properties the walker emits or descends into
fn walked_properties(schema: &EntitySchema) -> impl Iterator<Item = &PropertyDescriptor> {
    schema
        .properties
        .iter()
        .filter(|property| !property.is_transient() && property.parent_type.is_none())
}

/// Registered schemas the walker descends into from `schema`
fn nested_schemas(registry: &SchemaRegistry, schema: &EntitySchema) -> Vec<Arc<EntitySchema>> {
    walked_properties(schema)
        .filter_map(container_ref)
        .filter_map(|name| registry.get(name))
        .collect()
}

/// Returns the nested schema a property is walked into, if any
fn container_ref(property: &PropertyDescriptor) -> Option<&str> {
    if property.raw_mapping.is_some() || !resolve(property).field_type.is_container() {
        return None;
    }
    property.shape.schema_ref()
}

fn check_scaling_factor(
    schema: &EntitySchema,
    name: &str,
    field_type: FieldType,
    parameters: &MappingParameters,
) -> Result<()> {
    if field_type != FieldType::ScaledFloat {
        return Ok(());
    }

    match parameters.scaling_factor {
        Some(factor) if factor.is_finite() && factor > 0.0 => Ok(()),
        Some(factor) => Err(invalid(
            schema,
            format!("scaled_float '{}' has invalid scaling factor {}", name, factor),
        )),
        None => Err(invalid(
            schema,
            format!("scaled_float '{}' requires a scaling factor", name),
        )),
    }
}

fn invalid(schema: &EntitySchema, message: String) -> Error {
    Error::ValidationError(format!("Schema '{}' {}", schema.name, message))
}
