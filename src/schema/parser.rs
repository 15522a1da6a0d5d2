// JSON schema definitions parser for searchmap
//
// This module reads entity schema definitions from JSON and builds a
// `SchemaRegistry`. A definitions document looks like:
//
//   {"schemas": [
//     {"name": "User", "index_name": "users", "dynamic": "strict",
//      "properties": [
//        {"name": "id", "shape": "string", "id": true},
//        {"name": "groups", "shape": {"collection": "Group"},
//         "type": "nested", "ignore_fields": ["users"]}
//      ]}
//   ]}
//
// Properties are arrays so declaration order survives. Mapping parameters are
// flat keys on the property, spelled as in the mapping itself.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::internal::error::{Error, Result};
use crate::schema::parameters::{
    CompletionContextSpec, CompletionSpec, ContextKind, DateFormat, DynamicMapping, FieldType,
    IndexPrefixes, InnerField, MappingParameters, MultiFieldSpec, NamedDateFormat,
};
use crate::schema::types::{
    EntitySchema, LeafKind, PropertyDescriptor, PropertyFlags, ScalarKind, SchemaRegistry,
    ValueShape,
};

/// Parser for JSON schema definitions
#[derive(Debug, Default)]
pub struct SchemaParser {
    /// Custom shape mappings (declared type name -> scalar kind)
    custom_shape_mappings: HashMap<String, ScalarKind>,
}

impl SchemaParser {
    /// Creates a new schema parser
    pub fn new() -> Self {
        Self {
            custom_shape_mappings: HashMap::new(),
        }
    }

    /// Maps a declared type name onto a scalar kind
    ///
    /// Without a mapping, unrecognized shape names become opaque.
    pub fn add_shape_mapping(&mut self, type_name: &str, kind: ScalarKind) {
        self.custom_shape_mappings.insert(type_name.to_string(), kind);
    }

    /// Parses a definitions document from a string
    pub fn parse_str(&self, input: &str) -> Result<SchemaRegistry> {
        let json: Value = serde_json::from_str(input)?;
        self.parse_value(&json)
    }

    /// Parses a definitions document into a registry
    pub fn parse_value(&self, json: &Value) -> Result<SchemaRegistry> {
        let obj = as_object(json, "Definitions document")?;

        let schemas = match obj.get("schemas") {
            Some(Value::Array(schemas)) => schemas,
            Some(_) => return Err(Error::ParseError("Field 'schemas' must be an array".to_string())),
            None => return Err(Error::ParseError("Required field 'schemas' is missing".to_string())),
        };

        let mut registry = SchemaRegistry::new();
        for schema in schemas {
            registry.register(self.parse_schema(schema)?)?;
        }

        Ok(registry)
    }

    /// Parses a single schema definition
    pub fn parse_schema(&self, json: &Value) -> Result<EntitySchema> {
        let obj = as_object(json, "Schema")?;

        let name = self.get_string_field(obj, "name")?;
        let index_name = self
            .get_optional_string(obj, "index_name")?
            .unwrap_or_else(|| name.to_lowercase());

        let mut schema = EntitySchema::new(&name, &index_name);

        if let Some(dynamic) = obj.get("dynamic") {
            schema.dynamic = self.parse_dynamic(dynamic)?;
        }

        match obj.get("properties") {
            Some(Value::Array(properties)) => {
                for property in properties {
                    let property = self.parse_property(property).map_err(|e| match e {
                        Error::ParseError(msg) => {
                            Error::ParseError(format!("Schema '{}': {}", name, msg))
                        }
                        other => other,
                    })?;
                    schema.properties.push(property);
                }
            }
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Schema '{}': field 'properties' must be an array",
                    name
                )))
            }
            None => {}
        }

        Ok(schema)
    }

    /// Parses a property definition
    fn parse_property(&self, json: &Value) -> Result<PropertyDescriptor> {
        let obj = as_object(json, "Property")?;

        let name = self.get_string_field(obj, "name")?;
        let shape = match obj.get("shape") {
            Some(shape) => self.parse_shape(shape)?,
            None => return Err(Error::ParseError(format!("Property '{}' has no shape", name))),
        };

        let mut property = PropertyDescriptor::new(&name, shape);

        property.field_name = self.get_optional_string(obj, "field_name")?;
        property.field_type = self.get_optional_enum::<FieldType>(obj, "type")?;
        property.parent_type = self.get_optional_string(obj, "parent_type")?;
        property.ignore_fields = self.get_string_list(obj, "ignore_fields")?;
        property.parameters = self.parse_parameters(obj)?;

        for (key, flag) in [
            ("transient", PropertyFlags::TRANSIENT),
            ("id", PropertyFlags::ID),
            ("include_in_parent", PropertyFlags::INCLUDE_IN_PARENT),
        ] {
            if self.get_optional_bool(obj, key)?.unwrap_or(false) {
                property.flags |= flag;
            }
        }

        if let Some(dynamic) = obj.get("dynamic") {
            property.dynamic = self.parse_dynamic(dynamic)?;
        }

        property.kind = self.parse_leaf_kind(&name, obj)?;

        match obj.get("mapping") {
            Some(Value::Object(raw)) => property.raw_mapping = Some(raw.clone()),
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Property '{}': field 'mapping' must be an object",
                    name
                )))
            }
            None => {}
        }

        Ok(property)
    }

    /// Parses a value shape: a scalar kind name, or an object naming a schema
    fn parse_shape(&self, json: &Value) -> Result<ValueShape> {
        match json {
            Value::String(type_name) => {
                if let Some(kind) = self.custom_shape_mappings.get(type_name) {
                    return Ok(ValueShape::Scalar(*kind));
                }
                Ok(ScalarKind::from_str(type_name)
                    .map(ValueShape::Scalar)
                    .unwrap_or_else(|_| ValueShape::Opaque(type_name.clone())))
            }
            Value::Object(obj) => {
                if let Some(name) = self.get_optional_string(obj, "entity")? {
                    Ok(ValueShape::Entity(name))
                } else if let Some(name) = self.get_optional_string(obj, "collection")? {
                    Ok(ValueShape::EntityCollection(name))
                } else if let Some(name) = self.get_optional_string(obj, "opaque")? {
                    Ok(ValueShape::Opaque(name))
                } else {
                    Err(Error::ParseError(
                        "Shape object must name an 'entity', 'collection' or 'opaque' type"
                            .to_string(),
                    ))
                }
            }
            _ => Err(Error::ParseError(format!(
                "Invalid shape: {}, expected string or object",
                json
            ))),
        }
    }

    fn parse_dynamic(&self, json: &Value) -> Result<DynamicMapping> {
        match json {
            Value::Bool(true) => Ok(DynamicMapping::True),
            Value::Bool(false) => Ok(DynamicMapping::False),
            Value::String(mode) => DynamicMapping::from_str(mode)
                .map_err(|_| Error::ParseError(format!("Unknown dynamic mapping mode: {}", mode))),
            _ => Err(Error::ParseError(format!(
                "Invalid dynamic mapping mode: {}, expected string or boolean",
                json
            ))),
        }
    }

    /// Parses the composite leaf kind; at most one may be declared
    fn parse_leaf_kind(&self, name: &str, obj: &Map<String, Value>) -> Result<LeafKind> {
        let mut kinds = Vec::new();

        if self.get_optional_bool(obj, "geo_point")?.unwrap_or(false) {
            kinds.push(LeafKind::GeoPoint);
        }

        match obj.get("fields") {
            Some(Value::Array(fields)) => {
                let inner_fields = fields
                    .iter()
                    .map(|field| self.parse_inner_field(field))
                    .collect::<Result<Vec<_>>>()?;
                kinds.push(LeafKind::MultiField(MultiFieldSpec::new(inner_fields)));
            }
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Property '{}': field 'fields' must be an array",
                    name
                )))
            }
            None => {}
        }

        match obj.get("completion") {
            Some(Value::Bool(true)) => kinds.push(LeafKind::Completion(CompletionSpec::default())),
            Some(Value::Bool(false)) | None => {}
            Some(Value::Object(completion)) => {
                kinds.push(LeafKind::Completion(self.parse_completion(completion)?));
            }
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Property '{}': field 'completion' must be an object or boolean",
                    name
                )))
            }
        }

        if kinds.len() > 1 {
            return Err(Error::ParseError(format!(
                "Property '{}' declares more than one of 'geo_point', 'fields' and 'completion'",
                name
            )));
        }

        Ok(kinds.pop().unwrap_or_default())
    }

    fn parse_inner_field(&self, json: &Value) -> Result<InnerField> {
        let obj = as_object(json, "Inner field")?;
        let suffix = self.get_string_field(obj, "suffix")?;
        let field_type = match self.get_optional_enum::<FieldType>(obj, "type")? {
            Some(field_type) => field_type,
            None => {
                return Err(Error::ParseError(format!(
                    "Inner field '{}' must declare a type",
                    suffix
                )))
            }
        };

        Ok(InnerField::new(&suffix, field_type).with_parameters(self.parse_parameters(obj)?))
    }

    fn parse_completion(&self, obj: &Map<String, Value>) -> Result<CompletionSpec> {
        let contexts = match obj.get("contexts") {
            Some(Value::Array(contexts)) => contexts
                .iter()
                .map(|context| self.parse_context(context))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(Error::ParseError("Field 'contexts' must be an array".to_string())),
            None => Vec::new(),
        };

        Ok(CompletionSpec {
            analyzer: self.get_optional_string(obj, "analyzer")?,
            search_analyzer: self.get_optional_string(obj, "search_analyzer")?,
            max_input_length: self.get_optional_u32(obj, "max_input_length")?,
            preserve_separators: self.get_optional_bool(obj, "preserve_separators")?,
            preserve_position_increments: self
                .get_optional_bool(obj, "preserve_position_increments")?,
            contexts,
        })
    }

    fn parse_context(&self, json: &Value) -> Result<CompletionContextSpec> {
        let obj = as_object(json, "Completion context")?;
        let name = self.get_string_field(obj, "name")?;
        let kind = match self.get_optional_enum::<ContextKind>(obj, "type")? {
            Some(kind) => kind,
            None => {
                return Err(Error::ParseError(format!(
                    "Completion context '{}' must declare a type",
                    name
                )))
            }
        };

        Ok(CompletionContextSpec {
            name,
            kind,
            path: self.get_optional_string(obj, "path")?,
            precision: self.get_optional_string(obj, "precision")?,
        })
    }

    /// Reads the flat mapping parameter keys of a property or inner field
    fn parse_parameters(&self, obj: &Map<String, Value>) -> Result<MappingParameters> {
        let date_format = match (
            self.get_optional_string(obj, "pattern")?,
            self.get_optional_string(obj, "format")?,
        ) {
            (Some(pattern), _) => Some(DateFormat::Custom(pattern)),
            (None, Some(format)) => Some(
                NamedDateFormat::from_str(&format)
                    .map(DateFormat::Named)
                    .unwrap_or(DateFormat::Custom(format)),
            ),
            (None, None) => None,
        };

        let index_prefixes = match obj.get("index_prefixes") {
            Some(Value::Object(prefixes)) => {
                let defaults = IndexPrefixes::default();
                Some(IndexPrefixes {
                    min_chars: self
                        .get_optional_u32(prefixes, "min_chars")?
                        .unwrap_or(defaults.min_chars),
                    max_chars: self
                        .get_optional_u32(prefixes, "max_chars")?
                        .unwrap_or(defaults.max_chars),
                })
            }
            Some(Value::Bool(true)) => Some(IndexPrefixes::default()),
            Some(Value::Bool(false)) | None => None,
            Some(_) => {
                return Err(Error::ParseError(
                    "Field 'index_prefixes' must be an object or boolean".to_string(),
                ))
            }
        };

        let scaling_factor = match obj.get("scaling_factor") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                return Err(Error::ParseError(
                    "Field 'scaling_factor' must be a number".to_string(),
                ))
            }
            None => None,
        };

        Ok(MappingParameters {
            store: self.get_optional_bool(obj, "store")?,
            index: self.get_optional_bool(obj, "index")?,
            coerce: self.get_optional_bool(obj, "coerce")?,
            fielddata: self.get_optional_bool(obj, "fielddata")?,
            doc_values: self.get_optional_bool(obj, "doc_values")?,
            ignore_malformed: self.get_optional_bool(obj, "ignore_malformed")?,
            index_phrases: self.get_optional_bool(obj, "index_phrases")?,
            norms: self.get_optional_bool(obj, "norms")?,
            ignore_above: self.get_optional_u32(obj, "ignore_above")?,
            date_format,
            analyzer: self.get_optional_string(obj, "analyzer")?,
            search_analyzer: self.get_optional_string(obj, "search_analyzer")?,
            normalizer: self.get_optional_string(obj, "normalizer")?,
            index_options: self.get_optional_enum(obj, "index_options")?,
            index_prefixes,
            null_value: obj.get("null_value").filter(|value| !value.is_null()).cloned(),
            position_increment_gap: self.get_optional_u32(obj, "position_increment_gap")?,
            similarity: self.get_optional_enum(obj, "similarity")?,
            term_vector: self.get_optional_enum(obj, "term_vector")?,
            scaling_factor,
            copy_to: self.get_string_list(obj, "copy_to")?,
        })
    }

    /// Helper to get a string field from a JSON object
    fn get_string_field(&self, obj: &Map<String, Value>, field: &str) -> Result<String> {
        match obj.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(Error::ParseError(format!("Field '{}' must be a string", field))),
            None => Err(Error::ParseError(format!("Required field '{}' is missing", field))),
        }
    }

    fn get_optional_string(&self, obj: &Map<String, Value>, field: &str) -> Result<Option<String>> {
        match obj.get(field) {
            Some(_) => self.get_string_field(obj, field).map(Some),
            None => Ok(None),
        }
    }

    fn get_optional_bool(&self, obj: &Map<String, Value>, field: &str) -> Result<Option<bool>> {
        match obj.get(field) {
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Error::ParseError(format!("Field '{}' must be a boolean", field))),
            None => Ok(None),
        }
    }

    /// Helper to get an optional u32 field from a JSON object
    fn get_optional_u32(&self, obj: &Map<String, Value>, field: &str) -> Result<Option<u32>> {
        match obj.get(field) {
            Some(Value::Number(n)) => match n.as_u64() {
                Some(u) => u32::try_from(u).map(Some).map_err(|_| {
                    Error::ParseError(format!("Field '{}' is too large for u32", field))
                }),
                None => Err(Error::ParseError(format!(
                    "Field '{}' must be a positive integer",
                    field
                ))),
            },
            Some(_) => Err(Error::ParseError(format!("Field '{}' must be a number", field))),
            None => Ok(None),
        }
    }

    /// Helper to get an optional enum value by its mapping name
    fn get_optional_enum<T: FromStr>(&self, obj: &Map<String, Value>, field: &str) -> Result<Option<T>> {
        match self.get_optional_string(obj, field)? {
            Some(name) => T::from_str(&name).map(Some).map_err(|_| {
                Error::ParseError(format!("Unknown value '{}' for field '{}'", name, field))
            }),
            None => Ok(None),
        }
    }

    fn get_string_list(&self, obj: &Map<String, Value>, field: &str) -> Result<Vec<String>> {
        match obj.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(Error::ParseError(format!(
                        "Field '{}' must only contain strings",
                        field
                    ))),
                })
                .collect(),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(_) => Err(Error::ParseError(format!("Field '{}' must be an array", field))),
            None => Ok(Vec::new()),
        }
    }
}

fn as_object<'v>(json: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    match json {
        Value::Object(obj) => Ok(obj),
        _ => Err(Error::ParseError(format!("{} must be a JSON object", what))),
    }
}
