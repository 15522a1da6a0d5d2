// Mapping document assembly
//
// A `MappingDocument` is the finished output of one compilation: the walked
// `properties` map, optionally preceded by the class-level `dynamic` mode and
// the `_parent` reference. Documents are immutable once assembled.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::internal::error::Result;
use crate::mapping::serializer::Fragment;
use crate::mapping::{FIELD_DYNAMIC, FIELD_PARENT, FIELD_PROPERTIES, FIELD_TYPE};
use crate::schema::parameters::DynamicMapping;

/// A compiled mapping document
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDocument {
    root: Fragment,
}

impl MappingDocument {
    /// Returns the root `properties` map
    pub fn properties(&self) -> Option<&Fragment> {
        self.root.get(FIELD_PROPERTIES).and_then(Value::as_object)
    }

    /// Returns the class-level dynamic mode as written, if any
    pub fn dynamic(&self) -> Option<&str> {
        self.root.get(FIELD_DYNAMIC).and_then(Value::as_str)
    }

    /// Returns the parent type reference, if any
    pub fn parent_type(&self) -> Option<&str> {
        self.root
            .get(FIELD_PARENT)
            .and_then(|parent| parent.get(FIELD_TYPE))
            .and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Fragment {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

impl Serialize for MappingDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl fmt::Display for MappingDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.root.clone()))
    }
}

impl From<MappingDocument> for Value {
    fn from(document: MappingDocument) -> Self {
        document.into_value()
    }
}

/// Wraps a walked `properties` map with the class-level settings
pub fn assemble(
    properties: Fragment,
    dynamic: DynamicMapping,
    parent_type: Option<&str>,
) -> MappingDocument {
    let mut root = Fragment::new();

    if let Some(dynamic) = dynamic.mapping_value() {
        root.insert(FIELD_DYNAMIC.to_string(), Value::from(dynamic));
    }

    if let Some(parent_type) = parent_type {
        let mut parent = Fragment::new();
        parent.insert(FIELD_TYPE.to_string(), Value::from(parent_type));
        root.insert(FIELD_PARENT.to_string(), Value::Object(parent));
    }

    debug!(
        properties = properties.len(),
        dynamic = %dynamic,
        parent = parent_type.unwrap_or_default(),
        "Assembled mapping document"
    );

    root.insert(FIELD_PROPERTIES.to_string(), Value::Object(properties));
    MappingDocument { root }
}
