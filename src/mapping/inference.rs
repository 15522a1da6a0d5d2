// Field type resolution for searchmap
//
// This module decides the target field type of one property. Resolution is an
// ordered list of independent rules; the first rule that matches wins:
//
// 1. an explicit field-type override
// 2. a composite marker (geo-point or completion leaf kind)
// 3. a structural reference to a nested schema (object, or nested for collections)
// 4. the fixed scalar shape table
//
// Shapes no rule recognizes fall back to `object`. Resolution never fails.

use strum::{AsRefStr, Display};

use crate::schema::parameters::FieldType;
use crate::schema::types::{LeafKind, PropertyDescriptor, ScalarKind, ValueShape};

/// Which precedence rule decided a property's field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TypeSource {
    Explicit,
    Marker,
    Structural,
    Shape,
    Fallback,
}

/// A resolved field type together with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub field_type: FieldType,
    pub source: TypeSource,
}

impl Resolution {
    pub fn new(field_type: FieldType, source: TypeSource) -> Self {
        Self { field_type, source }
    }

    pub fn explicit(field_type: FieldType) -> Self {
        Self::new(field_type, TypeSource::Explicit)
    }

    /// Returns true when the `type` key belongs in the emitted fragment
    ///
    /// Types inferred from the value shape are the engine's implicit choice
    /// and are left out.
    pub fn writes_type(&self) -> bool {
        matches!(self.source, TypeSource::Explicit | TypeSource::Marker)
    }
}

type Rule = fn(&PropertyDescriptor) -> Option<Resolution>;

/// Resolution rules in precedence order
const RULES: [Rule; 4] = [explicit_override, composite_marker, nested_schema, shape_table];

/// Resolves the field type of a property
pub fn resolve(property: &PropertyDescriptor) -> Resolution {
    RULES
        .iter()
        .find_map(|rule| rule(property))
        .unwrap_or(Resolution::new(FieldType::Object, TypeSource::Fallback))
}

/// Maps a scalar shape to its field type
pub fn scalar_field_type(kind: ScalarKind) -> FieldType {
    match kind {
        ScalarKind::Bool => FieldType::Boolean,
        ScalarKind::Byte => FieldType::Byte,
        ScalarKind::Short => FieldType::Short,
        ScalarKind::Int => FieldType::Integer,
        ScalarKind::Long | ScalarKind::BigInteger => FieldType::Long,
        ScalarKind::Float => FieldType::Float,
        ScalarKind::Double | ScalarKind::BigDecimal => FieldType::Double,
        ScalarKind::Char | ScalarKind::String => FieldType::Text,
        ScalarKind::Date
        | ScalarKind::DateTime
        | ScalarKind::Instant
        | ScalarKind::LocalDate
        | ScalarKind::LocalDateTime => FieldType::Date,
        ScalarKind::Bytes => FieldType::Binary,
        ScalarKind::GeoPoint => FieldType::GeoPoint,
        ScalarKind::Completion => FieldType::Completion,
    }
}

fn explicit_override(property: &PropertyDescriptor) -> Option<Resolution> {
    property.field_type.map(Resolution::explicit)
}

fn composite_marker(property: &PropertyDescriptor) -> Option<Resolution> {
    match property.kind {
        LeafKind::GeoPoint => Some(Resolution::new(FieldType::GeoPoint, TypeSource::Marker)),
        LeafKind::Completion(_) => Some(Resolution::new(FieldType::Completion, TypeSource::Marker)),
        LeafKind::Plain | LeafKind::MultiField(_) => None,
    }
}

fn nested_schema(property: &PropertyDescriptor) -> Option<Resolution> {
    match property.shape {
        ValueShape::Entity(_) => Some(Resolution::new(FieldType::Object, TypeSource::Structural)),
        ValueShape::EntityCollection(_) => {
            Some(Resolution::new(FieldType::Nested, TypeSource::Structural))
        }
        _ => None,
    }
}

fn shape_table(property: &PropertyDescriptor) -> Option<Resolution> {
    match property.shape {
        ValueShape::Scalar(kind) => Some(Resolution::new(scalar_field_type(kind), TypeSource::Shape)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parameters::CompletionSpec;

    #[test]
    fn test_explicit_override_wins() {
        // BigDecimal would infer double; the override still decides
        let property = PropertyDescriptor::scalar("price", ScalarKind::BigDecimal)
            .with_type(FieldType::ScaledFloat);
        assert_eq!(resolve(&property), Resolution::explicit(FieldType::ScaledFloat));

        let entity = PropertyDescriptor::new("valueObject", ValueShape::Entity("ValueObject".into()))
            .with_type(FieldType::Text);
        assert_eq!(resolve(&entity), Resolution::explicit(FieldType::Text));
    }

    #[test]
    fn test_marker_before_structure() {
        let point = PropertyDescriptor::scalar("pointC", ScalarKind::String).geo_point();
        assert_eq!(
            resolve(&point),
            Resolution::new(FieldType::GeoPoint, TypeSource::Marker)
        );

        let suggest = PropertyDescriptor::new("suggest", ValueShape::Opaque("Completion".into()))
            .completion(CompletionSpec::default());
        assert_eq!(resolve(&suggest).field_type, FieldType::Completion);
        assert!(resolve(&suggest).writes_type());
    }

    #[test]
    fn test_structural_nested_schema() {
        let author = PropertyDescriptor::new("author", ValueShape::Entity("Author".into()));
        assert_eq!(
            resolve(&author),
            Resolution::new(FieldType::Object, TypeSource::Structural)
        );

        let groups = PropertyDescriptor::new("groups", ValueShape::EntityCollection("Group".into()));
        assert_eq!(resolve(&groups).field_type, FieldType::Nested);
    }

    #[test]
    fn test_shape_table() {
        let cases = [
            (ScalarKind::Int, FieldType::Integer),
            (ScalarKind::Long, FieldType::Long),
            (ScalarKind::Double, FieldType::Double),
            (ScalarKind::Float, FieldType::Float),
            (ScalarKind::Bool, FieldType::Boolean),
            (ScalarKind::Instant, FieldType::Date),
            (ScalarKind::String, FieldType::Text),
            (ScalarKind::Bytes, FieldType::Binary),
            (ScalarKind::GeoPoint, FieldType::GeoPoint),
            (ScalarKind::Completion, FieldType::Completion),
        ];

        for (kind, expected) in cases {
            let resolution = resolve(&PropertyDescriptor::scalar("field", kind));
            assert_eq!(resolution.field_type, expected, "shape {:?}", kind);
            assert_eq!(resolution.source, TypeSource::Shape);
            assert!(!resolution.writes_type());
        }
    }

    #[test]
    fn test_unknown_shape_falls_back_to_object() {
        let property = PropertyDescriptor::new("buckets", ValueShape::Opaque("java.util.Map".into()));
        assert_eq!(
            resolve(&property),
            Resolution::new(FieldType::Object, TypeSource::Fallback)
        );
    }

    #[test]
    fn test_multi_field_has_no_marker_type() {
        let property = PropertyDescriptor::scalar("description", ScalarKind::String)
            .multi_field(Default::default());
        assert_eq!(resolve(&property).source, TypeSource::Shape);
    }
}
