// Multi-field expansion
//
// A multi-field indexes one value several ways: the primary field carries the
// owning property's own type and parameters, and each inner field is written
// under the primary's `fields` map with its own type and parameters. Inner
// fields are always terminal.

use serde_json::Value;

use crate::mapping::inference::Resolution;
use crate::mapping::serializer::{serialize, Fragment};
use crate::mapping::FIELD_FIELDS;
use crate::schema::parameters::{MappingParameters, MultiFieldSpec};

/// Expands a multi-field into its primary fragment with a nested `fields` map
pub fn expand(
    primary: &Resolution,
    parameters: &MappingParameters,
    spec: &MultiFieldSpec,
) -> Fragment {
    let mut fragment = serialize(primary, parameters);

    if spec.inner_fields.is_empty() {
        return fragment;
    }

    let fields: Fragment = spec
        .inner_fields
        .iter()
        .map(|inner| {
            let resolution = Resolution::explicit(inner.field_type);
            (
                inner.suffix.clone(),
                Value::Object(serialize(&resolution, &inner.parameters)),
            )
        })
        .collect();

    fragment.insert(FIELD_FIELDS.to_string(), Value::Object(fields));
    fragment
}
