// Mapping parameter serialization
//
// Turns one resolved field type plus its declared parameters into a leaf
// fragment. Every declared parameter is checked against the implicit default
// table; only differing values are written. This layer does no recursion.

use serde_json::{Map, Value};

use crate::mapping::defaults::{is_implicit_default, Param};
use crate::mapping::inference::Resolution;
use crate::mapping::FIELD_TYPE;
use crate::schema::parameters::{FieldType, IndexPrefixes, MappingParameters};

/// An ordered key/value fragment of a mapping document
pub type Fragment = Map<String, Value>;

/// Serializes a leaf field
pub fn serialize(resolution: &Resolution, parameters: &MappingParameters) -> Fragment {
    let mut fragment = Fragment::new();
    write_type(&mut fragment, resolution);
    write_parameters(&mut fragment, resolution.field_type, parameters);
    fragment
}

/// Writes the `type` key when the resolution calls for it
pub(crate) fn write_type(fragment: &mut Fragment, resolution: &Resolution) {
    if resolution.writes_type() {
        fragment.insert(
            FIELD_TYPE.to_string(),
            Value::from(resolution.field_type.as_ref()),
        );
    }
}

/// Writes a declared parameter unless it equals the implicit default
pub(crate) fn put_param(
    fragment: &mut Fragment,
    field_type: FieldType,
    param: Param,
    value: Option<Value>,
) {
    if let Some(value) = value {
        if !is_implicit_default(field_type, param, &value) {
            fragment.insert(param.as_ref().to_string(), value);
        }
    }
}

fn write_parameters(fragment: &mut Fragment, field_type: FieldType, parameters: &MappingParameters) {
    let mut put = |param: Param, value: Option<Value>| {
        put_param(fragment, field_type, param, value)
    };

    put(Param::Store, parameters.store.map(Value::Bool));
    put(Param::Index, parameters.index.map(Value::Bool));
    put(Param::Coerce, parameters.coerce.map(Value::Bool));
    put(Param::Fielddata, parameters.fielddata.map(Value::Bool));
    put(Param::IgnoreAbove, parameters.ignore_above.map(Value::from));

    if !parameters.copy_to.is_empty() {
        put(Param::CopyTo, Some(Value::from(parameters.copy_to.clone())));
    }

    put(
        Param::Format,
        parameters
            .date_format
            .as_ref()
            .map(|format| Value::from(format.mapping_value())),
    );
    put(Param::Analyzer, parameters.analyzer.clone().map(Value::from));
    put(
        Param::SearchAnalyzer,
        parameters.search_analyzer.clone().map(Value::from),
    );
    put(Param::Normalizer, parameters.normalizer.clone().map(Value::from));
    put(Param::DocValues, parameters.doc_values.map(Value::Bool));
    put(
        Param::IgnoreMalformed,
        parameters.ignore_malformed.map(Value::Bool),
    );
    put(
        Param::IndexOptions,
        parameters.index_options.map(|options| Value::from(options.as_ref())),
    );
    put(Param::IndexPhrases, parameters.index_phrases.map(Value::Bool));

    if let Some(prefixes) = parameters.index_prefixes {
        put(Param::IndexPrefixes, Some(index_prefixes(field_type, prefixes)));
    }

    put(Param::Norms, parameters.norms.map(Value::Bool));
    put(
        Param::NullValue,
        parameters.null_value.clone().filter(|value| !value.is_null()),
    );
    put(
        Param::PositionIncrementGap,
        parameters.position_increment_gap.map(Value::from),
    );
    put(
        Param::Similarity,
        parameters.similarity.map(|similarity| Value::from(similarity.as_ref())),
    );
    put(
        Param::TermVector,
        parameters.term_vector.map(|term_vector| Value::from(term_vector.as_ref())),
    );
    put(Param::ScalingFactor, parameters.scaling_factor.map(Value::from));
}

// The object itself is always written; only its members are default-checked
fn index_prefixes(field_type: FieldType, prefixes: IndexPrefixes) -> Value {
    let mut object = Fragment::new();
    put_param(&mut object, field_type, Param::MinChars, Some(Value::from(prefixes.min_chars)));
    put_param(&mut object, field_type, Param::MaxChars, Some(Value::from(prefixes.max_chars)));
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::inference::TypeSource;
    use crate::schema::parameters::{
        DateFormat, IndexOptions, NamedDateFormat, Similarity, TermVector,
    };
    use serde_json::json;

    fn inferred(field_type: FieldType) -> Resolution {
        Resolution::new(field_type, TypeSource::Shape)
    }

    fn to_value(fragment: Fragment) -> Value {
        Value::Object(fragment)
    }

    #[test]
    fn test_default_only_parameters_are_empty() {
        let unset = MappingParameters::default();
        let explicit_defaults = MappingParameters {
            store: Some(false),
            index: Some(true),
            coerce: Some(true),
            fielddata: Some(false),
            doc_values: Some(true),
            ignore_malformed: Some(false),
            index_phrases: Some(false),
            norms: Some(true),
            similarity: Some(Similarity::Default),
            term_vector: Some(TermVector::No),
            ..Default::default()
        };

        assert_eq!(to_value(serialize(&inferred(FieldType::Text), &unset)), json!({}));
        assert_eq!(
            to_value(serialize(&inferred(FieldType::Text), &explicit_defaults)),
            json!({})
        );
    }

    #[test]
    fn test_explicit_type_is_written() {
        let fragment = serialize(
            &Resolution::explicit(FieldType::Double),
            &MappingParameters::default(),
        );
        assert_eq!(to_value(fragment), json!({"type": "double"}));
    }

    #[test]
    fn test_ignore_above_on_keyword() {
        let parameters = MappingParameters {
            ignore_above: Some(10),
            ..Default::default()
        };
        let fragment = serialize(&Resolution::explicit(FieldType::Keyword), &parameters);
        assert_eq!(to_value(fragment), json!({"type": "keyword", "ignore_above": 10}));
    }

    #[test]
    fn test_non_default_values_written_verbatim() {
        let parameters = MappingParameters {
            store: Some(true),
            index: Some(false),
            coerce: Some(false),
            fielddata: Some(true),
            ignore_malformed: Some(true),
            index_phrases: Some(true),
            norms: Some(false),
            analyzer: Some("ana".to_string()),
            search_analyzer: Some("sana".to_string()),
            normalizer: Some("norma".to_string()),
            index_options: Some(IndexOptions::Positions),
            null_value: Some(json!("NULLNULL")),
            position_increment_gap: Some(42),
            similarity: Some(Similarity::Boolean),
            term_vector: Some(TermVector::WithOffsets),
            ..Default::default()
        };
        let fragment = serialize(&inferred(FieldType::Text), &parameters);
        assert_eq!(
            to_value(fragment),
            json!({
                "store": true,
                "index": false,
                "coerce": false,
                "fielddata": true,
                "analyzer": "ana",
                "search_analyzer": "sana",
                "normalizer": "norma",
                "ignore_malformed": true,
                "index_options": "positions",
                "index_phrases": true,
                "norms": false,
                "null_value": "NULLNULL",
                "position_increment_gap": 42,
                "similarity": "boolean",
                "term_vector": "with_offsets"
            })
        );
    }

    #[test]
    fn test_doc_values() {
        let keep = MappingParameters {
            doc_values: Some(true),
            ..Default::default()
        };
        let drop = MappingParameters {
            doc_values: Some(false),
            ..Default::default()
        };
        let keyword = Resolution::explicit(FieldType::Keyword);
        assert_eq!(to_value(serialize(&keyword, &keep)), json!({"type": "keyword"}));
        assert_eq!(
            to_value(serialize(&keyword, &drop)),
            json!({"type": "keyword", "doc_values": false})
        );
    }

    #[test]
    fn test_copy_to_keeps_order() {
        let parameters = MappingParameters {
            copy_to: vec!["foo".to_string(), "bar".to_string()],
            ..Default::default()
        };
        let fragment = serialize(&inferred(FieldType::Text), &parameters);
        assert_eq!(to_value(fragment), json!({"copy_to": ["foo", "bar"]}));

        let none = serialize(&inferred(FieldType::Text), &MappingParameters::default());
        assert!(!none.contains_key("copy_to"));
    }

    #[test]
    fn test_date_formats() {
        let custom = MappingParameters {
            date_format: Some(DateFormat::Custom("YYYYMMDD".to_string())),
            ..Default::default()
        };
        assert_eq!(
            to_value(serialize(&Resolution::explicit(FieldType::Date), &custom)),
            json!({"type": "date", "format": "YYYYMMDD"})
        );

        let named = MappingParameters {
            date_format: Some(DateFormat::Named(NamedDateFormat::BasicDate)),
            ..Default::default()
        };
        assert_eq!(
            to_value(serialize(&inferred(FieldType::Date), &named)),
            json!({"format": "basic_date"})
        );
    }

    #[test]
    fn test_index_prefixes() {
        let default_prefixes = MappingParameters {
            index_prefixes: Some(IndexPrefixes::default()),
            ..Default::default()
        };
        assert_eq!(
            to_value(serialize(&inferred(FieldType::Text), &default_prefixes)),
            json!({"index_prefixes": {}})
        );

        let custom_prefixes = MappingParameters {
            index_prefixes: Some(IndexPrefixes {
                min_chars: 1,
                max_chars: 10,
            }),
            ..Default::default()
        };
        assert_eq!(
            to_value(serialize(&inferred(FieldType::Text), &custom_prefixes)),
            json!({"index_prefixes": {"min_chars": 1, "max_chars": 10}})
        );
    }

    #[test]
    fn test_scaling_factor() {
        let parameters = MappingParameters {
            scaling_factor: Some(100.0),
            ..Default::default()
        };
        let fragment = serialize(&Resolution::explicit(FieldType::ScaledFloat), &parameters);
        assert_eq!(
            to_value(fragment),
            json!({"type": "scaled_float", "scaling_factor": 100.0})
        );
    }

    #[test]
    fn test_null_value_of_null_is_not_written() {
        let parameters = MappingParameters {
            null_value: Some(Value::Null),
            ..Default::default()
        };
        assert_eq!(to_value(serialize(&inferred(FieldType::Keyword), &parameters)), json!({}));
    }
}
