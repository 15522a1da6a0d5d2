use serde_json::json;

use searchmap::mapping::inference::{resolve, TypeSource};
use searchmap::schema::FieldType;
use searchmap::{Error, MappingBuilder, SchemaParser, SchemaValidator};

const LIBRARY: &str = r#"{
    "schemas": [
        {
            "name": "Author",
            "properties": [
                {"name": "name", "shape": "string", "type": "text",
                 "fields": [{"suffix": "raw", "type": "keyword", "ignore_above": 256}]},
                {"name": "books", "shape": {"collection": "Book"}, "ignore_fields": ["authors"]}
            ]
        },
        {
            "name": "Book",
            "index_name": "library-books",
            "dynamic": "strict",
            "properties": [
                {"name": "id", "shape": "string", "id": true},
                {"name": "title", "shape": "string", "analyzer": "english", "copy_to": ["all"]},
                {"name": "published", "shape": "local_date", "type": "date", "format": "year_month_day"},
                {"name": "price", "shape": "big_decimal", "type": "scaled_float", "scaling_factor": 100},
                {"name": "authors", "shape": {"collection": "Author"}, "type": "nested",
                 "include_in_parent": true, "ignore_fields": ["books"]},
                {"name": "suggest", "shape": "completion",
                 "completion": {"contexts": [{"name": "genre", "type": "category", "path": "genre"}]}},
                {"name": "shelf", "shape": "string", "geo_point": true},
                {"name": "extra", "shape": "Map", "mapping": {"type": "flattened"}},
                {"name": "cache", "shape": "string", "transient": true},
                {"name": "library", "shape": "string", "parent_type": "library"}
            ]
        }
    ]
}"#;

#[test]
fn test_compile_from_definitions() {
    let registry = SchemaParser::new().parse_str(LIBRARY).unwrap();
    SchemaValidator::new().validate(&registry).unwrap();

    let document = MappingBuilder::new(&registry).build_mapping("Book").unwrap();
    assert_eq!(document.dynamic(), Some("strict"));
    assert_eq!(document.parent_type(), Some("library"));

    assert_eq!(
        document.into_value(),
        json!({
            "dynamic": "strict",
            "_parent": {"type": "library"},
            "properties": {
                "id": {"type": "keyword"},
                "title": {"copy_to": ["all"], "analyzer": "english"},
                "published": {"type": "date", "format": "year_month_day"},
                "price": {"type": "scaled_float", "scaling_factor": 100.0},
                "authors": {
                    "type": "nested",
                    "include_in_parent": true,
                    "properties": {
                        "name": {
                            "type": "text",
                            "fields": {"raw": {"type": "keyword", "ignore_above": 256}}
                        }
                    }
                },
                "suggest": {
                    "type": "completion",
                    "contexts": [{"name": "genre", "type": "category", "path": "genre"}]
                },
                "shelf": {"type": "geo_point"},
                "extra": {"type": "flattened"}
            }
        })
    );
}

#[test]
fn test_resolution_sources() {
    let registry = SchemaParser::new().parse_str(LIBRARY).unwrap();
    let book = registry.get("Book").unwrap();

    let source_of = |name: &str| resolve(book.property(name).unwrap());

    assert_eq!(source_of("title").field_type, FieldType::Text);
    assert_eq!(source_of("title").source, TypeSource::Shape);
    assert_eq!(source_of("authors").source, TypeSource::Explicit);
    assert_eq!(source_of("shelf").source, TypeSource::Marker);
    assert_eq!(source_of("extra").field_type, FieldType::Object);
    assert_eq!(source_of("extra").source, TypeSource::Fallback);
}

#[test]
fn test_invalid_definitions_are_reported() {
    let missing_reference = r#"{"schemas": [
        {"name": "Book", "properties": [{"name": "author", "shape": {"entity": "Author"}}]}
    ]}"#;
    let registry = SchemaParser::new().parse_str(missing_reference).unwrap();
    assert!(matches!(
        SchemaValidator::new().validate(&registry),
        Err(Error::ValidationError(_))
    ));
    assert!(MappingBuilder::new(&registry).build_mapping("Book").is_err());

    let bad_type = r#"{"schemas": [
        {"name": "Book", "properties": [{"name": "title", "shape": "string", "type": "txt"}]}
    ]}"#;
    assert!(matches!(
        SchemaParser::new().parse_str(bad_type),
        Err(Error::ParseError(_))
    ));
}

#[test]
fn test_declared_parameters_survive_on_completion_and_null() {
    let definitions = r#"{"schemas": [
        {"name": "Hotel", "properties": [
            {"name": "code", "shape": "string", "null_value": null},
            {"name": "suggest", "shape": "completion", "analyzer": "standard", "store": true,
             "copy_to": ["all"], "completion": {"max_input_length": 20}}
        ]}
    ]}"#;
    let registry = SchemaParser::new().parse_str(definitions).unwrap();
    let document = MappingBuilder::new(&registry).build_mapping("Hotel").unwrap();

    assert_eq!(
        document.into_value(),
        json!({
            "properties": {
                "code": {},
                "suggest": {
                    "type": "completion",
                    "store": true,
                    "copy_to": ["all"],
                    "analyzer": "standard",
                    "max_input_length": 20
                }
            }
        })
    );
}
