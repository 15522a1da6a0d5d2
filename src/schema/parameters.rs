// Mapping parameter model for searchmap
//
// This module defines the engine-facing vocabulary: field types, the bag of
// optional per-field mapping parameters, and the specs for multi-fields and
// completion fields. Every parameter is optional; "unset" and "set to the
// implicit default" are both representable and serialize identically.

use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

/// Target field types understood by the search engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FieldType {
    Text,
    Keyword,
    Long,
    Integer,
    Short,
    Byte,
    Double,
    Float,
    HalfFloat,
    ScaledFloat,
    Date,
    DateNanos,
    Boolean,
    Binary,
    IntegerRange,
    FloatRange,
    LongRange,
    DoubleRange,
    DateRange,
    IpRange,
    Object,
    Nested,
    Ip,
    TokenCount,
    Percolator,
    Flattened,
    SearchAsYouType,
    GeoPoint,
    Completion,
}

impl FieldType {
    /// Returns true for the two container types that can carry sub-properties
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::Object | FieldType::Nested)
    }
}

/// Dynamic-mapping mode of one object level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DynamicMapping {
    /// Not declared; the level inherits its parent's behaviour
    #[default]
    Inherit,
    True,
    False,
    Strict,
    Runtime,
}

impl DynamicMapping {
    /// Returns the value to write under `dynamic`, or `None` when nothing is declared
    pub fn mapping_value(&self) -> Option<&'static str> {
        match self {
            DynamicMapping::Inherit => None,
            DynamicMapping::True => Some("true"),
            DynamicMapping::False => Some("false"),
            DynamicMapping::Strict => Some("strict"),
            DynamicMapping::Runtime => Some("runtime"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum IndexOptions {
    Docs,
    Freqs,
    Positions,
    Offsets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
pub enum Similarity {
    /// Whatever the index is configured with
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "BM25")]
    Bm25,
    #[strum(serialize = "classic")]
    Classic,
    #[strum(serialize = "boolean")]
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TermVector {
    No,
    Yes,
    WithPositions,
    WithOffsets,
    WithPositionsOffsets,
    WithPositionsPayloads,
    WithPositionsOffsetsPayloads,
}

/// Built-in date formats known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NamedDateFormat {
    BasicDate,
    BasicDateTime,
    BasicDateTimeNoMillis,
    BasicTime,
    BasicTimeNoMillis,
    Date,
    DateHourMinute,
    DateHourMinuteSecond,
    DateHourMinuteSecondMillis,
    DateOptionalTime,
    DateTime,
    DateTimeNoMillis,
    EpochMillis,
    EpochSecond,
    HourMinuteSecond,
    StrictDate,
    StrictDateOptionalTime,
    StrictDateTime,
    Time,
    WeekDate,
    Year,
    YearMonth,
    YearMonthDay,
}

/// Date format of a date field: a built-in name or a custom pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormat {
    Named(NamedDateFormat),
    Custom(String),
}

impl DateFormat {
    /// Returns the string written under `format`
    pub fn mapping_value(&self) -> String {
        match self {
            DateFormat::Named(named) => named.to_string(),
            DateFormat::Custom(pattern) => pattern.clone(),
        }
    }
}

/// Edge n-gram prefix indexing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexPrefixes {
    pub min_chars: u32,
    pub max_chars: u32,
}

impl Default for IndexPrefixes {
    fn default() -> Self {
        Self {
            min_chars: 2,
            max_chars: 5,
        }
    }
}

/// Optional per-field mapping parameters
///
/// Each `None` means "not declared". The serializer compares declared values
/// against the implicit default table and drops the ones that match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingParameters {
    pub store: Option<bool>,
    pub index: Option<bool>,
    pub coerce: Option<bool>,
    pub fielddata: Option<bool>,
    pub doc_values: Option<bool>,
    pub ignore_malformed: Option<bool>,
    pub index_phrases: Option<bool>,
    pub norms: Option<bool>,
    pub ignore_above: Option<u32>,
    pub date_format: Option<DateFormat>,
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    pub normalizer: Option<String>,
    pub index_options: Option<IndexOptions>,
    pub index_prefixes: Option<IndexPrefixes>,
    /// Written verbatim; its JSON type should match the field type
    pub null_value: Option<Value>,
    pub position_increment_gap: Option<u32>,
    pub similarity: Option<Similarity>,
    pub term_vector: Option<TermVector>,
    pub scaling_factor: Option<f64>,
    /// Fields this field's value is copied into, in declaration order
    pub copy_to: Vec<String>,
}

/// One secondary sub-field of a multi-field
#[derive(Debug, Clone, PartialEq)]
pub struct InnerField {
    /// Name of the sub-field under the primary field's `fields` map
    pub suffix: String,
    pub field_type: FieldType,
    pub parameters: MappingParameters,
}

impl InnerField {
    pub fn new(suffix: &str, field_type: FieldType) -> Self {
        Self {
            suffix: suffix.to_string(),
            field_type,
            parameters: MappingParameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: MappingParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Secondary sub-fields of a multi-field property
///
/// The primary field is the owning property's own type and parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiFieldSpec {
    pub inner_fields: Vec<InnerField>,
}

impl MultiFieldSpec {
    pub fn new(inner_fields: Vec<InnerField>) -> Self {
        Self { inner_fields }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContextKind {
    Category,
    Geo,
}

/// One context definition of a completion field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContextSpec {
    pub name: String,
    pub kind: ContextKind,
    /// Document path the context value is read from
    pub path: Option<String>,
    /// Geohash precision, only meaningful for geo contexts
    pub precision: Option<String>,
}

impl CompletionContextSpec {
    pub fn new(name: &str, kind: ContextKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            path: None,
            precision: None,
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn with_precision(mut self, precision: &str) -> Self {
        self.precision = Some(precision.to_string());
        self
    }
}

/// Completion-field settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionSpec {
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    pub max_input_length: Option<u32>,
    pub preserve_separators: Option<bool>,
    pub preserve_position_increments: Option<bool>,
    pub contexts: Vec<CompletionContextSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::Text.as_ref(), "text");
        assert_eq!(FieldType::ScaledFloat.as_ref(), "scaled_float");
        assert_eq!(FieldType::GeoPoint.as_ref(), "geo_point");
        assert_eq!(FieldType::SearchAsYouType.as_ref(), "search_as_you_type");
        assert_eq!(FieldType::from_str("date_nanos").unwrap(), FieldType::DateNanos);
        assert!(FieldType::from_str("string").is_err());
    }

    #[test]
    fn test_dynamic_mapping_values() {
        assert_eq!(DynamicMapping::default(), DynamicMapping::Inherit);
        assert_eq!(DynamicMapping::Inherit.mapping_value(), None);
        assert_eq!(DynamicMapping::Strict.mapping_value(), Some("strict"));
        assert_eq!(DynamicMapping::from_str("false").unwrap(), DynamicMapping::False);
    }

    #[test]
    fn test_enum_parameter_names() {
        assert_eq!(Similarity::Bm25.as_ref(), "BM25");
        assert_eq!(Similarity::from_str("boolean").unwrap(), Similarity::Boolean);
        assert_eq!(TermVector::WithPositionsOffsets.as_ref(), "with_positions_offsets");
        assert_eq!(IndexOptions::Positions.as_ref(), "positions");
        assert_eq!(ContextKind::Geo.as_ref(), "geo");
    }

    #[test]
    fn test_date_format_value() {
        let named = DateFormat::Named(NamedDateFormat::DateHourMinuteSecondMillis);
        assert_eq!(named.mapping_value(), "date_hour_minute_second_millis");

        let custom = DateFormat::Custom("YYYYMMDD".to_string());
        assert_eq!(custom.mapping_value(), "YYYYMMDD");
    }

    #[test]
    fn test_container_types() {
        assert!(FieldType::Object.is_container());
        assert!(FieldType::Nested.is_container());
        assert!(!FieldType::Keyword.is_container());
    }
}
