// Implicit default table for mapping parameters
//
// This module holds the single table of implicit parameter defaults. A
// declared parameter is written to a mapping only when its value differs from
// the entry found here; parameters without an entry are written whenever they
// are declared. Type-scoped entries are listed before the general ones and
// the first match wins.

use serde_json::Value;
use strum::{AsRefStr, Display};

use crate::schema::parameters::FieldType;

/// Mapping parameter keys, named as the engine spells them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Param {
    Store,
    Index,
    Coerce,
    Fielddata,
    DocValues,
    IgnoreMalformed,
    IndexPhrases,
    IndexOptions,
    Norms,
    TermVector,
    Similarity,
    PositionIncrementGap,
    NullValue,
    IgnoreAbove,
    Format,
    Analyzer,
    SearchAnalyzer,
    Normalizer,
    ScalingFactor,
    CopyTo,
    IndexPrefixes,
    MinChars,
    MaxChars,
    MaxInputLength,
    PreserveSeparators,
    PreservePositionIncrements,
}

/// Which field types an entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Type(FieldType),
    Any,
}

impl Scope {
    fn covers(&self, field_type: FieldType) -> bool {
        match self {
            Scope::Type(scoped) => *scoped == field_type,
            Scope::Any => true,
        }
    }
}

/// An implicit default value
#[derive(Debug, Clone, Copy, PartialEq)]
enum Implicit {
    Bool(bool),
    Str(&'static str),
    Int(u64),
}

impl Implicit {
    fn to_value(self) -> Value {
        match self {
            Implicit::Bool(b) => Value::Bool(b),
            Implicit::Str(s) => Value::String(s.to_string()),
            Implicit::Int(n) => Value::from(n),
        }
    }
}

const DEFAULTS: &[(Scope, Param, Implicit)] = &[
    // completion fields
    (Scope::Type(FieldType::Completion), Param::Analyzer, Implicit::Str("simple")),
    (Scope::Type(FieldType::Completion), Param::SearchAnalyzer, Implicit::Str("simple")),
    (Scope::Type(FieldType::Completion), Param::MaxInputLength, Implicit::Int(50)),
    (Scope::Type(FieldType::Completion), Param::PreserveSeparators, Implicit::Bool(true)),
    (Scope::Type(FieldType::Completion), Param::PreservePositionIncrements, Implicit::Bool(true)),
    // every field type
    (Scope::Any, Param::Store, Implicit::Bool(false)),
    (Scope::Any, Param::Index, Implicit::Bool(true)),
    (Scope::Any, Param::Coerce, Implicit::Bool(true)),
    (Scope::Any, Param::Fielddata, Implicit::Bool(false)),
    (Scope::Any, Param::DocValues, Implicit::Bool(true)),
    (Scope::Any, Param::IgnoreMalformed, Implicit::Bool(false)),
    (Scope::Any, Param::IndexPhrases, Implicit::Bool(false)),
    (Scope::Any, Param::Norms, Implicit::Bool(true)),
    (Scope::Any, Param::TermVector, Implicit::Str("no")),
    (Scope::Any, Param::Similarity, Implicit::Str("default")),
    (Scope::Any, Param::MinChars, Implicit::Int(2)),
    (Scope::Any, Param::MaxChars, Implicit::Int(5)),
];

/// Looks up the implicit default of a parameter for a field type
pub fn implicit_default(field_type: FieldType, param: Param) -> Option<Value> {
    DEFAULTS
        .iter()
        .find(|(scope, entry, _)| *entry == param && scope.covers(field_type))
        .map(|(_, _, implicit)| implicit.to_value())
}

/// Returns true when `value` equals the parameter's implicit default
pub fn is_implicit_default(field_type: FieldType, param: Param, value: &Value) -> bool {
    implicit_default(field_type, param).is_some_and(|default| default == *value)
}
