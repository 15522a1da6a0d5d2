// Completion field emission
//
// Completion fields always write their type, then the general mapping
// parameters declared on the property, then the completion parameters that
// differ from the engine defaults, then the context definitions in declaration
// order. A completion parameter replaces a general one of the same name. No
// contexts means no `contexts` key at all.

use serde_json::{Map, Value};

use crate::mapping::defaults::Param;
use crate::mapping::inference::Resolution;
use crate::mapping::serializer::{put_param, serialize, Fragment};
use crate::mapping::{FIELD_CONTEXTS, FIELD_TYPE};
use crate::schema::parameters::{
    CompletionContextSpec, CompletionSpec, FieldType, MappingParameters,
};

const CONTEXT_NAME: &str = "name";
const CONTEXT_PRECISION: &str = "precision";
const CONTEXT_PATH: &str = "path";

/// Builds the fragment of a completion field
pub fn completion_fragment(parameters: &MappingParameters, spec: &CompletionSpec) -> Fragment {
    let field_type = FieldType::Completion;
    let mut fragment = serialize(&Resolution::explicit(field_type), parameters);

    let mut put = |param: Param, value: Option<Value>| {
        if value.is_some() {
            fragment.remove(param.as_ref());
        }
        put_param(&mut fragment, field_type, param, value)
    };

    put(Param::Analyzer, spec.analyzer.clone().map(Value::from));
    put(
        Param::SearchAnalyzer,
        spec.search_analyzer.clone().map(Value::from),
    );
    put(Param::MaxInputLength, spec.max_input_length.map(Value::from));
    put(
        Param::PreserveSeparators,
        spec.preserve_separators.map(Value::Bool),
    );
    put(
        Param::PreservePositionIncrements,
        spec.preserve_position_increments.map(Value::Bool),
    );

    if let Some(contexts) = emit_contexts(&spec.contexts) {
        fragment.insert(FIELD_CONTEXTS.to_string(), contexts);
    }

    fragment
}

/// Emits the context list of a completion field, or `None` when there are no contexts
pub fn emit_contexts(contexts: &[CompletionContextSpec]) -> Option<Value> {
    if contexts.is_empty() {
        return None;
    }

    Some(Value::Array(contexts.iter().map(context_entry).collect()))
}

fn context_entry(context: &CompletionContextSpec) -> Value {
    let mut entry = Map::new();
    entry.insert(CONTEXT_NAME.to_string(), Value::from(context.name.as_str()));
    entry.insert(FIELD_TYPE.to_string(), Value::from(context.kind.as_ref()));

    if let Some(precision) = context.precision.as_deref().filter(|p| !p.is_empty()) {
        entry.insert(CONTEXT_PRECISION.to_string(), Value::from(precision));
    }
    if let Some(path) = context.path.as_deref().filter(|p| !p.is_empty()) {
        entry.insert(CONTEXT_PATH.to_string(), Value::from(path));
    }

    Value::Object(entry)
}
