//! State snapshots and the merge/diff rules
//!
//! A snapshot is a flat map from field name to JSON value. Updates are
//! merged at the top level only: fields in the update overwrite or add,
//! everything else carries over, and nested objects are replaced wholesale.

use serde_json::{Map, Value};

use crate::error::{ComponentError, Result};

/// A component's state: field name -> value
pub type State = Map<String, Value>;

/// A field whose value differs between two snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    pub field: String,
    pub new_value: Value,
    /// `None` when the field did not exist before
    pub old_value: Option<Value>,
}

/// Accept a partial update, rejecting anything that is not a JSON object
pub fn into_partial(value: Value) -> Result<State> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(ComponentError::InvalidUpdate {
            found: json_type_name(&other),
        }),
    }
}

/// Copy `old` and overwrite it with every field of `partial`
///
/// A missing `old` snapshot merges as if it were empty.
pub fn merge(old: Option<&State>, partial: &State) -> State {
    let mut merged = old.cloned().unwrap_or_default();
    for (field, value) in partial {
        merged.insert(field.clone(), value.clone());
    }
    merged
}

/// Fields of `partial` whose value in `new` differs from `old`
///
/// Walks the update's own field names. Comparison is strict value equality,
/// so `1`, `"1"` and `true` are all different, and a field that was absent
/// before always counts as changed.
pub fn diff(partial: &State, old: Option<&State>, new: &State) -> Vec<FieldDiff> {
    partial
        .keys()
        .filter_map(|field| {
            let new_value = new.get(field)?;
            let old_value = old.and_then(|state| state.get(field));

            if old_value == Some(new_value) {
                return None;
            }

            Some(FieldDiff {
                field: field.clone(),
                new_value: new_value.clone(),
                old_value: old_value.cloned(),
            })
        })
        .collect()
}

/// Human-readable JSON type for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
