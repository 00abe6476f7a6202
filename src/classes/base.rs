use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ExportError, ExportResult};

/// Open-ended bag for fields a record type does not model
pub type ExtraFields = Map<String, Value>;

/// Base trait for exported records decoded from raw data modules
pub trait JsonObject: Serialize + DeserializeOwned {
    /// Raw keys that must never reach the final record
    fn keys_to_skip() -> &'static [&'static str] {
        &[]
    }

    /// Drop skipped keys, then decode the remaining record
    fn from_record(mut record: Map<String, Value>, path: &Path) -> ExportResult<Self> {
        for key in Self::keys_to_skip() {
            record.shift_remove(*key);
        }
        serde_json::from_value(Value::Object(record))
            .map_err(|e| ExportError::decode(path, e.to_string()))
    }
}

/// Unwrap a data module into its record object.
///
/// A module is either the record itself or an object exposing the record under
/// `"default"`. Either way the record has to be a JSON object.
pub fn unwrap_default_export(module: Value, path: &Path) -> ExportResult<Map<String, Value>> {
    let record = match module {
        Value::Object(mut wrapper) if wrapper.get("default").is_some_and(Value::is_object) => {
            wrapper.shift_remove("default").unwrap_or(Value::Null)
        }
        other => other,
    };

    match record {
        Value::Object(record) => Ok(record),
        other => Err(ExportError::decode(
            path,
            format!("expected a record object, found {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
