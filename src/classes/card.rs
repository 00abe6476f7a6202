use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classes::base::{unwrap_default_export, ExtraFields, JsonObject};
use crate::error::ExportResult;

/// Raw nested reference to the owning set, only used to derive `set_id`
pub const SET_REFERENCE_FIELD: &str = "set";
pub const SET_ID_FIELD: &str = "set_id";

/// Exported Card Object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub set_id: String,

    /// Booster ids this card can be pulled from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boosters: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Card {
    pub fn new(set_id: impl Into<String>) -> Self {
        Self {
            set_id: set_id.into(),
            boosters: None,
            extra: ExtraFields::new(),
        }
    }

    /// Normalize a loaded card module.
    ///
    /// `set_id` is the nested set reference's `id` when that is a non-empty
    /// string, otherwise `parent_dir`. Whatever `set_id` the raw record carried
    /// is overwritten, and the nested reference is removed.
    pub fn from_module(module: Value, path: &Path, parent_dir: &str) -> ExportResult<Self> {
        let mut record = unwrap_default_export(module, path)?;

        let set_id = referenced_set_id(record.get(SET_REFERENCE_FIELD))
            .unwrap_or(parent_dir)
            .to_string();
        record.insert(SET_ID_FIELD.to_string(), Value::String(set_id));

        Self::from_record(record, path)
    }
}

impl JsonObject for Card {
    fn keys_to_skip() -> &'static [&'static str] {
        &[SET_REFERENCE_FIELD]
    }
}

fn referenced_set_id(reference: Option<&Value>) -> Option<&str> {
    reference?
        .get("id")?
        .as_str()
        .filter(|id| !id.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_referenced_set_id_requires_non_empty_string() {
        assert_eq!(referenced_set_id(Some(&json!({"id": "A1"}))), Some("A1"));
        assert_eq!(referenced_set_id(Some(&json!({"id": ""}))), None);
        assert_eq!(referenced_set_id(Some(&json!({"id": 7}))), None);
        assert_eq!(referenced_set_id(Some(&json!("A1"))), None);
        assert_eq!(referenced_set_id(None), None);
    }

    #[test]
    fn test_raw_set_id_is_never_trusted() {
        let card = Card::from_module(
            json!({"set_id": "forged", "name": {"en": "Pikachu"}}),
            Path::new("data/Base/A2/58.json"),
            "A2",
        )
        .unwrap();
        assert_eq!(card.set_id, "A2");
    }
}
