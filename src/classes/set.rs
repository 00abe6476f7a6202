use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classes::base::{unwrap_default_export, ExtraFields, JsonObject};
use crate::error::ExportResult;

/// Language code to display string
pub type LocalizedName = IndexMap<String, String>;

/// Raw field carrying the deprecated serie lineage of a set
pub const DEPRECATED_LINEAGE_FIELD: &str = "serie";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardCount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official: Option<u32>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoosterInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LocalizedName>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Exported Set Object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetInfo {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LocalizedName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_count: Option<CardCount>,

    /// Booster id to booster details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boosters: Option<IndexMap<String, BoosterInfo>>,

    /// ISO date, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl SetInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            card_count: None,
            boosters: None,
            release_date: None,
            extra: ExtraFields::new(),
        }
    }

    /// Normalize a loaded set module.
    ///
    /// The deprecated lineage field is dropped, and a set without any name
    /// gets `{ default_locale: file_stem }`.
    pub fn from_module(
        module: Value,
        path: &Path,
        file_stem: &str,
        default_locale: &str,
    ) -> ExportResult<Self> {
        let record = unwrap_default_export(module, path)?;
        let mut set = Self::from_record(record, path)?;
        set.ensure_name(default_locale, file_stem);
        Ok(set)
    }

    /// Synthesize a single-locale name when the record has none
    pub fn ensure_name(&mut self, locale: &str, fallback: &str) {
        if self.name.as_ref().map_or(true, IndexMap::is_empty) {
            let mut name = LocalizedName::new();
            name.insert(locale.to_string(), fallback.to_string());
            self.name = Some(name);
        }
    }
}

impl JsonObject for SetInfo {
    fn keys_to_skip() -> &'static [&'static str] {
        &[DEPRECATED_LINEAGE_FIELD]
    }
}
