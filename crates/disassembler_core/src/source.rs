//! Read-only access to the host's record database.
//!
//! The matching pass and the override loader only ever see records through
//! [`RecordSource`], so they can run against the live host or against an
//! in-memory [`GameData`] dump alike.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::form::{FormId, NO_LOAD_INDEX};
use crate::record::{AttachmentMod, LooseItem, Record};

pub trait RecordSource {
    /// Load-order index of `plugin`, or [`NO_LOAD_INDEX`] when it is not loaded.
    fn load_index(&self, plugin: &str) -> u8;

    fn lookup(&self, form_id: FormId) -> Option<&Record>;

    /// Every attachment mod, in the host's own iteration order.
    fn attachment_mods(&self) -> Box<dyn Iterator<Item = &AttachmentMod> + '_>;

    fn is_plugin_loaded(&self, plugin: &str) -> bool {
        self.load_index(plugin) != NO_LOAD_INDEX
    }

    /// Loose item the host itself associates with `m`. A dangling or
    /// mistyped association counts as no association.
    fn native_loose_item(&self, m: &AttachmentMod) -> Option<&LooseItem> {
        m.loose_item
            .and_then(|id| self.lookup(id))
            .and_then(Record::as_loose_item)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct GameDataDump {
    plugins: Vec<String>,
    #[serde(default)]
    records: Vec<Record>,
}

/// In-memory record database, built from a JSON dump of the host's data.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    plugins: Vec<String>,
    records: Vec<Record>,
    by_id: HashMap<FormId, usize>,
}

impl GameData {
    pub fn new(plugins: Vec<String>, records: Vec<Record>) -> Result<Self, CoreError> {
        if plugins.len() >= usize::from(NO_LOAD_INDEX) {
            return Err(CoreError::new(
                CoreErrorCode::Parse,
                format!(
                    "load order has {} plugins; at most {} are addressable",
                    plugins.len(),
                    NO_LOAD_INDEX
                ),
            ));
        }

        let mut by_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let form_id = record.form_id();
            if by_id.insert(form_id, index).is_some() {
                return Err(CoreError::new(
                    CoreErrorCode::Parse,
                    format!("duplicate record for form 0x{form_id}"),
                ));
            }
        }

        Ok(Self {
            plugins,
            records,
            by_id,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let dump: GameDataDump = serde_json::from_str(text).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("invalid record dump: {e}"))
        })?;
        Self::new(dump.plugins, dump.records)
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for GameData {
    fn load_index(&self, plugin: &str) -> u8 {
        self.plugins
            .iter()
            .position(|name| name.eq_ignore_ascii_case(plugin))
            .and_then(|index| u8::try_from(index).ok())
            .unwrap_or(NO_LOAD_INDEX)
    }

    fn lookup(&self, form_id: FormId) -> Option<&Record> {
        self.by_id.get(&form_id).map(|&index| &self.records[index])
    }

    fn attachment_mods(&self) -> Box<dyn Iterator<Item = &AttachmentMod> + '_> {
        Box::new(self.records.iter().filter_map(Record::as_attachment_mod))
    }
}
