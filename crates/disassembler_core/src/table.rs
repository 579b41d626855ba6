use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use crate::form::FormId;
use crate::record::LooseItem;

/// Selects one of the three mapping tables. The Nth appearance of the same
/// mod on one robot is looked up in the Nth table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachIndex {
    Default,
    Index1,
    Index2,
}

impl AttachIndex {
    pub const ALL: [AttachIndex; 3] = [Self::Default, Self::Index1, Self::Index2];

    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Index1,
            2 => Self::Index2,
            _ => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Default => "default",
            Self::Index1 => "index1",
            Self::Index2 => "index2",
        }
    }
}

/// Attachment mod id to the loose item it breaks down into.
///
/// Values are always resolved item records; there is no placeholder entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<FormId, LooseItem>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `mod_id`. Returns the previous item.
    pub fn insert(&mut self, mod_id: FormId, item: &LooseItem) -> Option<LooseItem> {
        match self.entries.entry(mod_id) {
            Entry::Occupied(mut slot) => Some(slot.insert(item.clone())),
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
                None
            }
        }
    }

    pub fn get(&self, mod_id: FormId) -> Option<&LooseItem> {
        self.entries.get(&mod_id)
    }

    pub fn contains(&self, mod_id: FormId) -> bool {
        self.entries.contains_key(&mod_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by mod id.
    pub fn sorted_entries(&self) -> Vec<(FormId, &LooseItem)> {
        let mut out: Vec<_> = self.entries.iter().map(|(&id, item)| (id, item)).collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSet {
    pub default: MappingTable,
    pub index1: MappingTable,
    pub index2: MappingTable,
}

impl TableSet {
    pub fn get(&self, index: AttachIndex) -> &MappingTable {
        match index {
            AttachIndex::Default => &self.default,
            AttachIndex::Index1 => &self.index1,
            AttachIndex::Index2 => &self.index2,
        }
    }

    pub fn get_mut(&mut self, index: AttachIndex) -> &mut MappingTable {
        match index {
            AttachIndex::Default => &mut self.default,
            AttachIndex::Index1 => &mut self.index1,
            AttachIndex::Index2 => &mut self.index2,
        }
    }
}
