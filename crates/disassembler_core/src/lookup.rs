use std::collections::HashMap;

use crate::form::FormId;
use crate::record::LooseItem;
use crate::source::RecordSource;
use crate::table::{AttachIndex, MappingTable, TableSet};

/// Frozen lookup tables answering loose item queries.
///
/// Built once when the host's data is ready and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupService {
    native: MappingTable,
    tables: TableSet,
}

impl LookupService {
    /// A service with no mappings at all; every lookup returns `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Freezes `tables` together with the loose items the host itself links
    /// to its attachment mods.
    pub fn freeze<S>(source: &S, tables: TableSet) -> Self
    where
        S: RecordSource + ?Sized,
    {
        let mut native = MappingTable::new();
        for m in source.attachment_mods() {
            if let Some(item) = source.native_loose_item(m) {
                native.insert(m.form_id, item);
            }
        }
        Self { native, tables }
    }

    /// Loose item for one mod.
    ///
    /// The host's own association wins; otherwise the table chosen by
    /// `attach_index` is consulted (1 and 2 select their tables, any other
    /// value the default table).
    pub fn resolve(&self, mod_id: Option<FormId>, attach_index: i32) -> Option<&LooseItem> {
        let mod_id = mod_id?;
        self.native.get(mod_id).or_else(|| {
            self.tables
                .get(AttachIndex::from_raw(attach_index))
                .get(mod_id)
        })
    }

    /// Loose items for every mod on one robot, in order.
    ///
    /// The Nth occurrence of a mod id is resolved with attach index N.
    /// Absent mods are skipped and unresolved mods produce no output, so the
    /// result can be shorter than `mods`.
    pub fn resolve_all(&self, mods: &[Option<FormId>]) -> Vec<&LooseItem> {
        let mut seen: HashMap<FormId, i32> = HashMap::new();
        let mut out = Vec::new();
        for mod_id in mods.iter().flatten() {
            let count = seen.entry(*mod_id).or_insert(0);
            if let Some(item) = self.resolve(Some(*mod_id), *count) {
                out.push(item);
            }
            *count += 1;
        }
        out
    }

    pub fn table(&self, index: AttachIndex) -> &MappingTable {
        self.tables.get(index)
    }

    pub fn native_table(&self) -> &MappingTable {
        &self.native
    }

    pub fn is_empty(&self) -> bool {
        self.native.is_empty() && AttachIndex::ALL.iter().all(|&i| self.table(i).is_empty())
    }
}
