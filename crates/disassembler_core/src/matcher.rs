//! Derives loose items for robot mods the host leaves unmapped.
//!
//! Many actor mods are colour variants of one another: they share a material
//! swap and hand the robot the same weapon, but only one of them is linked to
//! a loose item. Every unlinked variant inherits the loose item of a linked
//! one.

use tracing::{debug, info};

use crate::form::FormId;
use crate::record::{AttachmentMod, LooseItem, PropertyTarget, TargetType, Weapon};
use crate::source::RecordSource;
use crate::table::MappingTable;

/// Weapon granted by `m` through its forced-inventory effect, if any.
///
/// Only actor mods are scanned. The first set/add form entry whose value
/// resolves to a weapon wins.
pub fn forced_inventory_weapon<'a, S>(source: &'a S, m: &AttachmentMod) -> Option<&'a Weapon>
where
    S: RecordSource + ?Sized,
{
    if m.target_type != TargetType::Actor {
        return None;
    }

    m.properties
        .iter()
        .filter(|p| p.target == PropertyTarget::ForcedInventory)
        .filter(|p| p.op.grants_form())
        .filter_map(|p| p.value)
        .find_map(|id| match source.lookup(id) {
            Some(record) => record.as_weapon(),
            None => {
                debug!(
                    "forced inventory form 0x{id} on '{}' (0x{}) does not resolve",
                    m.name, m.form_id
                );
                None
            }
        })
}

struct Candidate<'a> {
    m: &'a AttachmentMod,
    weapon: Option<FormId>,
    loose_item: Option<&'a LooseItem>,
}

/// Builds the base table from every attachment mod in `source`.
///
/// For each ordered pair (linked, unlinked) of distinct actor mods with the
/// same non-empty material swap and the same forced-inventory weapon, the
/// unlinked mod is mapped to the linked mod's loose item. When several linked
/// mods qualify, the last one in iteration order wins.
pub fn build_base_table<S>(source: &S) -> MappingTable
where
    S: RecordSource + ?Sized,
{
    let candidates: Vec<Candidate<'_>> = source
        .attachment_mods()
        .filter(|m| m.target_type == TargetType::Actor)
        .map(|m| Candidate {
            m,
            weapon: forced_inventory_weapon(source, m).map(|w| w.form_id),
            loose_item: source.native_loose_item(m),
        })
        .collect();

    let mut table = MappingTable::new();
    for (i, linked) in candidates.iter().enumerate() {
        if !linked.m.has_material_swap() {
            continue;
        }
        let Some(loose_item) = linked.loose_item else {
            continue;
        };

        for (j, unlinked) in candidates.iter().enumerate() {
            if i == j
                || unlinked.m.material_swap != linked.m.material_swap
                || unlinked.weapon != linked.weapon
                || unlinked.loose_item.is_some()
            {
                continue;
            }

            table.insert(unlinked.m.form_id, loose_item);
            info!(
                "Mapped '{}' (0x{}) to loose mod '{}'",
                unlinked.m.name, unlinked.m.form_id, loose_item.name
            );
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::{build_base_table, forced_inventory_weapon};
    use crate::form::FormId;
    use crate::record::{
        AttachmentMod, LooseItem, ModProperty, PropertyOp, PropertyTarget, Record, TargetType,
        Weapon,
    };
    use crate::source::GameData;

    fn actor_mod(raw: u32, swap: &str, weapon: Option<u32>, loose: Option<u32>) -> Record {
        Record::AttachmentMod(AttachmentMod {
            form_id: FormId::new(raw),
            name: format!("mod {raw:X}"),
            target_type: TargetType::Actor,
            material_swap: swap.to_string(),
            properties: weapon
                .map(|w| ModProperty {
                    target: PropertyTarget::ForcedInventory,
                    op: PropertyOp::AddForm,
                    value: Some(FormId::new(w)),
                })
                .into_iter()
                .collect(),
            loose_item: loose.map(FormId::new),
        })
    }

    fn loose(raw: u32) -> Record {
        Record::LooseItem(LooseItem {
            form_id: FormId::new(raw),
            name: format!("loose {raw:X}"),
        })
    }

    fn weapon(raw: u32) -> Record {
        Record::Weapon(Weapon {
            form_id: FormId::new(raw),
            name: format!("weapon {raw:X}"),
        })
    }

    fn data(records: Vec<Record>) -> GameData {
        GameData::new(vec!["DLCRobot.esm".to_string()], records).expect("valid test data")
    }

    #[test]
    fn unlinked_variant_inherits_loose_item() {
        let data = data(vec![
            loose(0xA0),
            weapon(0xB0),
            actor_mod(0x01, "Rust", Some(0xB0), Some(0xA0)),
            actor_mod(0x02, "Rust", Some(0xB0), None),
        ]);

        let table = build_base_table(&data);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(FormId::new(0x02)).map(|i| i.form_id),
            Some(FormId::new(0xA0))
        );
    }

    #[test]
    fn mismatched_swap_or_weapon_is_not_mapped() {
        let data = data(vec![
            loose(0xA0),
            weapon(0xB0),
            weapon(0xB1),
            actor_mod(0x01, "Rust", Some(0xB0), Some(0xA0)),
            actor_mod(0x02, "Chrome", Some(0xB0), None),
            actor_mod(0x03, "Rust", Some(0xB1), None),
            actor_mod(0x04, "Rust", None, None),
        ]);

        assert!(build_base_table(&data).is_empty());
    }

    #[test]
    fn empty_material_swap_never_links() {
        let data = data(vec![
            loose(0xA0),
            actor_mod(0x01, "", None, Some(0xA0)),
            actor_mod(0x02, "", None, None),
        ]);

        assert!(build_base_table(&data).is_empty());
    }

    #[test]
    fn non_actor_mods_are_ignored() {
        let mut weapon_mod = actor_mod(0x02, "Rust", None, None);
        if let Record::AttachmentMod(m) = &mut weapon_mod {
            m.target_type = TargetType::Weapon;
        }
        let data = data(vec![
            loose(0xA0),
            actor_mod(0x01, "Rust", None, Some(0xA0)),
            weapon_mod,
        ]);

        assert!(build_base_table(&data).is_empty());
    }

    #[test]
    fn last_linked_mod_in_iteration_order_wins() {
        let data = data(vec![
            loose(0xA0),
            loose(0xA1),
            actor_mod(0x01, "Rust", None, Some(0xA0)),
            actor_mod(0x02, "Rust", None, None),
            actor_mod(0x03, "Rust", None, Some(0xA1)),
        ]);

        let table = build_base_table(&data);
        assert_eq!(
            table.get(FormId::new(0x02)).map(|i| i.form_id),
            Some(FormId::new(0xA1))
        );
        assert!(!table.contains(FormId::new(0x01)));
        assert!(!table.contains(FormId::new(0x03)));
    }

    #[test]
    fn dangling_native_link_counts_as_unlinked() {
        let data = data(vec![
            loose(0xA0),
            actor_mod(0x01, "Rust", None, Some(0xA0)),
            actor_mod(0x02, "Rust", None, Some(0xDEAD)),
        ]);

        let table = build_base_table(&data);
        assert!(table.contains(FormId::new(0x02)));
    }

    #[test]
    fn forced_weapon_skips_non_weapon_values() {
        let mut m = AttachmentMod {
            form_id: FormId::new(0x01),
            name: String::new(),
            target_type: TargetType::Actor,
            material_swap: "Rust".to_string(),
            properties: vec![
                ModProperty {
                    target: PropertyTarget::ForcedInventory,
                    op: PropertyOp::AddForm,
                    value: Some(FormId::new(0xA0)),
                },
                ModProperty {
                    target: PropertyTarget::ForcedInventory,
                    op: PropertyOp::RemoveForm,
                    value: Some(FormId::new(0xB1)),
                },
                ModProperty {
                    target: PropertyTarget::ForcedInventory,
                    op: PropertyOp::SetForm,
                    value: Some(FormId::new(0xB0)),
                },
            ],
            loose_item: None,
        };
        let data = data(vec![loose(0xA0), weapon(0xB0), weapon(0xB1)]);

        assert_eq!(
            forced_inventory_weapon(&data, &m).map(|w| w.form_id),
            Some(FormId::new(0xB0))
        );

        m.target_type = TargetType::Armor;
        assert!(forced_inventory_weapon(&data, &m).is_none());
    }
}
