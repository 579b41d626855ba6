use serde::{Deserialize, Serialize};

use crate::form::{FormId, FormType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Weapon,
    Armor,
    Actor,
    Furniture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyTarget {
    ForcedInventory,
    Keywords,
    Race,
    Skin,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOp {
    Set,
    MulAdd,
    Add,
    Remove,
    SetForm,
    AddForm,
    RemoveForm,
}

impl PropertyOp {
    pub fn grants_form(&self) -> bool {
        matches!(self, Self::SetForm | Self::AddForm)
    }
}

/// One entry of an attachment mod's effect list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModProperty {
    pub target: PropertyTarget,
    pub op: PropertyOp,
    #[serde(default)]
    pub value: Option<FormId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMod {
    pub form_id: FormId,
    #[serde(default)]
    pub name: String,
    pub target_type: TargetType,
    /// Material swap name; empty when the mod applies no swap.
    #[serde(default)]
    pub material_swap: String,
    #[serde(default)]
    pub properties: Vec<ModProperty>,
    /// Loose item the host already associates with this mod, if any.
    #[serde(default)]
    pub loose_item: Option<FormId>,
}

impl AttachmentMod {
    pub fn has_material_swap(&self) -> bool {
        !self.material_swap.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooseItem {
    pub form_id: FormId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub form_id: FormId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    AttachmentMod(AttachmentMod),
    LooseItem(LooseItem),
    Weapon(Weapon),
    Other {
        form_id: FormId,
        #[serde(default)]
        name: String,
    },
}

impl Record {
    pub fn form_id(&self) -> FormId {
        match self {
            Self::AttachmentMod(m) => m.form_id,
            Self::LooseItem(i) => i.form_id,
            Self::Weapon(w) => w.form_id,
            Self::Other { form_id, .. } => *form_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::AttachmentMod(m) => &m.name,
            Self::LooseItem(i) => &i.name,
            Self::Weapon(w) => &w.name,
            Self::Other { name, .. } => name,
        }
    }

    pub fn form_type(&self) -> FormType {
        match self {
            Self::AttachmentMod(_) => FormType::ObjectMod,
            Self::LooseItem(_) => FormType::MiscItem,
            Self::Weapon(_) => FormType::Weapon,
            Self::Other { .. } => FormType::Other,
        }
    }

    pub fn as_attachment_mod(&self) -> Option<&AttachmentMod> {
        match self {
            Self::AttachmentMod(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_loose_item(&self) -> Option<&LooseItem> {
        match self {
            Self::LooseItem(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match self {
            Self::Weapon(w) => Some(w),
            _ => None,
        }
    }
}
