use std::fmt;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};

// Load index reported for plugins that are not part of the current load order.
pub const NO_LOAD_INDEX: u8 = 0xFF;

pub const LOCAL_ID_MASK: u32 = 0x00FF_FFFF;

/// Global form identifier: plugin load index in the top byte, local id in the
/// low 24 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormId(u32);

impl FormId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn from_parts(load_index: u8, local_id: u32) -> Self {
        Self((u32::from(load_index) << 24) | (local_id & LOCAL_ID_MASK))
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn load_index(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn local_id(&self) -> u32 {
        self.0 & LOCAL_ID_MASK
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl TryFrom<String> for FormId {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_hex_u32(&value).map(Self)
    }
}

impl From<FormId> for String {
    fn from(value: FormId) -> Self {
        value.to_string()
    }
}

/// Parses an unsigned 32-bit hex value, with or without a `0x` prefix.
pub fn parse_hex_u32(text: &str) -> Result<u32, ParseIntError> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormType {
    ObjectMod,
    MiscItem,
    Weapon,
    Other,
}

impl FormType {
    pub fn signature(&self) -> &'static str {
        match *self {
            Self::ObjectMod => "OMOD",
            Self::MiscItem => "MISC",
            Self::Weapon => "WEAP",
            Self::Other => "????",
        }
    }
}
