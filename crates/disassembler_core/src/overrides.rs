//! User-edited override files.
//!
//! Each non-comment line maps one attachment mod to one loose item:
//!
//! ```text
//! ; comment
//! DLCRobot.esm|0100A1|DLCRobot.esm|00F2C3
//! ```
//!
//! Ids are hex local ids within the named plugin. Lines that do not parse or
//! do not resolve are skipped; the rest of the file still loads.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::form::{FormId, FormType, LOCAL_ID_MASK, NO_LOAD_INDEX, parse_hex_u32};
use crate::record::{AttachmentMod, LooseItem};
use crate::source::RecordSource;
use crate::table::{AttachIndex, MappingTable, TableSet};

pub const DEFAULT_PLUGIN_DIR: &str = "Data/F4SE/Plugins";
pub const DEFAULT_MAP_FILE: &str = "AutomatronDisassembler_ModMap.txt";
pub const INDEX1_MAP_FILE: &str = "AutomatronDisassembler_ModMapIndex1.txt";
pub const INDEX2_MAP_FILE: &str = "AutomatronDisassembler_ModMapIndex2.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverridePaths {
    pub default: PathBuf,
    pub index1: PathBuf,
    pub index2: PathBuf,
}

impl OverridePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            default: dir.join(DEFAULT_MAP_FILE),
            index1: dir.join(INDEX1_MAP_FILE),
            index2: dir.join(INDEX2_MAP_FILE),
        }
    }

    /// Joins every relative path onto `base`.
    pub fn rebased(&self, base: &Path) -> Self {
        let rebase = |path: &PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path.clone()
            }
        };
        Self {
            default: rebase(&self.default),
            index1: rebase(&self.index1),
            index2: rebase(&self.index2),
        }
    }

    pub fn get(&self, index: AttachIndex) -> &Path {
        match index {
            AttachIndex::Default => &self.default,
            AttachIndex::Index1 => &self.index1,
            AttachIndex::Index2 => &self.index2,
        }
    }
}

impl Default for OverridePaths {
    fn default() -> Self {
        Self::in_dir(Path::new(DEFAULT_PLUGIN_DIR))
    }
}

/// One parsed, not yet resolved, override line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideLine {
    pub mod_plugin: String,
    pub mod_local_id: u32,
    pub item_plugin: String,
    pub item_local_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideLineError {
    MissingField(&'static str),
    BadHex { field: &'static str, value: String },
    PluginNotLoaded(String),
    Unresolved(FormId),
    WrongKind {
        form_id: FormId,
        expected: FormType,
        found: FormType,
    },
}

impl fmt::Display for OverrideLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing {field}"),
            Self::BadHex { field, value } => write!(f, "{field} '{value}' is not a hex id"),
            Self::PluginNotLoaded(plugin) => write!(f, "plugin '{plugin}' is not loaded"),
            Self::Unresolved(form_id) => write!(f, "form 0x{form_id} does not exist"),
            Self::WrongKind {
                form_id,
                expected,
                found,
            } => write!(
                f,
                "form 0x{form_id} is {} but {} was expected",
                found.signature(),
                expected.signature()
            ),
        }
    }
}

/// Parses one line. Blank lines and `;` comments yield `Ok(None)`.
pub fn parse_override_line(line: &str) -> Result<Option<OverrideLine>, OverrideLineError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.trim_start().starts_with(';') {
        return Ok(None);
    }

    let mut fields = line.splitn(4, '|');
    let mod_plugin = next_field(&mut fields, "mod plugin")?;
    let mod_local_id = hex_field(next_field(&mut fields, "mod id")?, "mod id")?;
    let item_plugin = next_field(&mut fields, "item plugin")?;
    // Anything after the last id, such as a trailing comment, is ignored.
    let item_id = next_field(&mut fields, "item id")?
        .split(|c: char| c.is_whitespace() || c == ';' || c == '|')
        .next()
        .unwrap_or("");
    let item_local_id = hex_field(item_id, "item id")?;

    Ok(Some(OverrideLine {
        mod_plugin: mod_plugin.to_string(),
        mod_local_id,
        item_plugin: item_plugin.to_string(),
        item_local_id,
    }))
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<&'a str, OverrideLineError> {
    fields
        .next()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .ok_or(OverrideLineError::MissingField(name))
}

fn hex_field(value: &str, field: &'static str) -> Result<u32, OverrideLineError> {
    parse_hex_u32(value).map_err(|_| OverrideLineError::BadHex {
        field,
        value: value.to_string(),
    })
}

fn resolve_form_id<S>(source: &S, plugin: &str, local_id: u32) -> Result<FormId, OverrideLineError>
where
    S: RecordSource + ?Sized,
{
    let load_index = source.load_index(plugin);
    if load_index == NO_LOAD_INDEX {
        return Err(OverrideLineError::PluginNotLoaded(plugin.to_string()));
    }
    Ok(FormId::from_parts(load_index, local_id))
}

/// Resolves both sides of `line` against `source`.
pub fn resolve_override<'a, S>(
    source: &'a S,
    line: &OverrideLine,
) -> Result<(&'a AttachmentMod, &'a LooseItem), OverrideLineError>
where
    S: RecordSource + ?Sized,
{
    let mod_id = resolve_form_id(source, &line.mod_plugin, line.mod_local_id)?;
    let mod_record = source
        .lookup(mod_id)
        .ok_or(OverrideLineError::Unresolved(mod_id))?;
    let m = mod_record
        .as_attachment_mod()
        .ok_or(OverrideLineError::WrongKind {
            form_id: mod_id,
            expected: FormType::ObjectMod,
            found: mod_record.form_type(),
        })?;

    let item_id = resolve_form_id(source, &line.item_plugin, line.item_local_id)?;
    let item_record = source
        .lookup(item_id)
        .ok_or(OverrideLineError::Unresolved(item_id))?;
    let item = item_record
        .as_loose_item()
        .ok_or(OverrideLineError::WrongKind {
            form_id: item_id,
            expected: FormType::MiscItem,
            found: item_record.form_type(),
        })?;

    Ok((m, item))
}

/// Applies every valid line of `reader` to `table`. Returns the number of
/// entries written.
pub fn load_overrides<R, S>(reader: R, source: &S, table: &mut MappingTable) -> usize
where
    R: BufRead,
    S: RecordSource + ?Sized,
{
    let mut applied = 0;
    for (index, raw) in reader.split(b'\n').enumerate() {
        let line_no = index + 1;
        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                warn!("stopped reading mod map at line {line_no}: {e}");
                break;
            }
        };
        let text = String::from_utf8_lossy(&raw);
        let mut line: &str = &text;
        if line_no == 1 {
            line = line.strip_prefix('\u{FEFF}').unwrap_or(line);
        }

        let parsed = match parse_override_line(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                warn!("skipping mod map line {line_no}: {e}");
                continue;
            }
        };

        let (m, item) = match resolve_override(source, &parsed) {
            Ok(pair) => pair,
            Err(e) => {
                warn!("skipping mod map line {line_no}: {e}");
                continue;
            }
        };

        table.insert(m.form_id, item);
        applied += 1;
        info!(
            "(External) Mapped '{}' ({}|0x{:06X}, 0x{}) to loose mod '{}' ({}|0x{:06X})",
            m.name,
            parsed.mod_plugin,
            parsed.mod_local_id & LOCAL_ID_MASK,
            m.form_id,
            item.name,
            parsed.item_plugin,
            parsed.item_local_id & LOCAL_ID_MASK,
        );
    }
    applied
}

/// Loads one override file. A missing or unreadable file contributes nothing.
pub fn load_override_file<S>(path: &Path, source: &S, table: &mut MappingTable) -> usize
where
    S: RecordSource + ?Sized,
{
    match File::open(path) {
        Ok(file) => load_overrides(BufReader::new(file), source, table),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Failed to load external mod map '{}'", path.display());
            0
        }
        Err(e) => {
            warn!("Failed to load external mod map '{}': {e}", path.display());
            0
        }
    }
}

/// Loads all three override files into their tables, default first.
pub fn load_all_overrides<S>(paths: &OverridePaths, source: &S, tables: &mut TableSet) -> [usize; 3]
where
    S: RecordSource + ?Sized,
{
    AttachIndex::ALL.map(|index| load_override_file(paths.get(index), source, tables.get_mut(index)))
}
