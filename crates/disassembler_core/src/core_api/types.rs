use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::overrides::OverridePaths;
use crate::table::AttachIndex;

use super::error::{CoreError, CoreErrorCode};

/// Plugin that ships the robot attachment mods.
pub const REQUIRED_PLUGIN: &str = "DLCRobot.esm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub required_plugin: String,
    pub overrides: OverridePaths,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            required_plugin: REQUIRED_PLUGIN.to_string(),
            overrides: OverridePaths::default(),
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config. Relative override paths are taken relative to
    /// the config file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        let mut config: Self = serde_json::from_str(&text).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("invalid config {}: {e}", path.display()),
            )
        })?;
        if let Some(base) = path.parent() {
            config.overrides = config.overrides.rebased(base);
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSizes {
    pub default: usize,
    pub index1: usize,
    pub index2: usize,
}

impl TableSizes {
    pub fn get(&self, index: AttachIndex) -> usize {
        match index {
            AttachIndex::Default => self.default,
            AttachIndex::Index1 => self.index1,
            AttachIndex::Index2 => self.index2,
        }
    }
}

/// What the data-ready pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadReport {
    pub required_plugin: String,
    pub required_plugin_loaded: bool,
    pub attachment_mods: usize,
    pub matched: usize,
    pub overrides_applied: TableSizes,
    pub table_sizes: TableSizes,
}
