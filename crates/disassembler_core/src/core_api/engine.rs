use tracing::{info, warn};

use crate::lookup::LookupService;
use crate::matcher;
use crate::overrides;
use crate::source::RecordSource;
use crate::table::{AttachIndex, TableSet};

use super::types::{EngineConfig, LoadReport, TableSizes};

pub const PLUGIN_NAME: &str = "Automatron Disassembler";
pub const PLUGIN_VERSION: u32 = 1;

#[derive(Debug, Default, Clone)]
pub struct Engine {
    config: EngineConfig,
}

/// Result of the data-ready pass: the frozen lookup service plus a report.
#[derive(Debug, Clone)]
pub struct Session {
    service: LookupService,
    report: LoadReport,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs once the host reports its data as ready.
    ///
    /// Without the required plugin nothing is built and every later lookup
    /// returns `None`.
    pub fn on_data_ready<S>(&self, source: &S) -> Session
    where
        S: RecordSource + ?Sized,
    {
        let mut report = LoadReport {
            required_plugin: self.config.required_plugin.clone(),
            ..LoadReport::default()
        };

        if !source.is_plugin_loaded(&self.config.required_plugin) {
            warn!("Automatron not loaded! ({} is missing)", self.config.required_plugin);
            return Session {
                service: LookupService::empty(),
                report,
            };
        }
        report.required_plugin_loaded = true;
        report.attachment_mods = source.attachment_mods().count();

        let mut tables = TableSet {
            default: matcher::build_base_table(source),
            ..TableSet::default()
        };
        report.matched = tables.default.len();

        let [default, index1, index2] =
            overrides::load_all_overrides(&self.config.overrides, source, &mut tables);
        report.overrides_applied = TableSizes {
            default,
            index1,
            index2,
        };
        report.table_sizes = TableSizes {
            default: tables.get(AttachIndex::Default).len(),
            index1: tables.get(AttachIndex::Index1).len(),
            index2: tables.get(AttachIndex::Index2).len(),
        };

        info!(
            "{PLUGIN_NAME} ready: {} matched, tables default={} index1={} index2={}",
            report.matched,
            report.table_sizes.default,
            report.table_sizes.index1,
            report.table_sizes.index2
        );

        Session {
            service: LookupService::freeze(source, tables),
            report,
        }
    }
}

impl Session {
    pub fn service(&self) -> &LookupService {
        &self.service
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn into_service(self) -> LookupService {
        self.service
    }
}
