mod engine;
mod error;
mod types;

pub use engine::{Engine, PLUGIN_NAME, PLUGIN_VERSION, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{EngineConfig, LoadReport, REQUIRED_PLUGIN, TableSizes};
