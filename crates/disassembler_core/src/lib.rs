//! Maps Automatron robot attachment mods to the loose items they break down
//! into.
//!
//! The host hands over its records through [`source::RecordSource`]. When the
//! data is ready, [`core_api::Engine::on_data_ready`] derives mappings for
//! unlinked colour variants, applies the user override files and freezes the
//! result into a [`lookup::LookupService`].

pub mod core_api;
pub mod form;
pub mod lookup;
pub mod matcher;
pub mod overrides;
pub mod record;
pub mod script_api;
pub mod source;
pub mod table;
