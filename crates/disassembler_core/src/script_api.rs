//! Native functions exposed to the host's scripting language.
//!
//! Calls and results cross the boundary as JSON: form references are hex
//! strings, `null` is a none reference.

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::form::FormId;
use crate::lookup::LookupService;
use crate::record::LooseItem;

pub const SCRIPT_CLASS: &str = "AutomatronDisassembler";
pub const GET_ROBOT_LOOSE_MOD: &str = "GetRobotLooseMod";
pub const GET_ROBOT_LOOSE_MODS: &str = "GetRobotLooseMods";

/// Names under which the natives are registered, as `(class, function)`.
pub fn registered_functions() -> [(&'static str, &'static str); 2] {
    [
        (SCRIPT_CLASS, GET_ROBOT_LOOSE_MOD),
        (SCRIPT_CLASS, GET_ROBOT_LOOSE_MODS),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function")]
pub enum ScriptCall {
    #[serde(rename = "GetRobotLooseMod")]
    GetRobotLooseMod {
        #[serde(rename = "mod", default)]
        mod_id: Option<FormId>,
        #[serde(default)]
        attach_index: i32,
    },
    #[serde(rename = "GetRobotLooseMods")]
    GetRobotLooseMods {
        /// `None` models a none array, which yields an empty result.
        #[serde(default)]
        mods: Option<Vec<Option<FormId>>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptForm {
    pub form_id: FormId,
    pub name: String,
}

impl From<&LooseItem> for ScriptForm {
    fn from(item: &LooseItem) -> Self {
        Self {
            form_id: item.form_id,
            name: item.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScriptValue {
    Form(Option<ScriptForm>),
    Array(Vec<ScriptForm>),
}

impl ScriptCall {
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(|e| {
            CoreError::new(
                CoreErrorCode::InvalidQuery,
                format!("invalid {SCRIPT_CLASS} call: {e}"),
            )
        })
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::GetRobotLooseMod { .. } => GET_ROBOT_LOOSE_MOD,
            Self::GetRobotLooseMods { .. } => GET_ROBOT_LOOSE_MODS,
        }
    }

    pub fn dispatch(&self, service: &LookupService) -> ScriptValue {
        match self {
            Self::GetRobotLooseMod {
                mod_id,
                attach_index,
            } => ScriptValue::Form(service.resolve(*mod_id, *attach_index).map(ScriptForm::from)),
            Self::GetRobotLooseMods { mods } => ScriptValue::Array(
                mods.as_deref()
                    .map(|mods| {
                        service
                            .resolve_all(mods)
                            .into_iter()
                            .map(ScriptForm::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
        }
    }
}
