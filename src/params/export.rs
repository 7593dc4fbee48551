// Copyright (c) 2024 Mike Tsao

use super::Param;
use crate::{
    easing::{describe, EasingRef},
    error::Result,
    types::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter};

/// How [Param::script_keys()] represents each key's easing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExportMode {
    /// A callable easing, for hosts that drive a runtime animation library
    /// directly.
    Runnable,
    /// A serialized description of the easing, for hosts that write the
    /// animation out as data.
    #[default]
    Descriptor,
}

/// A key's easing as exported.
#[derive(Clone, Debug)]
pub enum ScriptEase {
    #[allow(missing_docs)]
    Runnable(EasingRef),
    #[allow(missing_docs)]
    Descriptor(serde_json::Value),
}

/// The per-key options of a [ScriptKey].
#[derive(Clone, Debug)]
pub struct ScriptOptions {
    /// The easing into this key.
    pub ease: ScriptEase,
    /// The animated values, keyed by param name.
    pub values: BTreeMap<String, Value>,
}

/// One key in the form an animation runtime consumes.
#[derive(Clone, Debug)]
pub struct ScriptKey {
    #[allow(missing_docs)]
    pub time: f64,
    #[allow(missing_docs)]
    pub options: ScriptOptions,
}
impl ScriptKey {
    /// Renders the key as JSON. Runnable easings are described, since code
    /// can't be written out.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let ease = match &self.options.ease {
            ScriptEase::Runnable(easing) => describe(easing.as_ref())?,
            ScriptEase::Descriptor(descriptor) => descriptor.clone(),
        };
        let values = serde_json::to_value(&self.options.values)?;
        Ok(serde_json::json!({
            "time": self.time,
            "options": {
                "ease": ease,
                "values": values,
            }
        }))
    }
}

/// The exported keys of one param.
#[derive(Clone, Debug)]
pub struct ParamScript {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub keys: Vec<ScriptKey>,
}

/// Serialized form of a whole export.
#[derive(Debug, Serialize, Deserialize)]
struct ParamScriptJson {
    name: String,
    keys: Vec<serde_json::Value>,
}
impl ParamScript {
    /// Renders the param's keys as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let keys = self
            .keys
            .iter()
            .map(|k| k.to_json())
            .collect::<Result<Vec<_>>>()?;
        Ok(serde_json::to_value(ParamScriptJson {
            name: self.name.clone(),
            keys,
        })?)
    }
}

impl Param {
    /// Exports the keys in ascending time order, each carrying this param's
    /// value under its name.
    pub fn script_keys(&self, mode: ExportMode) -> Result<Vec<ScriptKey>> {
        let name = self.name();
        let mut keys = self.keys();
        keys.sort_by(|a, b| a.time().total_cmp(&b.time()));
        keys.into_iter()
            .map(|key| -> Result<ScriptKey> {
                let ease = match mode {
                    ExportMode::Runnable => ScriptEase::Runnable(key.easing().clone()),
                    ExportMode::Descriptor => {
                        ScriptEase::Descriptor(describe(key.easing().as_ref())?)
                    }
                };
                Ok(ScriptKey {
                    time: key.time(),
                    options: ScriptOptions {
                        ease,
                        values: BTreeMap::from([(name.clone(), key.value().clone())]),
                    },
                })
            })
            .collect()
    }

    /// [Param::script_keys()] with the param's name attached.
    pub fn export(&self, mode: ExportMode) -> Result<ParamScript> {
        Ok(ParamScript {
            name: self.name(),
            keys: self.script_keys(mode)?,
        })
    }
}
