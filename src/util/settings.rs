// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::{error::Result, types::Value};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Settings for the whole engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineSettings {
    #[allow(missing_docs)]
    pub param: ParamSettings,
    #[allow(missing_docs)]
    pub history: HistorySettings,
}
impl EngineSettings {
    /// Reads settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes settings as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Defaults applied to newly created params.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParamSettings {
    /// How tall a visible param's row is in the host view.
    #[derivative(Default(value = "21.0"))]
    pub line_height: f64,

    /// The value of a param that has no keys, unless the param says
    /// otherwise.
    pub default_value: Value,
}

/// Undo log settings.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct HistorySettings {
    /// The number of undo steps kept. Older steps are dropped.
    #[derivative(Default(value = "1000"))]
    pub max_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = EngineSettings::default();
        assert_eq!(s.param.line_height, 21.0);
        assert_eq!(s.param.default_value, Value::Number(0.0));
        assert_eq!(s.history.max_depth, 1000);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let s = EngineSettings::from_json(r#"{"history": {"max-depth": 5}}"#).unwrap();
        assert_eq!(s.history.max_depth, 5);
        assert_eq!(s.param, ParamSettings::default());

        let s = EngineSettings::from_json(r#"{"param": {"default-value": "0px"}}"#).unwrap();
        assert_eq!(s.param.default_value, Value::from("0px"));
        assert_eq!(s.param.line_height, 21.0);
    }

    #[test]
    fn json_round_trip() {
        let mut s = EngineSettings::default();
        s.param.line_height = 30.0;
        let json = s.to_json().unwrap();
        assert_eq!(EngineSettings::from_json(&json).unwrap(), s);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(EngineSettings::from_json("{").is_err());
    }
}
