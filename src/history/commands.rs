// Copyright (c) 2024 Mike Tsao

use crate::{
    easing::EasingRef,
    error::Result,
    keys::{Key, KeyOptions},
    types::{ParamUid, Value},
};
use serde::{Deserialize, Serialize};

/// A structural edit to one param's keys, expressed as data so that the
/// history log can store, persist, and replay it without holding closures.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParamCommand {
    /// The param to edit.
    pub param: ParamUid,
    #[allow(missing_docs)]
    pub action: KeyAction,
}
impl ParamCommand {
    /// Adds (or overwrites the value of) a key.
    pub fn add(param: ParamUid, time: f64, value: Option<Value>, easing: Option<EasingRef>) -> Self {
        Self {
            param,
            action: KeyAction::Add {
                time,
                value,
                easing,
            },
        }
    }

    /// Recreates `key` exactly, easing included.
    pub fn restore(param: ParamUid, key: &Key) -> Self {
        Self::add(
            param,
            key.time(),
            Some(key.value().clone()),
            Some(key.easing().clone()),
        )
    }

    /// Removes whatever key sits at `time`.
    pub fn remove(param: ParamUid, time: f64) -> Self {
        Self {
            param,
            action: KeyAction::Remove { time },
        }
    }
}

/// The edit a [ParamCommand] performs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum KeyAction {
    /// Same semantics as [Param::add_key()](crate::params::Param::add_key()).
    Add {
        #[allow(missing_docs)]
        time: f64,
        #[allow(missing_docs)]
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[allow(missing_docs)]
        #[serde(default, skip_serializing_if = "Option::is_none")]
        easing: Option<EasingRef>,
    },
    /// Removes the key at `time`, if any.
    Remove {
        #[allow(missing_docs)]
        time: f64,
    },
}
impl KeyAction {
    pub(crate) fn key_options(&self) -> Option<KeyOptions> {
        match self {
            KeyAction::Add {
                time,
                value,
                easing,
            } => Some(KeyOptions {
                time: *time,
                value: value.clone(),
                easing: easing.clone(),
            }),
            KeyAction::Remove { .. } => None,
        }
    }
}

/// Something that can carry out [ParamCommand]s, usually by finding the
/// addressed param and calling
/// [Param::apply_command()](crate::params::Param::apply_command()).
pub trait CommandTarget {
    /// Performs `command` without recording it in any history.
    fn apply(&self, command: &ParamCommand) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::linear;

    #[test]
    fn serializes_as_plain_data() {
        let c = ParamCommand::remove(ParamUid(7), 2.0);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"param": 7, "action": {"kind": "remove", "time": 2.0}})
        );

        let c = ParamCommand::add(ParamUid(7), 1.0, Some(Value::from("3px")), None);
        let json = serde_json::to_string(&c).unwrap();
        let back: ParamCommand = serde_json::from_str(&json).unwrap();
        let options = back.action.key_options().unwrap();
        assert_eq!(options.time, 1.0);
        assert_eq!(options.value, Some(Value::from("3px")));
        assert!(options.easing.is_none());
    }

    #[test]
    fn restore_captures_easing() {
        let key = Key::new(4.0, Value::Number(1.0), linear());
        let c = ParamCommand::restore(ParamUid(1), &key);
        let options = c.action.key_options().unwrap();
        assert!(options.easing.is_some());
        assert_eq!(options.value, Some(Value::Number(1.0)));
    }
}
