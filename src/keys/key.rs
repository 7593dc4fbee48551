// Copyright (c) 2024 Mike Tsao

use crate::{
    easing::{linear, EasingRef},
    types::{KeyUid, Value},
};
use derive_builder::Builder;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One authored sample on a param's timeline. Its value and easing may
/// change after creation; its [KeyUid] never does.
#[derive(Clone, Debug, Display)]
#[display(fmt = "{}@{}", value, time)]
pub struct Key {
    uid: KeyUid,
    time: f64,
    value: Value,
    easing: EasingRef,
}
impl Key {
    /// Creates a key with a freshly minted [KeyUid].
    pub fn new(time: f64, value: Value, easing: EasingRef) -> Self {
        Self {
            uid: KeyUid::mint(),
            time,
            value,
            easing,
        }
    }

    #[allow(missing_docs)]
    pub fn uid(&self) -> KeyUid {
        self.uid
    }

    #[allow(missing_docs)]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[allow(missing_docs)]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[allow(missing_docs)]
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// The easing applied to the segment that ends at this key.
    pub fn easing(&self) -> &EasingRef {
        &self.easing
    }

    #[allow(missing_docs)]
    pub fn set_easing(&mut self, easing: EasingRef) {
        self.easing = easing;
    }

    /// A snapshot suitable for persisting.
    pub fn get_save(&self) -> KeySave {
        KeySave {
            time: self.time,
            value: self.value.clone(),
            easing: self.easing.clone(),
        }
    }
}

/// The persisted form of a [Key].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeySave {
    #[allow(missing_docs)]
    pub time: f64,
    #[allow(missing_docs)]
    pub value: Value,
    #[allow(missing_docs)]
    #[serde(default = "linear")]
    pub easing: EasingRef,
}
impl From<KeySave> for KeyOptions {
    fn from(save: KeySave) -> Self {
        Self {
            time: save.time,
            value: Some(save.value),
            easing: Some(save.easing),
        }
    }
}

/// What to pass to [Param::add_key()](crate::params::Param::add_key()).
///
/// With no `value`, a newly created key captures whatever the param
/// currently evaluates to at `time`, so pinning a key never changes what is
/// on screen. With no `easing`, new keys are linear.
#[derive(Clone, Debug, Builder)]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct KeyOptions {
    /// Where the key goes. Must be finite.
    pub time: f64,
    /// The key's value.
    #[builder(default, setter(into, strip_option))]
    pub value: Option<Value>,
    /// The easing into the key.
    #[builder(default, setter(strip_option))]
    pub easing: Option<EasingRef>,
}
impl KeyOptionsBuilder {
    /// Builds the [KeyOptions].
    pub fn build(&self) -> Result<KeyOptions, KeyOptionsBuilderError> {
        let options = self.build_from_builder()?;
        if !options.time.is_finite() {
            return Err(KeyOptionsBuilderError::ValidationError(format!(
                "key time {} is not finite",
                options.time
            )));
        }
        Ok(options)
    }
}
impl KeyOptions {
    /// Options for a key at `time` that captures the current value.
    pub fn at(time: f64) -> Self {
        Self {
            time,
            value: None,
            easing: None,
        }
    }

    /// Options for a key at `time` with the given value.
    pub fn with_value(time: f64, value: impl Into<Value>) -> Self {
        Self {
            time,
            value: Some(value.into()),
            easing: None,
        }
    }

    /// Sets the easing.
    pub fn eased(mut self, easing: EasingRef) -> Self {
        self.easing = Some(easing);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::{EaseMode, Power};
    use std::rc::Rc;

    #[test]
    fn save_round_trip() {
        let key = Key::new(
            2.5,
            Value::from("10px 0"),
            Rc::new(Power::new(2.0, EaseMode::In)),
        );
        let json = serde_json::to_string(&key.get_save()).unwrap();
        let save: KeySave = serde_json::from_str(&json).unwrap();
        assert_eq!(save.time, 2.5);
        assert_eq!(save.value, Value::from("10px 0"));
        assert_eq!(save.easing.ratio(0.5), 0.25);
    }

    #[test]
    fn save_without_easing_is_linear() {
        let save: KeySave = serde_json::from_str(r#"{"time": 1, "value": 3}"#).unwrap();
        assert_eq!(save.easing.ratio(0.3), 0.3);
        assert_eq!(save.value, Value::Number(3.0));
    }

    #[test]
    fn keys_have_distinct_uids() {
        let a = Key::new(0.0, Value::default(), linear());
        let b = Key::new(0.0, Value::default(), linear());
        assert_ne!(a.uid(), b.uid());
    }

    #[test]
    fn builder_rejects_non_finite_times() {
        assert!(KeyOptionsBuilder::default().time(f64::NAN).build().is_err());
        assert!(KeyOptionsBuilder::default().build().is_err(), "time is required");
        let o = KeyOptionsBuilder::default()
            .time(1.0)
            .value("5px")
            .build()
            .unwrap();
        assert_eq!(o.value, Some(Value::from("5px")));
    }

    #[test]
    fn display() {
        let key = Key::new(3.0, Value::from("1em"), linear());
        assert_eq!(key.to_string(), "1em@3");
    }
}
