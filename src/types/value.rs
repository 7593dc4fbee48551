// Copyright (c) 2024 Mike Tsao

//! The values a param can take on, and how to blend between two of them.

use core::{
    convert::Infallible,
    fmt::{self, Display},
    str::FromStr,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static DIMENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)([A-Za-z%]+)$")
        .expect("dimension pattern is valid")
});

/// A param value. Strings are classified once, when they are parsed, rather
/// than each time the value takes part in an interpolation.
///
/// | Input            | Variant                          |
/// |------------------|----------------------------------|
/// | `12`, `"12"`     | [Value::Number]                  |
/// | `"10px"`, `"5%"` | [Value::Dimension]               |
/// | `"10px 5px 0"`   | [Value::Compound]                |
/// | `"solid"`        | [Value::Text]                    |
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A bare number.
    Number(f64),
    /// A number with a unit suffix, such as `px`, `em`, `deg`, or `%`.
    Dimension {
        /// The numeric part.
        amount: f64,
        /// The unit suffix, exactly as written.
        unit: String,
    },
    /// Two or more whitespace-separated tokens, like the components of a
    /// margin or a transform.
    Compound(Vec<Value>),
    /// Anything else, including deferred `calc()` expressions.
    Text(String),
}
impl Default for Value {
    fn default() -> Self {
        Self::Number(0.0)
    }
}
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Dimension { amount, unit } => write!(f, "{amount}{unit}"),
            Value::Compound(tokens) => {
                for (i, token) in tokens.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{token}")?;
                }
                Ok(())
            }
            Value::Text(s) => f.write_str(s),
        }
    }
}
impl FromStr for Value {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = Self::split_tokens(s);
        Ok(match tokens.len() {
            0 => Value::Text(String::default()),
            1 => Self::parse_token(tokens[0]),
            _ => Value::Compound(tokens.into_iter().map(Self::parse_token).collect()),
        })
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(v) => v,
            Err(e) => match e {},
        }
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            _ => serializer.collect_str(self),
        }
    }
}
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Value::Number(n),
            Raw::Text(s) => Value::from(s.as_str()),
        })
    }
}
impl Value {
    /// Splits on whitespace outside parentheses, so `calc(1px + 2%)` stays
    /// one token. Unbalanced input falls back to a plain whitespace split.
    fn split_tokens(s: &str) -> Vec<&str> {
        let mut tokens = Vec::default();
        let mut depth = 0usize;
        let mut start = None;
        for (i, c) in s.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    None => return s.split_whitespace().collect(),
                },
                _ => {}
            }
            if c.is_whitespace() && depth == 0 {
                if let Some(begin) = start.take() {
                    tokens.push(&s[begin..i]);
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if depth != 0 {
            return s.split_whitespace().collect();
        }
        if let Some(begin) = start {
            tokens.push(&s[begin..]);
        }
        tokens
    }

    fn parse_token(token: &str) -> Value {
        if let Ok(n) = token.parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }
        if let Some(captures) = DIMENSION.captures(token) {
            if let Ok(amount) = captures[1].parse::<f64>() {
                return Value::Dimension {
                    amount,
                    unit: captures[2].to_string(),
                };
            }
        }
        Value::Text(token.to_string())
    }

    /// Returns the number if this is a [Value::Number].
    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// The unit suffix, or the empty string for bare numbers. [None] for
    /// values that have no single trailing unit.
    pub fn unit(&self) -> Option<&str> {
        match self {
            Value::Number(_) => Some(""),
            Value::Dimension { unit, .. } => Some(unit),
            _ => None,
        }
    }

    /// The whitespace-separated components. A non-compound value is its own
    /// single token.
    pub fn tokens(&self) -> Vec<Value> {
        if let Value::Compound(tokens) = self {
            tokens.clone()
        } else {
            vec![self.clone()]
        }
    }
}

/// Blends `earlier` toward `later` by `ratio`, which has already been passed
/// through the later key's easing.
///
/// Numbers and matching units blend numerically. Mismatched units are never
/// coerced; the result is a `calc()` expression for a downstream evaluator.
/// Compound values blend token by token after the shorter list is padded
/// with the longer list's trailing tokens.
pub fn interpolate(later: &Value, earlier: &Value, ratio: f64) -> Value {
    match (later, earlier) {
        (Value::Compound(_), _) | (_, Value::Compound(_)) => {
            let mut laters = later.tokens();
            let mut earliers = earlier.tokens();
            if laters.len() < earliers.len() {
                laters.extend_from_slice(&earliers[laters.len()..]);
            } else if earliers.len() < laters.len() {
                earliers.extend_from_slice(&laters[earliers.len()..]);
            }
            Value::Compound(
                laters
                    .iter()
                    .zip(earliers.iter())
                    .map(|(l, e)| interpolate_token(l, e, ratio))
                    .collect(),
            )
        }
        _ => interpolate_token(later, earlier, ratio),
    }
}

fn interpolate_token(later: &Value, earlier: &Value, ratio: f64) -> Value {
    match (later, earlier) {
        (Value::Number(l), Value::Number(e)) => Value::Number(e + (l - e) * ratio),
        (
            Value::Dimension {
                amount: l,
                unit: later_unit,
            },
            Value::Dimension {
                amount: e,
                unit: earlier_unit,
            },
        ) if later_unit == earlier_unit => Value::Dimension {
            amount: e + (l - e) * ratio,
            unit: later_unit.clone(),
        },
        (Value::Text(l), Value::Text(e)) if l == e => earlier.clone(),
        _ => Value::Text(format!(
            "calc({earlier} + ({later} - {earlier})*{ratio})"
        )),
    }
}
