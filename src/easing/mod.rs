// Copyright (c) 2024 Mike Tsao

//! Easing functions remap linear progress between two keys into eased
//! progress. Each key carries one; it applies to the segment that ends at
//! that key.
//!
//! Easings are trait objects so that hosts can supply their own. They
//! serialize through `typetag`, which lets a key's easing travel inside
//! save data and script exports without the engine knowing its concrete
//! type.

use core::fmt::Debug;
use std::rc::Rc;

/// The most commonly used imports.
pub mod prelude {
    pub use super::{linear, EaseMode, Easing, EasingRef};
}

pub use curves::{CubicBezier, EaseMode, Linear, Power, Sine, Steps};

mod curves;

/// Maps a normalized progress ratio to an eased ratio.
#[typetag::serde]
pub trait Easing: Debug {
    /// `progress` is in 0.0..=1.0. The result should be 0.0 at 0.0 and 1.0
    /// at 1.0; in between, anything goes.
    fn ratio(&self, progress: f64) -> f64;
}

/// A shared handle to an easing. Keys that were created from the same
/// options share the same easing.
pub type EasingRef = Rc<dyn Easing>;

/// The default easing.
pub fn linear() -> EasingRef {
    Rc::new(Linear)
}

/// Returns a serializable description of `easing`.
pub fn describe(easing: &dyn Easing) -> crate::error::Result<serde_json::Value> {
    Ok(serde_json::to_value(easing)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_ref_round_trips_through_json() {
        let easing: EasingRef = Rc::new(Power::new(3.0, EaseMode::Out));
        let json = serde_json::to_string(&easing).unwrap();
        let back: EasingRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ratio(0.5), easing.ratio(0.5));
    }

    #[test]
    fn describe_linear() {
        let d = describe(linear().as_ref()).unwrap();
        assert_eq!(d, serde_json::json!({"linear": null}));
    }
}
