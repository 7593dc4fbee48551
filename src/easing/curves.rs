// Copyright (c) 2024 Mike Tsao

use super::Easing;
use core::f64::consts::PI;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Which end of the segment an easing shapes.
#[derive(Clone, Copy, Debug, Default, Display, EnumIter, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EaseMode {
    /// Starts slow.
    #[default]
    In,
    /// Ends slow.
    Out,
    /// Starts and ends slow.
    InOut,
}
impl EaseMode {
    /// Builds the Out and InOut shapes from an In curve.
    fn apply(&self, ease_in: impl Fn(f64) -> f64, p: f64) -> f64 {
        match self {
            EaseMode::In => ease_in(p),
            EaseMode::Out => 1.0 - ease_in(1.0 - p),
            EaseMode::InOut => {
                if p < 0.5 {
                    ease_in(p * 2.0) / 2.0
                } else {
                    1.0 - ease_in((1.0 - p) * 2.0) / 2.0
                }
            }
        }
    }
}

/// Progress passes through unchanged.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Linear;
#[typetag::serde(name = "linear")]
impl Easing for Linear {
    fn ratio(&self, progress: f64) -> f64 {
        progress.clamp(0.0, 1.0)
    }
}

/// `p^exponent`. An exponent of 2 is quadratic, 3 is cubic, and so on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Power {
    exponent: f64,
    mode: EaseMode,
}
impl Power {
    #[allow(missing_docs)]
    pub fn new(exponent: f64, mode: EaseMode) -> Self {
        Self { exponent, mode }
    }
}
#[typetag::serde(name = "power")]
impl Easing for Power {
    fn ratio(&self, progress: f64) -> f64 {
        self.mode
            .apply(|p| p.powf(self.exponent), progress.clamp(0.0, 1.0))
    }
}

/// A quarter sine wave.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Sine {
    mode: EaseMode,
}
impl Sine {
    #[allow(missing_docs)]
    pub fn new(mode: EaseMode) -> Self {
        Self { mode }
    }
}
#[typetag::serde(name = "sine")]
impl Easing for Sine {
    fn ratio(&self, progress: f64) -> f64 {
        self.mode.apply(
            |p| 1.0 - (p * PI / 2.0).cos(),
            progress.clamp(0.0, 1.0),
        )
    }
}

/// Jumps in `count` equal steps, holding each level until the next.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Steps {
    count: u32,
}
impl Steps {
    /// A zero count is treated as one step.
    pub fn new(count: u32) -> Self {
        Self {
            count: count.max(1),
        }
    }
}
#[typetag::serde(name = "steps")]
impl Easing for Steps {
    fn ratio(&self, progress: f64) -> f64 {
        let count = self.count.max(1) as f64;
        ((progress.clamp(0.0, 1.0) * count).floor() / count).min(1.0)
    }
}

/// The CSS `cubic-bezier(x1, y1, x2, y2)` timing function.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}
impl CubicBezier {
    const NEWTON_ITERATIONS: usize = 8;
    const BISECTION_ITERATIONS: usize = 32;
    const EPSILON: f64 = 1e-7;

    /// The x coordinates are clamped to 0.0..=1.0 so that the curve stays a
    /// function of time.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// CSS `ease`.
    pub fn ease() -> Self {
        Self::new(0.25, 0.1, 0.25, 1.0)
    }

    fn coordinate(t: f64, p1: f64, p2: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    }

    fn slope(t: f64, p1: f64, p2: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    }

    /// Finds the curve parameter whose x coordinate is `x`.
    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let error = Self::coordinate(t, self.x1, self.x2) - x;
            if error.abs() < Self::EPSILON {
                return t;
            }
            let slope = Self::slope(t, self.x1, self.x2);
            if slope.abs() < Self::EPSILON {
                break;
            }
            t -= error / slope;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        for _ in 0..Self::BISECTION_ITERATIONS {
            let value = Self::coordinate(t, self.x1, self.x2);
            if (value - x).abs() < Self::EPSILON {
                break;
            }
            if value < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        t
    }
}
#[typetag::serde(name = "cubic-bezier")]
impl Easing for CubicBezier {
    fn ratio(&self, progress: f64) -> f64 {
        let x = progress.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        Self::coordinate(self.solve_t(x), self.y1, self.y2)
    }
}
