//! Easing curves for tweens
//!
//! A tween's easing curve maps the time elapsed in the current leg to a
//! normalized progress value. Built-in curves are evaluated against the
//! tween's *current* duration, so changing the duration mid-flight re-times
//! them. Custom curves receive elapsed seconds directly.

use crate::error::ParseError;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Built-in easing functions
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    #[default]
    Linear,
    /// Flat tangents at both ends (smoothstep)
    EaseInOut,
    EaseIn,
    EaseOut,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }

    /// Resolve an easing by name, falling back to [`Easing::Linear`]
    ///
    /// Unknown names are logged and never fail.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: ParseError| {
            tracing::warn!("{err}, falling back to linear easing");
            Easing::Linear
        })
    }
}

impl FromStr for Easing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "linear" => Ok(Easing::Linear),
            "easeinout" => Ok(Easing::EaseInOut),
            "easein" => Ok(Easing::EaseIn),
            "easeout" => Ok(Easing::EaseOut),
            _ => Err(ParseError::UnknownEasing(s.to_string())),
        }
    }
}

/// The curve a tween uses to turn elapsed time into progress
#[derive(Clone)]
pub enum EasingCurve {
    /// A built-in easing stretched over the tween's duration
    Builtin(Easing),
    /// A user curve from elapsed seconds to progress
    Custom(Rc<dyn Fn(f32) -> f32>),
}

impl EasingCurve {
    /// Evaluate the curve, clamped to `[0, 1]`
    pub fn progress(&self, elapsed: f32, duration: f32) -> f32 {
        let raw = match self {
            EasingCurve::Builtin(easing) => {
                if duration <= 0.0 {
                    return 1.0;
                }
                easing.apply((elapsed / duration).clamp(0.0, 1.0))
            }
            EasingCurve::Custom(curve) => curve(elapsed),
        };
        if raw.is_nan() {
            return 1.0;
        }
        raw.clamp(0.0, 1.0)
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        EasingCurve::Builtin(Easing::Linear)
    }
}

impl From<Easing> for EasingCurve {
    fn from(easing: Easing) -> Self {
        EasingCurve::Builtin(easing)
    }
}

impl fmt::Debug for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingCurve::Builtin(easing) => f.debug_tuple("Builtin").field(easing).finish(),
            EasingCurve::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// CSS-style cubic bezier timing function.
///
/// Newton-Raphson on the x polynomial, bisection when the slope flattens out.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t as f64;
    let (x1, y1, x2, y2) = (x1 as f64, y1 as f64, x2 as f64, y2 as f64);

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    p = x;
    for _ in 0..20 {
        let sample = bezier_sample(p, x1, x2);
        if (sample - x).abs() < 1e-7 {
            break;
        }
        if sample < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
