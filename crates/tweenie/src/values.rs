//! Tweenable value types
//!
//! [`Interpolate`] is the default interpolator used by
//! [`Tweenie::tween`](crate::Tweenie::tween). Any other `(from, to, t)`
//! function can be passed to [`Tweenie::to`](crate::Tweenie::to) instead.

use glam::{Quat, Vec2, Vec3, Vec4};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t as f64
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon as f64
    }
}

macro_rules! impl_glam_vector {
    ($($ty:ty),*) => {
        $(
            impl Interpolate for $ty {
                fn lerp(&self, other: &Self, t: f32) -> Self {
                    <$ty>::lerp(*self, *other, t)
                }

                fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
                    self.abs_diff_eq(*other, epsilon)
                }
            }
        )*
    };
}

impl_glam_vector!(Vec2, Vec3, Vec4);

/// Normalized lerp along the shortest arc
impl Interpolate for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Quat::lerp(*self, *other, t)
    }

    /// `q` and `-q` encode the same rotation
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.abs_diff_eq(*other, epsilon) || self.abs_diff_eq(-*other, epsilon)
    }
}

/// Linear RGBA color with components in `[0, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
        assert!((2.0_f64.lerp(&4.0, 0.5) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_vec3_interpolation() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 20.0, 30.0);
        let mid = Interpolate::lerp(&a, &b, 0.5);
        assert!(mid.approx_eq(&Vec3::new(5.0, 10.0, 15.0), 1e-6));
    }

    #[test]
    fn test_quat_interpolation_stays_normalized() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_y(std::f32::consts::PI);
        let mid = Interpolate::lerp(&a, &b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-5);
        assert!(Interpolate::lerp(&a, &b, 1.0).approx_eq(&b, 1e-5));
    }

    #[test]
    fn test_quat_approx_eq_ignores_sign() {
        let q = Quat::from_rotation_x(0.7);
        assert!(q.approx_eq(&-q, 1e-6));
        assert!(!q.approx_eq(&Quat::from_rotation_x(0.8), 1e-6));
    }

    #[test]
    fn test_color_fade() {
        let mid = Color::WHITE.lerp(&Color::TRANSPARENT, 0.5);
        assert!(mid.approx_eq(&Color::rgba(0.5, 0.5, 0.5, 0.5), 1e-6));
        assert_eq!(Color::BLACK.with_alpha(0.25).a, 0.25);
    }
}
