//! RGB radiometric spectrum (spec §3 "Spectrum").
//!
//! Fixed to RGB3 per the redesign notes (spec §9): wavelengths never enter
//! the integrator's control flow, only the records that would carry them in
//! a spectral extension.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub};

use crate::core::float::Float;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spectrum {
    pub r: Float,
    pub g: Float,
    pub b: Float,
}

impl Spectrum {
    pub const fn new(r: Float, g: Float, b: Float) -> Self {
        Spectrum { r, g, b }
    }

    pub const fn splat(v: Float) -> Self {
        Spectrum { r: v, g: v, b: v }
    }

    pub const fn black() -> Self {
        Spectrum::splat(0.0)
    }

    pub const fn one() -> Self {
        Spectrum::splat(1.0)
    }

    pub fn luminance(&self) -> Float {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn max_component(&self) -> Float {
        self.r.max(self.g).max(self.b)
    }

    /// Indexes into (r, g, b) by spectral sampling channel (0/1/2), used by
    /// single-channel collision sampling in participating media.
    pub fn channel(&self, index: usize) -> Float {
        match index {
            0 => self.r,
            1 => self.g,
            _ => self.b,
        }
    }

    /// True only when every component is exactly zero, per spec §3.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    pub fn has_nan(&self) -> bool {
        self.r.is_nan() || self.g.is_nan() || self.b.is_nan()
    }

    pub fn has_negative(&self) -> bool {
        self.r < 0.0 || self.g < 0.0 || self.b < 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    pub fn clamp(&self, lo: Float, hi: Float) -> Self {
        Spectrum::new(
            crate::core::float::clamp(self.r, lo, hi),
            crate::core::float::clamp(self.g, lo, hi),
            crate::core::float::clamp(self.b, lo, hi),
        )
    }

    pub fn sqrt(&self) -> Self {
        Spectrum::new(self.r.max(0.0).sqrt(), self.g.max(0.0).sqrt(), self.b.max(0.0).sqrt())
    }

    pub fn exp(&self) -> Self {
        Spectrum::new(self.r.exp(), self.g.exp(), self.b.exp())
    }
}

impl Add for Spectrum {
    type Output = Spectrum;
    fn add(self, rhs: Spectrum) -> Spectrum {
        Spectrum::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}
impl AddAssign for Spectrum {
    fn add_assign(&mut self, rhs: Spectrum) {
        *self = *self + rhs;
    }
}
impl Sub for Spectrum {
    type Output = Spectrum;
    fn sub(self, rhs: Spectrum) -> Spectrum {
        Spectrum::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}
impl Mul for Spectrum {
    type Output = Spectrum;
    fn mul(self, rhs: Spectrum) -> Spectrum {
        Spectrum::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}
impl MulAssign for Spectrum {
    fn mul_assign(&mut self, rhs: Spectrum) {
        *self = *self * rhs;
    }
}
impl Mul<Float> for Spectrum {
    type Output = Spectrum;
    fn mul(self, rhs: Float) -> Spectrum {
        Spectrum::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}
impl MulAssign<Float> for Spectrum {
    fn mul_assign(&mut self, rhs: Float) {
        *self = *self * rhs;
    }
}
impl Mul<Spectrum> for Float {
    type Output = Spectrum;
    fn mul(self, rhs: Spectrum) -> Spectrum {
        rhs * self
    }
}
impl Div<Float> for Spectrum {
    type Output = Spectrum;
    fn div(self, rhs: Float) -> Spectrum {
        Spectrum::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}
impl DivAssign<Float> for Spectrum {
    fn div_assign(&mut self, rhs: Float) {
        *self = *self / rhs;
    }
}
impl Div for Spectrum {
    type Output = Spectrum;
    fn div(self, rhs: Spectrum) -> Spectrum {
        Spectrum::new(self.r / rhs.r, self.g / rhs.g, self.b / rhs.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_matches_rec709_weights() {
        let s = Spectrum::new(1.0, 0.0, 0.0);
        assert!((s.luminance() - 0.2126).abs() < 1e-6);
    }

    #[test]
    fn is_black_requires_exact_zero() {
        assert!(Spectrum::black().is_black());
        assert!(!Spectrum::new(1e-8, 0.0, 0.0).is_black());
    }

    #[test]
    fn componentwise_ops() {
        let a = Spectrum::new(1.0, 2.0, 3.0);
        let b = Spectrum::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Spectrum::new(1.5, 2.5, 3.5));
        assert_eq!(a * b, Spectrum::new(0.5, 1.0, 1.5));
        assert_eq!(a * 2.0, Spectrum::new(2.0, 4.0, 6.0));
    }
}
