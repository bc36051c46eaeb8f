//! Scalar type and the small set of numerical constants the renderer is
//! built around (see spec §6 "Numerical constants").

pub type Float = f32;

pub const PI: Float = std::f32::consts::PI;
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
pub const INV_TWO_PI: Float = 0.5 * std::f32::consts::FRAC_1_PI;
pub const INV_FOUR_PI: Float = 0.25 * std::f32::consts::FRAC_1_PI;

/// `1.5e3 * machine_epsilon`, used as the default ray `mint` and to offset
/// spawned rays off the surface they originate from.
pub const RAY_EPSILON: Float = 1.5e3 * std::f32::EPSILON;

/// `10 * RAY_EPSILON`, used to shrink shadow-ray `maxt` short of the light.
pub const SHADOW_EPSILON: Float = 10.0 * RAY_EPSILON;

#[inline]
pub fn lerp(t: Float, a: Float, b: Float) -> Float {
    (1.0 - t) * a + t * b
}

#[inline]
pub fn clamp(x: Float, lo: Float, hi: Float) -> Float {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// `sqrt` that treats small negative inputs (from float cancellation) as zero
/// instead of producing NaN.
#[inline]
pub fn safe_sqrt(x: Float) -> Float {
    x.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_epsilon_matches_spec_value() {
        assert!((RAY_EPSILON - 1.78e-4).abs() < 1e-5);
        assert!((SHADOW_EPSILON - 10.0 * RAY_EPSILON).abs() < 1e-9);
    }

    #[test]
    fn safe_sqrt_clamps_negative() {
        assert_eq!(safe_sqrt(-0.001), 0.0);
        assert!((safe_sqrt(4.0) - 2.0).abs() < 1e-6);
    }
}
