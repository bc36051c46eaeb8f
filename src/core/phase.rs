//! Phase function contract (spec §4.13), grounded on
//! `include/aspirin/phase.h` and `src/libaspirin/phase/isotropic.cpp` in
//! `examples/original_source/`.

use crate::core::float::{Float, INV_FOUR_PI, PI};
use crate::core::geometry::{Point2f, Vector3f};
use crate::core::sampling::{uniform_sample_sphere, uniform_sphere_pdf};

bitflags::bitflags! {
    pub struct PhaseFlags: u32 {
        const ISOTROPIC = 0x01;
        const ANISOTROPIC = 0x02;
    }
}

pub trait PhaseFunction: Send + Sync {
    /// Importance-sample an outgoing direction; returns `(wo, weight)`
    /// where `weight = eval(wi, wo) / pdf(wo)`, matching the
    /// `Bsdf::sample` convention (1.0 for an exactly importance-sampled
    /// phase function).
    fn sample(&self, wi: Vector3f, sample: Point2f) -> (Vector3f, Float);
    fn eval(&self, wi: Vector3f, wo: Vector3f) -> Float;
    fn flags(&self) -> PhaseFlags;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IsotropicPhaseFunction;

impl PhaseFunction for IsotropicPhaseFunction {
    fn sample(&self, _wi: Vector3f, sample: Point2f) -> (Vector3f, Float) {
        let wo = uniform_sample_sphere(sample);
        (wo, 1.0)
    }

    fn eval(&self, _wi: Vector3f, _wo: Vector3f) -> Float {
        uniform_sphere_pdf()
    }

    fn flags(&self) -> PhaseFlags {
        PhaseFlags::ISOTROPIC
    }
}

/// Henyey-Greenstein phase function; `g` in `(-1, 1)` controls forward
/// (`g > 0`) vs. backward (`g < 0`) scattering bias. Supplemented from
/// `original_source/` alongside the isotropic phase function: a
/// participating-medium system with only isotropic scattering cannot
/// reproduce forward-peaked media like fog or skin, which HG is the
/// standard single-lobe model for.
#[derive(Debug, Clone, Copy)]
pub struct HenyeyGreensteinPhaseFunction {
    g: Float,
}

impl HenyeyGreensteinPhaseFunction {
    pub fn new(g: Float) -> Self {
        HenyeyGreensteinPhaseFunction {
            g: g.max(-0.999).min(0.999),
        }
    }

    fn eval_hg(&self, cos_theta: Float) -> Float {
        let g = self.g;
        let denom = 1.0 + g * g + 2.0 * g * cos_theta;
        INV_FOUR_PI * (1.0 - g * g) / (denom * denom.abs().sqrt())
    }
}

impl PhaseFunction for HenyeyGreensteinPhaseFunction {
    fn sample(&self, wi: Vector3f, sample: Point2f) -> (Vector3f, Float) {
        let g = self.g;
        let cos_theta = if g.abs() < 1e-3 {
            1.0 - 2.0 * sample.x
        } else {
            let sqr_term = (1.0 - g * g) / (1.0 + g - 2.0 * g * sample.x);
            -(1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)
        };
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * sample.y;
        let frame = crate::core::geometry::Frame::new(crate::core::geometry::Normal3f::from(wi));
        let local = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        let wo = frame.to_world(local);
        (wo, 1.0)
    }

    fn eval(&self, wi: Vector3f, wo: Vector3f) -> Float {
        let cos_theta = crate::core::geometry::dot3(wi, wo);
        self.eval_hg(cos_theta)
    }

    fn flags(&self) -> PhaseFlags {
        PhaseFlags::ANISOTROPIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isotropic_eval_is_constant_over_direction() {
        let p = IsotropicPhaseFunction;
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        assert_eq!(p.eval(wi, Vector3f::new(1.0, 0.0, 0.0)), p.eval(wi, Vector3f::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn hg_zero_g_matches_isotropic() {
        let hg = HenyeyGreensteinPhaseFunction::new(0.0);
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.0, 0.0, -1.0);
        assert!((hg.eval(wi, wo) - INV_FOUR_PI).abs() < 1e-3);
    }

    #[test]
    fn hg_forward_lobe_peaks_in_incident_direction() {
        let hg = HenyeyGreensteinPhaseFunction::new(0.9);
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let forward = hg.eval(wi, wi);
        let backward = hg.eval(wi, Vector3f::new(0.0, 0.0, -1.0));
        assert!(forward > backward);
    }
}
