//! Isotropic GGX microfacet distribution (spec §4.7 rough BSDFs), grounded
//! on `include/misaki/render/microfacet.h`'s `MicrofacetDistribution` (the
//! GGX branch; Beckmann is left unimplemented there too).

use crate::core::float::{safe_sqrt, Float, INV_PI, PI};
use crate::core::geometry::{Frame, Point2f, Vector3f};

#[derive(Debug, Clone, Copy)]
pub struct MicrofacetDistribution {
    alpha_u: Float,
    alpha_v: Float,
    sample_visible: bool,
}

impl MicrofacetDistribution {
    pub fn new(alpha_u: Float, alpha_v: Float, sample_visible: bool) -> Self {
        MicrofacetDistribution {
            alpha_u: alpha_u.max(1e-4),
            alpha_v: alpha_v.max(1e-4),
            sample_visible,
        }
    }

    pub fn isotropic(alpha: Float) -> Self {
        MicrofacetDistribution::new(alpha, alpha, false)
    }

    /// Both alpha axes scaled by `v`, for the rough-dielectric
    /// firefly-reduction trick of widening the sampling lobe beyond the
    /// evaluation lobe (`roughdielectric.cpp`'s `sample_distr`).
    pub fn scaled(&self, v: Float) -> Self {
        MicrofacetDistribution::new(self.alpha_u * v, self.alpha_v * v, self.sample_visible)
    }

    pub fn sample_visible(&self) -> bool {
        self.sample_visible
    }

    /// Normal distribution function `D(m)`.
    pub fn eval(&self, m: Vector3f) -> Float {
        let cos_theta_2 = Frame::cos_theta_2(m);
        if cos_theta_2 <= 0.0 {
            return 0.0;
        }
        let beckmann_exp =
            (m.x * m.x / (self.alpha_u * self.alpha_u) + m.y * m.y / (self.alpha_v * self.alpha_v)) / cos_theta_2;
        let root = (1.0 + beckmann_exp) * cos_theta_2;
        let d = 1.0 / (PI * self.alpha_u * self.alpha_v * root * root);
        if d * Frame::cos_theta(m) > 1e-20 {
            d
        } else {
            0.0
        }
    }

    pub fn pdf(&self, m: Vector3f) -> Float {
        self.eval(m) * Frame::cos_theta(m)
    }

    /// Sample a microsurface normal from the full (non-visible) GGX
    /// distribution. Returns `(m, pdf)`.
    pub fn sample(&self, sample: Point2f) -> (Vector3f, Float) {
        let phi_m = (self.alpha_u / self.alpha_v * (PI + 2.0 * PI * sample.y).tan()).atan()
            + PI * (2.0 * sample.y + 0.5).floor();
        let (sin_phi_m, cos_phi_m) = phi_m.sin_cos();
        let cos = cos_phi_m / self.alpha_u;
        let sin = sin_phi_m / self.alpha_v;
        let alpha_sqr = 1.0 / (cos * cos + sin * sin);
        let tan_theta_m_sqr = alpha_sqr * sample.x / (1.0 - sample.x);
        let cos_theta_m = 1.0 / (1.0 + tan_theta_m_sqr).sqrt();
        let tmp = 1.0 + tan_theta_m_sqr / alpha_sqr;
        let mut pdf = INV_PI / (self.alpha_u * self.alpha_v * cos_theta_m.powi(3) * tmp * tmp);
        if pdf < 1e-20 {
            pdf = 0.0;
        }
        let sin_theta_m = safe_sqrt(1.0 - cos_theta_m * cos_theta_m);
        (
            Vector3f::new(sin_theta_m * cos_phi_m, sin_theta_m * sin_phi_m, cos_theta_m),
            pdf,
        )
    }

    pub fn smith_g1(&self, v: Vector3f, m: Vector3f) -> Float {
        let xy_alpha_2 = (self.alpha_u * v.x).powi(2) + (self.alpha_v * v.y).powi(2);
        if xy_alpha_2 == 0.0 {
            return 1.0;
        }
        if crate::core::geometry::dot3(v, m) * Frame::cos_theta(v) <= 0.0 {
            return 0.0;
        }
        let tan_theta_alpha_2 = xy_alpha_2 / (v.z * v.z);
        2.0 / (1.0 + (1.0 + tan_theta_alpha_2).sqrt())
    }

    pub fn g(&self, wi: Vector3f, wo: Vector3f, m: Vector3f) -> Float {
        self.smith_g1(wi, m) * self.smith_g1(wo, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_distribution_peaks_straight_up() {
        let d = MicrofacetDistribution::isotropic(0.1);
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let tilted = Vector3f::new(0.3, 0.0, (1.0 - 0.09_f32).sqrt());
        assert!(d.eval(up) > d.eval(tilted));
    }

    #[test]
    fn smith_g1_is_one_for_normal_incidence() {
        let d = MicrofacetDistribution::isotropic(0.3);
        let up = Vector3f::new(0.0, 0.0, 1.0);
        assert!((d.smith_g1(up, up) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn sampled_normal_pdf_matches_eval_based_pdf() {
        let d = MicrofacetDistribution::isotropic(0.2);
        let (m, pdf) = d.sample(Point2f::new(0.3, 0.6));
        if pdf > 0.0 {
            assert!((pdf - d.pdf(m)).abs() / pdf < 1e-2);
        }
    }
}
