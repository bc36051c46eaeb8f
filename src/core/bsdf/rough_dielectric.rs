//! Rough dielectric (GGX reflection + refraction), grounded on
//! `src/libaspirin/bsdfs/roughdielectric.cpp`.

use crate::core::bsdf::{Bsdf, BsdfContext, BsdfFlags, BsdfSample, TransportMode};
use crate::core::float::Float;
use crate::core::fresnel::{fresnel_dielectric, refract_about};
use crate::core::geometry::{normalize3, Frame, Point2f, Vector3f};
use crate::core::interaction::SurfaceInteraction;
use crate::core::microfacet::MicrofacetDistribution;
use crate::core::spectrum::Spectrum;
use crate::core::texture::Texture;

pub struct RoughDielectricBsdf {
    pub specular_reflectance: Box<dyn Texture>,
    pub specular_transmittance: Box<dyn Texture>,
    pub alpha_u: Box<dyn Texture>,
    pub alpha_v: Box<dyn Texture>,
    pub eta: Float,
    pub inv_eta: Float,
    pub sample_visible: bool,
}

impl RoughDielectricBsdf {
    pub fn new(int_ior: Float, ext_ior: Float, alpha: Float) -> Self {
        RoughDielectricBsdf {
            specular_reflectance: Box::new(crate::core::texture::ConstantTexture::scalar(1.0)),
            specular_transmittance: Box::new(crate::core::texture::ConstantTexture::scalar(1.0)),
            alpha_u: Box::new(crate::core::texture::ConstantTexture::scalar(alpha)),
            alpha_v: Box::new(crate::core::texture::ConstantTexture::scalar(alpha)),
            eta: int_ior / ext_ior,
            inv_eta: ext_ior / int_ior,
            sample_visible: false,
        }
    }

    fn distribution(&self, si: &SurfaceInteraction) -> MicrofacetDistribution {
        MicrofacetDistribution::new(self.alpha_u.eval_1(si), self.alpha_v.eval_1(si), self.sample_visible)
    }
}

impl Bsdf for RoughDielectricBsdf {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        sample1: Float,
        sample2: Point2f,
    ) -> (BsdfSample, Spectrum) {
        let has_reflection = ctx.is_enabled(BsdfFlags::GLOSSY_REFLECTION, 0);
        let has_transmission = ctx.is_enabled(BsdfFlags::GLOSSY_TRANSMISSION, 1);
        if !has_reflection && !has_transmission {
            return (BsdfSample::invalid(), Spectrum::black());
        }
        let cos_theta_i = Frame::cos_theta(si.wi);
        let distr = self.distribution(si);
        let sample_distr = if self.sample_visible {
            distr
        } else {
            distr.scaled(1.2 - 0.2 * cos_theta_i.abs().sqrt())
        };
        let wi_oriented = si.wi * cos_theta_i.signum();
        let (mut m, mut pdf) = sample_distr.sample(sample2);
        m = if crate::core::geometry::dot3(m, wi_oriented) >= 0.0 { m } else { -m };
        if pdf == 0.0 {
            return (BsdfSample::invalid(), Spectrum::black());
        }

        let (f, cos_theta_t, eta_it, eta_ti) = fresnel_dielectric(crate::core::geometry::dot3(si.wi, m), self.eta);
        let selected_r = if has_reflection && has_transmission {
            pdf *= if sample1 <= f { f } else { 1.0 - f };
            sample1 <= f
        } else {
            has_reflection
        };

        let mut weight = if has_reflection && has_transmission {
            Spectrum::one()
        } else {
            Spectrum::splat(if has_reflection { f } else { 1.0 - f })
        };

        let wo;
        let dwh_dwo;
        if selected_r {
            wo = crate::core::fresnel::reflect_about(si.wi, m);
            weight *= self.specular_reflectance.eval_3(si);
            dwh_dwo = 1.0 / (4.0 * crate::core::geometry::dot3(wo, m));
        } else {
            wo = refract_about(si.wi, m, cos_theta_t, eta_ti);
            let factor = if ctx.mode == TransportMode::Radiance { eta_ti * eta_ti } else { 1.0 };
            weight *= self.specular_transmittance.eval_3(si) * factor;
            let denom = (crate::core::geometry::dot3(si.wi, m) + eta_it * crate::core::geometry::dot3(wo, m)).powi(2);
            dwh_dwo = eta_it * eta_it * crate::core::geometry::dot3(wo, m) / denom.max(1e-12);
        }

        if self.sample_visible {
            weight *= distr.smith_g1(wo, m);
        } else {
            weight *= distr.g(si.wi, wo, m) * crate::core::geometry::dot3(si.wi, m) / (cos_theta_i * Frame::cos_theta(m));
        }
        pdf *= dwh_dwo.abs();

        let bs = BsdfSample {
            wo,
            pdf,
            eta: if selected_r { 1.0 } else { eta_it },
            sampled_type: if selected_r { BsdfFlags::GLOSSY_REFLECTION } else { BsdfFlags::GLOSSY_TRANSMISSION },
            sampled_component: if selected_r { 0 } else { 1 },
        };
        (bs, weight)
    }

    fn eval(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Spectrum {
        let cos_theta_i = Frame::cos_theta(si.wi);
        let cos_theta_o = Frame::cos_theta(wo);
        if cos_theta_i == 0.0 {
            return Spectrum::black();
        }
        let has_reflection = ctx.is_enabled(BsdfFlags::GLOSSY_REFLECTION, 0);
        let has_transmission = ctx.is_enabled(BsdfFlags::GLOSSY_TRANSMISSION, 1);
        let is_reflect = cos_theta_i * cos_theta_o > 0.0;
        let eta = if cos_theta_i > 0.0 { self.eta } else { self.inv_eta };
        let inv_eta = if cos_theta_i > 0.0 { self.inv_eta } else { self.eta };
        let mut m = normalize3(si.wi + wo * (if is_reflect { 1.0 } else { eta }));
        m = m * Frame::cos_theta(m).signum();
        let distr = self.distribution(si);
        let d = distr.eval(m);
        let (f, ..) = fresnel_dielectric(crate::core::geometry::dot3(si.wi, m), self.eta);
        let g = distr.g(si.wi, wo, m);
        if has_reflection && is_reflect {
            Spectrum::splat(f * d * g / (4.0 * cos_theta_i.abs())) * self.specular_reflectance.eval_3(si)
        } else if has_transmission && !is_reflect {
            let scale = if ctx.mode == TransportMode::Radiance { inv_eta * inv_eta } else { 1.0 };
            let denom = (crate::core::geometry::dot3(si.wi, m) + eta * crate::core::geometry::dot3(wo, m)).powi(2);
            let value = (scale * (1.0 - f) * d * g * eta * eta * crate::core::geometry::dot3(si.wi, m) * crate::core::geometry::dot3(wo, m)
                / (cos_theta_i * denom.max(1e-12)))
                .abs();
            self.specular_transmittance.eval_3(si) * value
        } else {
            Spectrum::black()
        }
    }

    fn pdf(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Float {
        let cos_theta_i = Frame::cos_theta(si.wi);
        let cos_theta_o = Frame::cos_theta(wo);
        if cos_theta_i == 0.0 {
            return 0.0;
        }
        let has_reflection = ctx.is_enabled(BsdfFlags::GLOSSY_REFLECTION, 0);
        let has_transmission = ctx.is_enabled(BsdfFlags::GLOSSY_TRANSMISSION, 1);
        if !has_reflection && !has_transmission {
            return 0.0;
        }
        let is_reflect = cos_theta_i * cos_theta_o > 0.0;
        let eta = if cos_theta_i > 0.0 { self.eta } else { self.inv_eta };
        let mut m = normalize3(si.wi + wo * (if is_reflect { 1.0 } else { eta }));
        m = m * Frame::cos_theta(m).signum();
        if crate::core::geometry::dot3(si.wi, m) * cos_theta_i <= 0.0 || crate::core::geometry::dot3(wo, m) * cos_theta_o <= 0.0 {
            return 0.0;
        }
        let dwh_dwo = if is_reflect {
            1.0 / (4.0 * crate::core::geometry::dot3(wo, m))
        } else {
            let denom = (crate::core::geometry::dot3(si.wi, m) + eta * crate::core::geometry::dot3(wo, m)).powi(2);
            eta * eta * crate::core::geometry::dot3(wo, m) / denom.max(1e-12)
        };
        let base = self.distribution(si);
        let sample_distr = if self.sample_visible {
            base
        } else {
            base.scaled(1.2 - 0.2 * cos_theta_i.abs().sqrt())
        };
        let mut prob = sample_distr.pdf(m);
        if has_transmission && has_reflection {
            let (f, ..) = fresnel_dielectric(crate::core::geometry::dot3(si.wi, m), self.eta);
            prob *= if is_reflect { f } else { 1.0 - f };
        }
        prob * dwh_dwo.abs()
    }

    fn flags(&self) -> BsdfFlags {
        BsdfFlags::GLOSSY_REFLECTION | BsdfFlags::GLOSSY_TRANSMISSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Normal3f, Point3f};

    #[test]
    fn smooth_limit_pdf_is_finite() {
        let bsdf = RoughDielectricBsdf::new(1.5, 1.0, 0.05);
        let si = SurfaceInteraction {
            t: 1.0,
            p: Point3f::new(0.0, 0.0, 0.0),
            n: Normal3f::new(0.0, 0.0, 1.0),
            uv: Point2f::new(0.0, 0.0),
            sh_frame: Frame::new(Normal3f::new(0.0, 0.0, 1.0)),
            wi: Vector3f::new(0.0, 0.0, 1.0),
            prim_index: 0,
            bsdf: None,
            emitter: None,
            interior_medium: None,
            exterior_medium: None,
        };
        let ctx = BsdfContext::new(TransportMode::Radiance);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        assert!(bsdf.pdf(&ctx, &si, wo).is_finite());
        assert!(bsdf.eval(&ctx, &si, wo).is_finite());
    }
}
