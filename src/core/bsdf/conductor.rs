//! Rough conductor (GGX microfacet reflection), grounded on
//! `src/libaspirin/bsdfs/roughconductor.cpp`; the perfectly smooth variant
//! it falls back to at `alpha -> 0` is grounded on
//! `src/libaspirin/bsdfs/conductor.cpp`.

use crate::core::bsdf::{Bsdf, BsdfContext, BsdfFlags};
use crate::core::bsdf::BsdfSample;
use crate::core::float::Float;
use crate::core::fresnel::{fresnel_conductor, reflect, reflect_about};
use crate::core::geometry::{normalize3, Frame, Point2f, Vector3f};
use crate::core::interaction::SurfaceInteraction;
use crate::core::microfacet::MicrofacetDistribution;
use crate::core::spectrum::Spectrum;
use crate::core::texture::Texture;

pub struct RoughConductorBsdf {
    pub alpha_u: Box<dyn Texture>,
    pub alpha_v: Box<dyn Texture>,
    pub eta: Box<dyn Texture>,
    pub k: Box<dyn Texture>,
    pub specular_reflectance: Box<dyn Texture>,
    pub sample_visible: bool,
}

impl RoughConductorBsdf {
    fn distribution(&self, si: &SurfaceInteraction) -> MicrofacetDistribution {
        MicrofacetDistribution::new(self.alpha_u.eval_1(si), self.alpha_v.eval_1(si), self.sample_visible)
    }
}

impl Bsdf for RoughConductorBsdf {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        _sample1: Float,
        sample2: Point2f,
    ) -> (BsdfSample, Spectrum) {
        let cos_theta_i = Frame::cos_theta(si.wi);
        if !ctx.is_enabled(BsdfFlags::GLOSSY_REFLECTION, 0) || cos_theta_i <= 0.0 {
            return (BsdfSample::invalid(), Spectrum::black());
        }
        let distr = self.distribution(si);
        let (m, mut pdf) = distr.sample(sample2);
        let wo = reflect_about(si.wi, m);

        if pdf == 0.0 || Frame::cos_theta(wo) <= 0.0 {
            return (BsdfSample::invalid(), Spectrum::black());
        }

        let weight_g = if distr.sample_visible() {
            distr.smith_g1(wo, m)
        } else {
            distr.g(si.wi, wo, m) * crate::core::geometry::dot3(si.wi, m) / (cos_theta_i * Frame::cos_theta(m))
        };
        pdf /= 4.0 * crate::core::geometry::dot3(wo, m);

        let f = fresnel_conductor(crate::core::geometry::dot3(si.wi, m), self.eta.eval_3(si), self.k.eval_3(si));
        let bs = BsdfSample {
            wo,
            pdf,
            eta: 1.0,
            sampled_type: BsdfFlags::GLOSSY_REFLECTION,
            sampled_component: 0,
        };
        (bs, f * weight_g)
    }

    fn eval(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Spectrum {
        let cos_theta_i = Frame::cos_theta(si.wi);
        let cos_theta_o = Frame::cos_theta(wo);
        if !ctx.is_enabled(BsdfFlags::GLOSSY_REFLECTION, 0) || cos_theta_i <= 0.0 || cos_theta_o <= 0.0 {
            return Spectrum::black();
        }
        let h = normalize3(wo + si.wi);
        let distr = self.distribution(si);
        let d = distr.eval(h);
        if d == 0.0 {
            return Spectrum::black();
        }
        let g = distr.g(si.wi, wo, h);
        let f = fresnel_conductor(crate::core::geometry::dot3(si.wi, h), self.eta.eval_3(si), self.k.eval_3(si));
        f * (d * g / (4.0 * cos_theta_i)) * self.specular_reflectance.eval_3(si)
    }

    fn pdf(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Float {
        let cos_theta_i = Frame::cos_theta(si.wi);
        let cos_theta_o = Frame::cos_theta(wo);
        let m = normalize3(wo + si.wi);
        if !ctx.is_enabled(BsdfFlags::GLOSSY_REFLECTION, 0)
            || cos_theta_i <= 0.0
            || cos_theta_o <= 0.0
            || crate::core::geometry::dot3(si.wi, m) <= 0.0
            || crate::core::geometry::dot3(wo, m) <= 0.0
        {
            return 0.0;
        }
        let distr = self.distribution(si);
        if distr.sample_visible() {
            distr.eval(m) * distr.smith_g1(si.wi, m) / (4.0 * cos_theta_i)
        } else {
            distr.pdf(m) / (4.0 * crate::core::geometry::dot3(wo, m))
        }
    }

    fn flags(&self) -> BsdfFlags {
        BsdfFlags::GLOSSY_REFLECTION
    }
}

/// Perfectly smooth mirror, for `alpha -> 0` (spec §4.7 lists a delta
/// conductor alongside the rough variant), grounded on
/// `src/libaspirin/bsdfs/conductor.cpp`.
pub struct ConductorBsdf {
    pub eta: Box<dyn Texture>,
    pub k: Box<dyn Texture>,
    pub specular_reflectance: Box<dyn Texture>,
}

impl Bsdf for ConductorBsdf {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        _sample1: Float,
        _sample2: Point2f,
    ) -> (BsdfSample, Spectrum) {
        let cos_theta_i = Frame::cos_theta(si.wi);
        if cos_theta_i <= 0.0 || !ctx.is_enabled(BsdfFlags::DELTA_REFLECTION, 0) {
            return (BsdfSample::invalid(), Spectrum::black());
        }
        let bs = BsdfSample {
            wo: reflect(si.wi),
            pdf: 1.0,
            eta: 1.0,
            sampled_type: BsdfFlags::DELTA_REFLECTION,
            sampled_component: 0,
        };
        let value = self.specular_reflectance.eval_3(si) * fresnel_conductor(cos_theta_i, self.eta.eval_3(si), self.k.eval_3(si));
        (bs, value)
    }

    fn eval(&self, _ctx: &BsdfContext, _si: &SurfaceInteraction, _wo: Vector3f) -> Spectrum {
        Spectrum::black()
    }

    fn pdf(&self, _ctx: &BsdfContext, _si: &SurfaceInteraction, _wo: Vector3f) -> Float {
        0.0
    }

    fn flags(&self) -> BsdfFlags {
        BsdfFlags::DELTA_REFLECTION
    }
}
