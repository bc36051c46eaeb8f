//! Lambertian reflection, grounded on `src/libaspirin/bsdfs/diffuse.cpp`.

use crate::core::bsdf::{Bsdf, BsdfContext, BsdfFlags, BsdfSample};
use crate::core::float::{Float, INV_PI};
use crate::core::geometry::{Frame, Point2f, Vector3f};
use crate::core::interaction::SurfaceInteraction;
use crate::core::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere};
use crate::core::spectrum::Spectrum;
use crate::core::texture::Texture;

pub struct DiffuseBsdf {
    pub reflectance: Box<dyn Texture>,
}

impl DiffuseBsdf {
    pub fn new(reflectance: Box<dyn Texture>) -> Self {
        DiffuseBsdf { reflectance }
    }
}

impl Bsdf for DiffuseBsdf {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        _sample1: Float,
        sample2: Point2f,
    ) -> (BsdfSample, Spectrum) {
        let cos_theta_i = Frame::cos_theta(si.wi);
        if cos_theta_i <= 0.0 || !ctx.is_enabled(BsdfFlags::DIFFUSE_REFLECTION, 0) {
            return (BsdfSample::invalid(), Spectrum::black());
        }
        let wo = cosine_sample_hemisphere(sample2);
        let pdf = cosine_hemisphere_pdf(wo.z);
        let bs = BsdfSample {
            wo,
            pdf,
            eta: 1.0,
            sampled_type: BsdfFlags::DIFFUSE_REFLECTION,
            sampled_component: 0,
        };
        let value = if pdf > 0.0 {
            self.reflectance.eval_3(si)
        } else {
            Spectrum::black()
        };
        (bs, value)
    }

    fn eval(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Spectrum {
        if !ctx.is_enabled(BsdfFlags::DIFFUSE_REFLECTION, 0) {
            return Spectrum::black();
        }
        let cos_theta_i = Frame::cos_theta(si.wi);
        let cos_theta_o = Frame::cos_theta(wo);
        if cos_theta_i > 0.0 && cos_theta_o > 0.0 {
            self.reflectance.eval_3(si) * (INV_PI * cos_theta_o)
        } else {
            Spectrum::black()
        }
    }

    fn pdf(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Float {
        if !ctx.is_enabled(BsdfFlags::DIFFUSE_REFLECTION, 0) {
            return 0.0;
        }
        if Frame::cos_theta(si.wi) > 0.0 && Frame::cos_theta(wo) > 0.0 {
            cosine_hemisphere_pdf(Frame::cos_theta(wo))
        } else {
            0.0
        }
    }

    fn flags(&self) -> BsdfFlags {
        BsdfFlags::DIFFUSE_REFLECTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Normal3f, Point3f};
    use crate::core::texture::ConstantTexture;

    fn si_with_wi(wi: Vector3f) -> SurfaceInteraction {
        SurfaceInteraction {
            t: 1.0,
            p: Point3f::new(0.0, 0.0, 0.0),
            n: Normal3f::new(0.0, 0.0, 1.0),
            uv: Point2f::new(0.0, 0.0),
            sh_frame: Frame::new(Normal3f::new(0.0, 0.0, 1.0)),
            wi,
            prim_index: 0,
            bsdf: None,
            emitter: None,
            interior_medium: None,
            exterior_medium: None,
        }
    }

    #[test]
    fn eval_matches_sample_pdf_law() {
        // spec §8: eval(wo) should equal reflectance/pi * cos(theta_o), and
        // sample's returned "weight" (bsdf*cos/pdf) should integrate to
        // reflectance when pdf is the cosine-weighted density.
        let bsdf = DiffuseBsdf::new(Box::new(ConstantTexture::new(Spectrum::new(0.5, 0.5, 0.5))));
        let si = si_with_wi(Vector3f::new(0.0, 0.0, 1.0));
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let ctx = BsdfContext::new(crate::core::bsdf::TransportMode::Radiance);
        let value = bsdf.eval(&ctx, &si, wo);
        assert!((value.r - 0.5 * INV_PI).abs() < 1e-5);
    }

    #[test]
    fn backface_incidence_yields_zero() {
        let bsdf = DiffuseBsdf::new(Box::new(ConstantTexture::scalar(0.5)));
        let si = si_with_wi(Vector3f::new(0.0, 0.0, -1.0));
        let ctx = BsdfContext::new(crate::core::bsdf::TransportMode::Radiance);
        let (bs, val) = bsdf.sample(&ctx, &si, 0.5, Point2f::new(0.2, 0.7));
        assert_eq!(bs.pdf, 0.0);
        assert!(val.is_black());
    }
}
