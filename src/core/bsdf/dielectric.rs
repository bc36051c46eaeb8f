//! Smooth dielectric (two delta lobes: reflection + transmission),
//! grounded on `src/libaspirin/bsdfs/dielectric.cpp`.

use crate::core::bsdf::{Bsdf, BsdfContext, BsdfFlags, BsdfSample, TransportMode};
use crate::core::float::Float;
use crate::core::fresnel::{fresnel_dielectric, reflect, refract};
use crate::core::geometry::{Frame, Point2f, Vector3f};
use crate::core::interaction::SurfaceInteraction;
use crate::core::spectrum::Spectrum;
use crate::core::texture::Texture;

pub struct SmoothDielectricBsdf {
    pub eta: Float,
    pub specular_reflectance: Box<dyn Texture>,
    pub specular_transmittance: Box<dyn Texture>,
}

impl SmoothDielectricBsdf {
    pub fn new(int_ior: Float, ext_ior: Float) -> Self {
        SmoothDielectricBsdf {
            eta: int_ior / ext_ior,
            specular_reflectance: Box::new(crate::core::texture::ConstantTexture::scalar(1.0)),
            specular_transmittance: Box::new(crate::core::texture::ConstantTexture::scalar(1.0)),
        }
    }
}

impl Bsdf for SmoothDielectricBsdf {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        _sample1: Float,
        sample2: Point2f,
    ) -> (BsdfSample, Spectrum) {
        let has_reflection = ctx.is_enabled(BsdfFlags::DELTA_REFLECTION, 0);
        let has_transmission = ctx.is_enabled(BsdfFlags::DELTA_TRANSMISSION, 1);
        let cos_theta_i = Frame::cos_theta(si.wi);
        let (r_i, cos_theta_t, eta_it, eta_ti) = fresnel_dielectric(cos_theta_i, self.eta);
        let t_i = 1.0 - r_i;

        if !has_reflection && !has_transmission {
            return (BsdfSample::invalid(), Spectrum::black());
        }

        let (selected_r, lobe_pdf) = if has_reflection && has_transmission {
            (sample2.x <= r_i, if sample2.x <= r_i { r_i } else { t_i })
        } else {
            (has_reflection, 1.0)
        };

        let wo = if selected_r {
            reflect(si.wi)
        } else {
            refract(si.wi, cos_theta_t, eta_ti)
        };
        let bs = BsdfSample {
            wo,
            pdf: lobe_pdf,
            eta: if selected_r { 1.0 } else { eta_it },
            sampled_type: if selected_r {
                BsdfFlags::DELTA_REFLECTION
            } else {
                BsdfFlags::DELTA_TRANSMISSION
            },
            sampled_component: if selected_r { 0 } else { 1 },
        };

        let mut weight = if has_reflection && has_transmission {
            Spectrum::one()
        } else {
            Spectrum::splat(if has_reflection { r_i } else { t_i })
        };
        if selected_r {
            weight *= self.specular_reflectance.eval_3(si);
        } else {
            let factor = if ctx.mode == TransportMode::Radiance { eta_ti } else { 1.0 };
            weight *= self.specular_transmittance.eval_3(si) * (factor * factor);
        }
        (bs, weight)
    }

    fn eval(&self, _ctx: &BsdfContext, _si: &SurfaceInteraction, _wo: Vector3f) -> Spectrum {
        Spectrum::black()
    }

    fn pdf(&self, _ctx: &BsdfContext, _si: &SurfaceInteraction, _wo: Vector3f) -> Float {
        0.0
    }

    fn flags(&self) -> BsdfFlags {
        BsdfFlags::DELTA_REFLECTION | BsdfFlags::DELTA_TRANSMISSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Normal3f, Point3f};

    fn si_with_wi(wi: Vector3f) -> SurfaceInteraction {
        SurfaceInteraction {
            t: 1.0,
            p: Point3f::new(0.0, 0.0, 0.0),
            n: Normal3f::new(0.0, 0.0, 1.0),
            uv: crate::core::geometry::Point2f::new(0.0, 0.0),
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
    fn eval_and_pdf_are_zero_for_a_delta_bsdf() {
        // spec §8 invariant: a pure-delta lobe must report pdf()==0 and
        // eval()==0 so MIS never tries to weight against it by density.
        let bsdf = SmoothDielectricBsdf::new(1.5, 1.0);
        let si = si_with_wi(Vector3f::new(0.0, 0.0, 1.0));
        let ctx = BsdfContext::new(TransportMode::Radiance);
        assert_eq!(bsdf.pdf(&ctx, &si, Vector3f::new(0.0, 0.0, 1.0)), 0.0);
        assert!(bsdf.eval(&ctx, &si, Vector3f::new(0.0, 0.0, 1.0)).is_black());
    }

    #[test]
    fn normal_incidence_splits_energy_by_fresnel_reflectance() {
        let bsdf = SmoothDielectricBsdf::new(1.5, 1.0);
        let si = si_with_wi(Vector3f::new(0.0, 0.0, 1.0));
        let ctx = BsdfContext::new(TransportMode::Radiance);
        let mut reflect_count = 0;
        let trials = 2000;
        for i in 0..trials {
            let u = (i as Float + 0.5) / trials as Float;
            let (bs, _w) = bsdf.sample(&ctx, &si, 0.5, crate::core::geometry::Point2f::new(u, 0.5));
            if bs.sampled_type == BsdfFlags::DELTA_REFLECTION {
                reflect_count += 1;
            }
        }
        let r0 = ((1.5 - 1.0) / (1.5 + 1.0)).powi(2);
        let frac = reflect_count as Float / trials as Float;
        assert!((frac - r0).abs() < 0.05);
    }
}
