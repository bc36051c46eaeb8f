//! Area light, grounded on `src/libaspirin/emitters/area.cpp` in
//! `examples/original_source/`: radiance texture over an attached shape,
//! one-sided (emits only where `cos_theta(wi) > 0` in its own shading
//! frame).

use std::sync::Arc;

use crate::core::emitter::{Emitter, EmitterFlags};
use crate::core::float::Float;
use crate::core::geometry::{Frame, Normal3f, Point2f, Point3f};
use crate::core::interaction::{DirectIllumSample, SurfaceInteraction};
use crate::core::shape::Shape;
use crate::core::spectrum::Spectrum;
use crate::core::texture::Texture;

pub struct AreaLight {
    pub shape: Arc<dyn Shape>,
    pub radiance: Box<dyn Texture>,
}

impl AreaLight {
    pub fn new(shape: Arc<dyn Shape>, radiance: Box<dyn Texture>) -> Self {
        AreaLight { shape, radiance }
    }

    fn si_at(p: Point3f, n: Normal3f, uv: Point2f, wi: crate::core::geometry::Vector3f) -> SurfaceInteraction {
        let sh_frame = Frame::new(n);
        SurfaceInteraction {
            t: 0.0,
            p,
            n,
            uv,
            wi: sh_frame.to_local(wi),
            sh_frame,
            prim_index: 0,
            bsdf: None,
            emitter: None,
            interior_medium: None,
            exterior_medium: None,
        }
    }
}

impl Emitter for AreaLight {
    fn sample_direct(&self, reference_p: Point3f, sample: Point2f) -> (DirectIllumSample, Spectrum) {
        let ds = self.shape.sample_direct(reference_p, sample);
        if ds.pdf == 0.0 {
            return (ds, Spectrum::black());
        }
        // Emitted only from the front face: reject samples where the light
        // surface's normal does not face the reference point.
        if crate::core::geometry::nrm_dot_vec3(ds.n, -ds.d) <= 0.0 {
            let mut rejected = ds;
            rejected.pdf = 0.0;
            return (rejected, Spectrum::black());
        }
        let si = Self::si_at(ds.p, ds.n, Point2f::new(0.0, 0.0), -ds.d);
        let value = self.radiance.eval_3(&si) / ds.pdf;
        (ds, value)
    }

    fn pdf_direct(&self, reference_p: Point3f, ds: &DirectIllumSample) -> Float {
        self.shape.pdf_direct(reference_p, ds)
    }

    fn eval(&self, si: &SurfaceInteraction) -> Spectrum {
        if Frame::cos_theta(si.wi) > 0.0 {
            self.radiance.eval_3(si)
        } else {
            Spectrum::black()
        }
    }

    /// Sample a point on the shape (area measure) and a cosine-weighted
    /// direction above its normal (solid-angle measure). The `cos theta`
    /// factors in `Le * cos / pdf` cancel against the cosine-hemisphere
    /// pdf, leaving `Le * pi / pdf_pos` as the carried weight.
    fn sample_ray(&self, sample_pos: Point2f, sample_dir: Point2f) -> (crate::core::geometry::Ray, Spectrum) {
        let ps = self.shape.sample_position(sample_pos);
        if ps.pdf <= 0.0 {
            return (
                crate::core::geometry::Ray::new(ps.p, crate::core::geometry::Vector3f::new(0.0, 0.0, 1.0)),
                Spectrum::black(),
            );
        }
        let frame = Frame::new(ps.n);
        let local_dir = crate::core::sampling::cosine_sample_hemisphere(sample_dir);
        let world_dir = frame.to_world(local_dir);
        let si = Self::si_at(ps.p, ps.n, ps.uv, world_dir);
        let le = self.radiance.eval_3(&si);
        let ray = crate::core::geometry::Ray::spawn(ps.p, world_dir);
        (ray, le * (crate::core::float::PI / ps.pdf))
    }

    fn flags(&self) -> EmitterFlags {
        EmitterFlags::SURFACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Normal3f;
    use crate::core::interaction::{PositionSample, PreliminaryIntersection};
    use crate::core::texture::ConstantTexture;

    struct SingleQuad {
        center: Point3f,
        normal: Normal3f,
        area: Float,
    }

    impl Shape for SingleQuad {
        fn sample_position(&self, _sample: Point2f) -> PositionSample {
            PositionSample {
                p: self.center,
                n: self.normal,
                uv: Point2f::new(0.0, 0.0),
                pdf: 1.0 / self.area,
                delta: false,
            }
        }
        fn pdf_position(&self, _ps: &PositionSample) -> Float {
            1.0 / self.area
        }
        fn compute_surface_interaction(
            &self,
            _ray: &crate::core::geometry::Ray,
            _pi: &PreliminaryIntersection,
        ) -> SurfaceInteraction {
            SurfaceInteraction::invalid()
        }
        fn bbox(&self) -> crate::core::geometry::Bounds3f {
            crate::core::geometry::Bounds3f::empty()
        }
        fn surface_area(&self) -> Float {
            self.area
        }
        fn intersect_primitive(
            &self,
            _ray: &crate::core::geometry::Ray,
            _prim_index: u32,
        ) -> Option<PreliminaryIntersection> {
            None
        }
    }

    #[test]
    fn facing_reference_point_receives_nonzero_radiance() {
        let shape = Arc::new(SingleQuad {
            center: Point3f::new(0.0, 0.0, 1.0),
            normal: Normal3f::new(0.0, 0.0, -1.0),
            area: 1.0,
        });
        let light = AreaLight::new(shape, Box::new(ConstantTexture::scalar(2.0)));
        let (ds, weight) = light.sample_direct(Point3f::new(0.0, 0.0, 0.0), Point2f::new(0.3, 0.3));
        assert!(ds.pdf > 0.0);
        assert!(weight.r > 0.0);
    }

    #[test]
    fn back_facing_reference_point_is_rejected() {
        let shape = Arc::new(SingleQuad {
            center: Point3f::new(0.0, 0.0, 1.0),
            normal: Normal3f::new(0.0, 0.0, 1.0),
            area: 1.0,
        });
        let light = AreaLight::new(shape, Box::new(ConstantTexture::scalar(2.0)));
        let (ds, weight) = light.sample_direct(Point3f::new(0.0, 0.0, 0.0), Point2f::new(0.3, 0.3));
        assert_eq!(ds.pdf, 0.0);
        assert!(weight.is_black());
    }
}
