//! Scene aggregate (spec §4.14), grounded on `include/aspirin/scene.h` and
//! `src/libaspirin/scene.cpp` in `examples/original_source/`: owns shapes,
//! emitters, sensor, and acceleration structure, and answers every
//! ray/visibility/emitter-sampling query the integrators drive.
//!
//! `sample_attenuated_emitter_direct` follows the placement spec §4.14
//! gives it (a `Scene` method); the original keeps the equivalent
//! `sample_attenuated_emitter`/`evaluate_transmittance` pair inside the
//! volumetric path integrator (`volpath.cpp`) instead, since that is its
//! only caller. The stepping logic is carried over unchanged.

use std::sync::Arc;

use crate::core::accel::{Accel, LinearAccel};
use crate::core::emitter::Emitter;
use crate::core::float::{Float, RAY_EPSILON, SHADOW_EPSILON};
use crate::core::geometry::{Bounds3f, Point2f, Ray};
use crate::core::interaction::{DirectIllumSample, SurfaceInteraction};
use crate::core::medium::Medium;
use crate::core::shape::Shape;
use crate::core::spectrum::Spectrum;

pub struct Scene {
    shapes: Vec<Arc<dyn Shape>>,
    /// Emitter attached to each shape by index (`None` for a non-emissive
    /// shape), parallel to `shapes`.
    shape_emitters: Vec<Option<Arc<dyn Emitter>>>,
    /// Every emitter participating in next-event estimation: every
    /// shape-attached emitter, any standalone emitter, and the environment
    /// (if any) — `scene.cpp:34-41` adds every non-`Surface` emitter to
    /// `m_emitters`, which includes the `Infinite` environment light, so it
    /// stays selectable by `select_emitter`/NEE just like any other light.
    emitters: Vec<Arc<dyn Emitter>>,
    environment: Option<Arc<dyn Emitter>>,
    accel: LinearAccel,
    bbox: Bounds3f,
}

impl Scene {
    pub fn new(
        shapes: Vec<Arc<dyn Shape>>,
        shape_emitters: Vec<Option<Arc<dyn Emitter>>>,
        standalone_emitters: Vec<Arc<dyn Emitter>>,
        environment: Option<Arc<dyn Emitter>>,
    ) -> Self {
        assert_eq!(shapes.len(), shape_emitters.len());
        let mut bbox = Bounds3f::empty();
        for s in &shapes {
            bbox = bbox.union(&s.bbox());
        }
        let mut emitters: Vec<Arc<dyn Emitter>> = shape_emitters.iter().filter_map(|e| e.clone()).collect();
        emitters.extend(standalone_emitters);
        if let Some(env) = &environment {
            emitters.push(env.clone());
        }
        let accel = LinearAccel::new(shapes.clone());
        Scene {
            shapes,
            shape_emitters,
            emitters,
            environment,
            accel,
            bbox,
        }
    }

    pub fn bbox(&self) -> Bounds3f {
        self.bbox
    }

    pub fn environment(&self) -> Option<&Arc<dyn Emitter>> {
        self.environment.as_ref()
    }

    pub fn emitters(&self) -> &[Arc<dyn Emitter>] {
        &self.emitters
    }

    /// Closest-hit query, building the full differential-geometry record
    /// from the accelerator's cheap `PreliminaryIntersection` (spec §4.14).
    /// A miss yields an invalid interaction carrying only `wi`, matching
    /// `ray_intersect`'s Embree-miss branch in `scene.cpp`.
    pub fn ray_intersect(&self, ray: &Ray) -> SurfaceInteraction {
        match self.accel.closest_hit(ray) {
            Some((shape_idx, pi)) => {
                let shape = &self.shapes[shape_idx];
                let mut si = shape.compute_surface_interaction(ray, &pi);
                si.emitter = self.shape_emitters[shape_idx].clone();
                si.interior_medium = shape.interior_medium();
                si.exterior_medium = shape.exterior_medium();
                si
            }
            None => {
                let mut si = SurfaceInteraction::invalid();
                si.wi = -ray.d;
                si
            }
        }
    }

    pub fn ray_test(&self, ray: &Ray) -> bool {
        self.accel.any_hit(ray)
    }

    /// Uniform emitter selection with the remainder-rescaling trick (spec
    /// §4.14): `sample.x` is rescaled so the chosen emitter still sees a
    /// uniform `[0, 1)` value.
    fn select_emitter(&self, sample: Point2f) -> Option<(usize, Point2f, Float)> {
        let n = self.emitters.len();
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some((0, sample, 1.0));
        }
        let inv_n = 1.0 / n as Float;
        let index = ((sample.x * n as Float) as usize).min(n - 1);
        let remapped_x = (sample.x - index as Float * inv_n) * n as Float;
        Some((index, Point2f::new(remapped_x, sample.y), inv_n))
    }

    /// Sample a direction to a uniformly chosen emitter, optionally
    /// shadow-testing the result (spec §4.14), matching
    /// `sample_emitter_direction` in `scene.cpp`.
    pub fn sample_emitter_direct(
        &self,
        reference_p: crate::core::geometry::Point3f,
        sample: Point2f,
        test_visibility: bool,
    ) -> (DirectIllumSample, Spectrum) {
        let (index, remapped, sel_pdf) = match self.select_emitter(sample) {
            Some(v) => v,
            None => {
                return (
                    DirectIllumSample::from_points(
                        reference_p,
                        crate::core::geometry::Normal3f::new(0.0, 0.0, 0.0),
                        reference_p,
                    ),
                    Spectrum::black(),
                );
            }
        };
        let (mut ds, mut spec) = self.emitters[index].sample_direct(reference_p, remapped);
        ds.pdf *= sel_pdf;
        spec *= 1.0 / sel_pdf;

        if test_visibility && ds.pdf != 0.0 {
            let max_abs = reference_p.x.abs().max(reference_p.y.abs()).max(reference_p.z.abs());
            let mint = RAY_EPSILON * (1.0 + max_abs);
            let maxt = ds.dist * (1.0 - SHADOW_EPSILON);
            let shadow_ray = Ray::with_range(reference_p, ds.d, mint, maxt);
            if self.ray_test(&shadow_ray) {
                spec = Spectrum::black();
            }
        }
        (ds, spec)
    }

    /// Pdf of the direct-illumination sample that `sample_emitter_direct`
    /// would have produced, given which emitter it came from (identified
    /// here by reference equality against the stored emitter list, since
    /// `DirectIllumSample` carries no emitter pointer of its own).
    pub fn pdf_emitter_direct(
        &self,
        reference_p: crate::core::geometry::Point3f,
        ds: &DirectIllumSample,
        emitter: &Arc<dyn Emitter>,
    ) -> Float {
        let n = self.emitters.len();
        if n == 0 {
            return 0.0;
        }
        emitter.pdf_direct(reference_p, ds) / n as Float
    }

    /// Like `sample_emitter_direct`, but multiplies through participating
    /// media crossed along the shadow segment instead of doing a binary
    /// visibility test (spec §4.14, grounded on
    /// `sample_attenuated_emitter`/`evaluate_transmittance` in
    /// `volpath.cpp`).
    pub fn sample_attenuated_emitter_direct(
        &self,
        reference_si: &SurfaceInteraction,
        medium: Option<Arc<dyn Medium>>,
        sample: Point2f,
    ) -> (DirectIllumSample, Spectrum) {
        let (index, remapped, sel_pdf) = match self.select_emitter(sample) {
            Some(v) => v,
            None => {
                return (
                    DirectIllumSample::from_points(
                        reference_si.p,
                        crate::core::geometry::Normal3f::new(0.0, 0.0, 0.0),
                        reference_si.p,
                    ),
                    Spectrum::black(),
                );
            }
        };
        let (mut ds, mut spec) = self.emitters[index].sample_direct(reference_si.p, remapped);
        if ds.pdf == 0.0 {
            return (ds, Spectrum::black());
        }
        let medium = if reference_si.is_valid() && reference_si.is_medium_transition() {
            reference_si.target_medium(ds.d)
        } else {
            medium
        };
        let transmittance = self.evaluate_transmittance(reference_si.p, ds.p, medium);
        spec *= transmittance;
        ds.pdf *= sel_pdf;
        (ds, spec)
    }

    /// Transmittance along the segment `from -> to`, stepping through
    /// intersections and multiplying the current medium's
    /// `eval_transmittance` at each medium-transition boundary; returns
    /// zero the moment a BSDF-bearing (opaque) surface is crossed (spec
    /// §4.14 "Attenuated visibility").
    fn evaluate_transmittance(
        &self,
        from: crate::core::geometry::Point3f,
        to: crate::core::geometry::Point3f,
        mut medium: Option<Arc<dyn Medium>>,
    ) -> Spectrum {
        let delta = to - from;
        let mut remaining = crate::core::geometry::length3(delta);
        if remaining <= 0.0 {
            return Spectrum::one();
        }
        let dir = delta / remaining;
        let mut transmittance = Spectrum::one();
        let mut origin = from;

        loop {
            let max_abs = origin.x.abs().max(origin.y.abs()).max(origin.z.abs());
            let mint = RAY_EPSILON * (1.0 + max_abs);
            let ray = Ray::with_range(origin, dir, mint, remaining);
            let si = self.ray_intersect(&ray);

            if let Some(m) = &medium {
                let mut medium_ray = ray;
                medium_ray.mint = 0.0;
                medium_ray.maxt = if si.is_valid() { si.t.min(remaining) } else { remaining };
                transmittance *= m.eval_transmittance(&medium_ray);
            }

            if !si.is_valid() || transmittance.is_black() {
                break;
            }
            if si.bsdf.is_some() {
                return Spectrum::black();
            }

            origin = si.p;
            remaining -= si.t;
            if remaining <= 0.0 {
                break;
            }

            if si.is_medium_transition() {
                medium = si.target_medium(dir);
            }
        }
        transmittance
    }
}
