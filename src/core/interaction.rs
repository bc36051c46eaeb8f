//! Interaction records (spec §3 "SurfaceInteraction", "MediumInteraction",
//! "PositionSample", "DirectionSample/DirectIllumSample"), grounded on
//! `include/aspirin/interaction.h` and `include/aspirin/records.h` in
//! `examples/original_source/`. The C++ hierarchy (`Interaction` base with
//! `t`/`p`/`is_valid`) is flattened here since Rust has no use for the
//! inheritance, but every field it carries survives.

use std::sync::Arc;

use crate::core::float::Float;
use crate::core::geometry::{Frame, Normal3f, Point2f, Point3f, Vector3f};
use crate::core::medium::Medium;
use crate::core::spectrum::Spectrum;

/// A point sampled on a shape's surface, e.g. for emitter area sampling
/// (spec §4.11 "sample_position").
#[derive(Debug, Clone, Copy)]
pub struct PositionSample {
    pub p: Point3f,
    pub n: Normal3f,
    pub uv: Point2f,
    pub pdf: Float,
    pub delta: bool,
}

impl PositionSample {
    pub fn invalid() -> Self {
        PositionSample {
            p: Point3f::new(0.0, 0.0, 0.0),
            n: Normal3f::new(0.0, 0.0, 0.0),
            uv: Point2f::new(0.0, 0.0),
            pdf: 0.0,
            delta: false,
        }
    }
}

/// Result of sampling a direction toward a light from a reference point
/// (spec §3 "DirectIllumSample"), grounded on `DirectSample` in records.h.
/// `pdf == 0.0` is the reserved sentinel meaning "this direction has no
/// competing BSDF pdf to MIS against" (e.g. a delta light), per spec §7.
#[derive(Debug, Clone, Copy)]
pub struct DirectIllumSample {
    pub p: Point3f,
    pub n: Normal3f,
    pub d: Vector3f,
    pub dist: Float,
    pub pdf: Float,
    pub delta: bool,
}

impl DirectIllumSample {
    pub fn from_points(sampled_p: Point3f, sampled_n: Normal3f, reference_p: Point3f) -> Self {
        let delta_p = sampled_p - reference_p;
        let dist = crate::core::geometry::length3(delta_p);
        let d = if dist > 0.0 { delta_p / dist } else { delta_p };
        DirectIllumSample {
            p: sampled_p,
            n: sampled_n,
            d,
            dist,
            pdf: 0.0,
            delta: false,
        }
    }
}

/// A cheap hit record returned by the acceleration structure before the
/// full differential-geometry frame is built (spec §4.14 "closest_hit"),
/// grounded on `PreliminaryIntersection` referenced throughout shape.h.
#[derive(Debug, Clone, Copy)]
pub struct PreliminaryIntersection {
    pub t: Float,
    pub prim_index: u32,
    pub uv: Point2f,
}

impl PreliminaryIntersection {
    pub fn none() -> Self {
        PreliminaryIntersection {
            t: Float::INFINITY,
            prim_index: u32::MAX,
            uv: Point2f::new(0.0, 0.0),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }
}

/// Full surface hit record (spec §3 "SurfaceInteraction"): position,
/// shading frame, incident direction in local space, and the scene objects
/// attached to the hit primitive.
pub struct SurfaceInteraction {
    pub t: Float,
    pub p: Point3f,
    pub n: Normal3f,
    pub uv: Point2f,
    pub sh_frame: Frame,
    /// Incident direction, already rotated into the local shading frame
    /// (`sh_frame.to_local(-ray.d)`), matching the teacher's `si.wi`
    /// convention used by every BSDF's `eval`/`sample`/`pdf`.
    pub wi: Vector3f,
    pub prim_index: u32,
    pub bsdf: Option<Arc<dyn crate::core::bsdf::Bsdf>>,
    pub emitter: Option<Arc<dyn crate::core::emitter::Emitter>>,
    /// Medium on the side of `n` the shading normal points toward, and the
    /// opposite side, matching `Shape::interior_medium`/`exterior_medium`
    /// (spec §4.13 "medium transition").
    pub interior_medium: Option<Arc<dyn Medium>>,
    pub exterior_medium: Option<Arc<dyn Medium>>,
}

impl SurfaceInteraction {
    pub fn invalid() -> Self {
        SurfaceInteraction {
            t: Float::INFINITY,
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
        }
    }

    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }

    pub fn is_medium_transition(&self) -> bool {
        self.interior_medium.is_some() || self.exterior_medium.is_some()
    }

    /// The medium a ray continuing in direction `d` enters, matching
    /// `si.target_medium(d)` in `volpath.cpp`: the exterior medium if `d`
    /// points out of the surface along `n`, the interior medium otherwise.
    pub fn target_medium(&self, d: Vector3f) -> Option<Arc<dyn Medium>> {
        if crate::core::geometry::nrm_dot_vec3(self.n, d) >= 0.0 {
            self.exterior_medium.clone()
        } else {
            self.interior_medium.clone()
        }
    }

    pub fn to_world(&self, v: Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    pub fn to_local(&self, v: Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    /// Offset this point along its geometric normal for spawning a
    /// continuation ray (spec §3 "Ray::spawn" invariant).
    pub fn spawn_ray(&self, d: Vector3f) -> crate::core::geometry::Ray {
        let n = if crate::core::geometry::nrm_dot_vec3(self.n, d) >= 0.0 {
            self.n
        } else {
            -self.n
        };
        crate::core::geometry::Ray::spawn(self.p + Vector3f::from(n) * 1e-4, d)
    }
}

/// A sampled free-flight event inside a participating medium (spec §4.13
/// volumetric variant), grounded on the `MediumInteraction` produced by
/// `HomogeneousMedium::sample_interaction` in
/// `src/libaspirin/media/homogeneous.cpp`.
#[derive(Debug, Clone, Copy)]
pub struct MediumInteraction {
    pub t: Float,
    pub p: Point3f,
    pub wi: Vector3f,
    pub sigma_a: Spectrum,
    pub sigma_s: Spectrum,
    pub transmittance: Spectrum,
}

impl MediumInteraction {
    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }
}
