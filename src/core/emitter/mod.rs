//! Emitter contract, grounded on `include/misaki/render/emitter.h` in
//! `examples/original_source/`: flag bitset plus the `sample_direct`/
//! `pdf_direct`/`eval` triad every direct-illumination estimator drives.

pub mod area;
pub mod environment;

use crate::core::float::Float;
use crate::core::geometry::{Point2f, Ray};
use crate::core::interaction::{DirectIllumSample, SurfaceInteraction};
use crate::core::spectrum::Spectrum;

bitflags::bitflags! {
    /// Mirrors `EmitterFlags` in `include/misaki/render/emitter.h`.
    pub struct EmitterFlags: u32 {
        const NONE = 0;
        const DELTA_POSITION = 1 << 0;
        const DELTA_DIRECTION = 1 << 1;
        const INFINITE = 1 << 2;
        const SURFACE = 1 << 3;
        const DELTA = Self::DELTA_POSITION.bits | Self::DELTA_DIRECTION.bits;
    }
}

/// Light-emitting contract (spec §4.12), implemented by area lights
/// attached to a shape and by infinite/environment lights.
pub trait Emitter: Send + Sync {
    /// Sample a direction toward this emitter from a reference point,
    /// returning the sample record and `Le / pdf` (already divided).
    fn sample_direct(&self, reference_p: crate::core::geometry::Point3f, sample: Point2f) -> (DirectIllumSample, Spectrum);

    fn pdf_direct(&self, reference_p: crate::core::geometry::Point3f, ds: &DirectIllumSample) -> Float;

    /// Radiance emitted toward `si.wi` as seen from a ray that hit this
    /// emitter's surface directly (spec §4.12 "Le on hit").
    fn eval(&self, si: &SurfaceInteraction) -> Spectrum;

    /// Forward emission (spec §4.10): sample a ray leaving this emitter and
    /// the `Le / (pdf_pos * pdf_dir)` weight carried along it. Neither
    /// reference integrator (§4.15, §4.16) is bidirectional, so this is
    /// exercised only by light-tracing-style callers outside this crate's
    /// scope; it is still part of the contract every `Emitter` publishes.
    fn sample_ray(&self, sample_pos: Point2f, sample_dir: Point2f) -> (Ray, Spectrum);

    fn flags(&self) -> EmitterFlags;

    /// True for a light with no surface representation that a camera ray
    /// can still escape into (spec §4.12 "environment/infinite light"):
    /// marked `Infinite` but not a delta light.
    fn is_environment(&self) -> bool {
        self.flags().contains(EmitterFlags::INFINITE) && !self.flags().intersects(EmitterFlags::DELTA)
    }
}
