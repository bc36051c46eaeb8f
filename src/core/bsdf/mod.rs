//! BSDF contract (spec §4.7), grounded on `include/aspirin/bsdf.h` in
//! `examples/original_source/`: flag bitset, sampling context, sample
//! record, and the `Bsdf` trait itself. Concrete lobes live one per file
//! beside this module.

pub mod conductor;
pub mod dielectric;
pub mod diffuse;
pub mod rough_dielectric;

use crate::core::float::Float;
use crate::core::geometry::{Point2f, Vector3f};
use crate::core::interaction::SurfaceInteraction;
use crate::core::spectrum::Spectrum;

bitflags::bitflags! {
    /// Mirrors `BSDFFlags` in `include/aspirin/bsdf.h`; combined masks
    /// (`Reflection`, `Diffuse`, `Smooth`, `All`, ...) are unions of the
    /// primitive bits below, same as the teacher's `constexpr operator|`
    /// chains.
    pub struct BsdfFlags: u32 {
        const NONE = 0;
        const NULL = 1 << 0;
        const DIFFUSE_REFLECTION = 1 << 1;
        const DIFFUSE_TRANSMISSION = 1 << 2;
        const GLOSSY_REFLECTION = 1 << 3;
        const GLOSSY_TRANSMISSION = 1 << 4;
        const DELTA_REFLECTION = 1 << 5;
        const DELTA_TRANSMISSION = 1 << 6;
        const NEEDS_DIFFERENTIALS = 1 << 17;

        const REFLECTION = Self::DIFFUSE_REFLECTION.bits | Self::GLOSSY_REFLECTION.bits | Self::DELTA_REFLECTION.bits;
        const TRANSMISSION = Self::DIFFUSE_TRANSMISSION.bits | Self::GLOSSY_TRANSMISSION.bits | Self::DELTA_TRANSMISSION.bits;
        const DIFFUSE = Self::DIFFUSE_REFLECTION.bits | Self::DIFFUSE_TRANSMISSION.bits;
        const GLOSSY = Self::GLOSSY_REFLECTION.bits | Self::GLOSSY_TRANSMISSION.bits;
        const DELTA = Self::NULL.bits | Self::DELTA_REFLECTION.bits | Self::DELTA_TRANSMISSION.bits;
        const SMOOTH = Self::DIFFUSE.bits | Self::GLOSSY.bits;
        const ALL = Self::SMOOTH.bits | Self::DELTA.bits;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

/// Restricts which BSDF lobes `sample`/`eval`/`pdf` consider, per spec §4.7
/// (e.g. excluding the specular lobe when computing MIS weight against a
/// light sample, since delta lobes can never be hit by next-event
/// estimation).
#[derive(Debug, Clone, Copy)]
pub struct BsdfContext {
    pub mode: TransportMode,
    pub type_mask: BsdfFlags,
    pub component: Option<u32>,
}

impl BsdfContext {
    pub fn new(mode: TransportMode) -> Self {
        BsdfContext {
            mode,
            type_mask: BsdfFlags::ALL,
            component: None,
        }
    }

    pub fn is_enabled(&self, flag: BsdfFlags, component: u32) -> bool {
        let type_ok = self.type_mask == BsdfFlags::ALL || (self.type_mask & flag) == flag;
        let component_ok = self.component.map_or(true, |c| c == component);
        type_ok && component_ok
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    pub wo: Vector3f,
    pub pdf: Float,
    pub eta: Float,
    pub sampled_type: BsdfFlags,
    pub sampled_component: u32,
}

impl BsdfSample {
    pub fn invalid() -> Self {
        BsdfSample {
            wo: Vector3f::new(0.0, 0.0, 0.0),
            pdf: 0.0,
            eta: 1.0,
            sampled_type: BsdfFlags::NONE,
            sampled_component: u32::MAX,
        }
    }

    /// True when this sample came from anything other than a pure
    /// medium-transition (null) lobe (spec §7 "scattered" flag decision:
    /// a null-interface crossing alone does not count as scattering).
    pub fn is_scattering_event(&self) -> bool {
        self.sampled_type != BsdfFlags::NULL && self.sampled_type != BsdfFlags::NONE
    }
}

/// Surface scattering distribution contract, spec §4.7: `sample`/`eval`
/// return throughput already divided by pdf and multiplied by `|cos
/// theta_o|` respectively, matching the teacher's `std::pair<BSDFSample,
/// Spectrum>` convention so the path integrator never has to special-case
/// the cosine term.
pub trait Bsdf: Send + Sync {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        sample1: Float,
        sample2: Point2f,
    ) -> (BsdfSample, Spectrum);

    fn eval(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Spectrum;

    fn pdf(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Float;

    fn flags(&self) -> BsdfFlags;

    fn needs_differentials(&self) -> bool {
        self.flags().contains(BsdfFlags::NEEDS_DIFFERENTIALS)
    }
}

/// Wraps a one-sided BSDF so it behaves identically when hit from either
/// side of the surface, flipping `wi`/`wo` into the hemisphere the
/// underlying lobe was authored against. Most production renderers need
/// this for single-sided materials placed on open (non-manifold) geometry;
/// supplemented from the general two-sided-wrapper idiom common across the
/// example pack's BSDF stacks, since `aspirin`'s lobes assume `cos_theta_i
/// > 0` without an explicit wrapper type.
pub struct TwoSided {
    inner: Box<dyn Bsdf>,
}

impl TwoSided {
    /// Spec §4.7: "It refuses to wrap a BSDF with any Transmission
    /// component" — a two-sided wrapper only makes sense for BSDFs that
    /// never let light pass through, since flipping `wi`/`wo` on the back
    /// side would otherwise double up which side is "inside".
    pub fn new(inner: Box<dyn Bsdf>) -> Result<Self, crate::error::ConfigError> {
        if inner.flags().intersects(BsdfFlags::TRANSMISSION) {
            return Err(crate::error::ConfigError::IncompatibleNesting {
                outer: "twosided",
                reason: "inner BSDF has a transmission component".to_string(),
            });
        }
        Ok(TwoSided { inner })
    }

    fn flip(si: &SurfaceInteraction) -> SurfaceInteraction {
        SurfaceInteraction {
            t: si.t,
            p: si.p,
            n: -si.n,
            uv: si.uv,
            sh_frame: crate::core::geometry::Frame {
                s: si.sh_frame.s,
                t: si.sh_frame.t,
                n: -si.sh_frame.n,
            },
            wi: Vector3f::new(si.wi.x, si.wi.y, -si.wi.z),
            prim_index: si.prim_index,
            bsdf: None,
            emitter: None,
            interior_medium: None,
            exterior_medium: None,
        }
    }
}

impl Bsdf for TwoSided {
    fn sample(
        &self,
        ctx: &BsdfContext,
        si: &SurfaceInteraction,
        sample1: Float,
        sample2: Point2f,
    ) -> (BsdfSample, Spectrum) {
        if si.wi.z >= 0.0 {
            self.inner.sample(ctx, si, sample1, sample2)
        } else {
            let flipped = Self::flip(si);
            let (mut bs, spec) = self.inner.sample(ctx, &flipped, sample1, sample2);
            bs.wo = Vector3f::new(bs.wo.x, bs.wo.y, -bs.wo.z);
            (bs, spec)
        }
    }

    fn eval(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Spectrum {
        if si.wi.z >= 0.0 {
            self.inner.eval(ctx, si, wo)
        } else {
            let flipped = Self::flip(si);
            self.inner.eval(ctx, &flipped, Vector3f::new(wo.x, wo.y, -wo.z))
        }
    }

    fn pdf(&self, ctx: &BsdfContext, si: &SurfaceInteraction, wo: Vector3f) -> Float {
        if si.wi.z >= 0.0 {
            self.inner.pdf(ctx, si, wo)
        } else {
            let flipped = Self::flip(si);
            self.inner.pdf(ctx, &flipped, Vector3f::new(wo.x, wo.y, -wo.z))
        }
    }

    fn flags(&self) -> BsdfFlags {
        self.inner.flags()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bsdf::diffuse::DiffuseBsdf;
    use crate::core::bsdf::dielectric::SmoothDielectricBsdf;
    use crate::core::texture::ConstantTexture;
    use crate::core::spectrum::Spectrum;

    #[test]
    fn two_sided_accepts_a_reflection_only_bsdf() {
        let diffuse = Box::new(DiffuseBsdf::new(Box::new(ConstantTexture::new(Spectrum::new(0.5, 0.5, 0.5)))));
        assert!(TwoSided::new(diffuse).is_ok());
    }

    #[test]
    fn two_sided_refuses_a_transmissive_bsdf() {
        let dielectric = Box::new(SmoothDielectricBsdf::new(1.5, 1.0));
        let err = TwoSided::new(dielectric).unwrap_err();
        assert!(matches!(err, crate::error::ConfigError::IncompatibleNesting { .. }));
    }
}
