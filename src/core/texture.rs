//! Texture contract (spec §4.6) and its reference implementations,
//! grounded on `include/aspirin/texture.h`'s `eval_1`/`eval_3`/`mean`
//! trio (referenced throughout the bsdf/emitter `.cpp` files already read,
//! e.g. `m_reflectance->eval_3(si.geom)` in `bsdfs/diffuse.cpp`) plus the
//! scale/mix combinators the teacher's own `textures/mod.rs` lists
//! (`ScaleTexture`, `MixTexture`).

use crate::core::float::Float;
use crate::core::interaction::SurfaceInteraction;
use crate::core::spectrum::Spectrum;

pub trait Texture: Send + Sync {
    fn eval_1(&self, si: &SurfaceInteraction) -> Float;
    fn eval_3(&self, si: &SurfaceInteraction) -> Spectrum;
    /// Cheap scalar summary used by emitters for power estimates and by
    /// importance-sampling setup, without a full surface query.
    fn mean(&self) -> Float;
}

#[derive(Debug, Clone, Copy)]
pub struct ConstantTexture {
    value: Spectrum,
}

impl ConstantTexture {
    pub fn new(value: Spectrum) -> Self {
        ConstantTexture { value }
    }

    pub fn scalar(v: Float) -> Self {
        ConstantTexture {
            value: Spectrum::splat(v),
        }
    }
}

impl Texture for ConstantTexture {
    fn eval_1(&self, _si: &SurfaceInteraction) -> Float {
        self.value.luminance()
    }
    fn eval_3(&self, _si: &SurfaceInteraction) -> Spectrum {
        self.value
    }
    fn mean(&self) -> Float {
        self.value.luminance()
    }
}

/// Alternates between two sub-textures on a world-space UV grid (spec
/// §4.6).
pub struct CheckerboardTexture {
    pub even: Box<dyn Texture>,
    pub odd: Box<dyn Texture>,
    pub scale_u: Float,
    pub scale_v: Float,
}

impl CheckerboardTexture {
    pub fn new(even: Box<dyn Texture>, odd: Box<dyn Texture>, scale_u: Float, scale_v: Float) -> Self {
        CheckerboardTexture {
            even,
            odd,
            scale_u,
            scale_v,
        }
    }

    fn is_even(&self, si: &SurfaceInteraction) -> bool {
        let u = (si.uv.x * self.scale_u).floor() as i64;
        let v = (si.uv.y * self.scale_v).floor() as i64;
        (u + v) % 2 == 0
    }
}

impl Texture for CheckerboardTexture {
    fn eval_1(&self, si: &SurfaceInteraction) -> Float {
        if self.is_even(si) {
            self.even.eval_1(si)
        } else {
            self.odd.eval_1(si)
        }
    }
    fn eval_3(&self, si: &SurfaceInteraction) -> Spectrum {
        if self.is_even(si) {
            self.even.eval_3(si)
        } else {
            self.odd.eval_3(si)
        }
    }
    fn mean(&self) -> Float {
        0.5 * (self.even.mean() + self.odd.mean())
    }
}

/// Constant-factor multiply of another texture (spec §4.6.x).
pub struct ScaleTexture {
    pub base: Box<dyn Texture>,
    pub scale: Float,
}

impl Texture for ScaleTexture {
    fn eval_1(&self, si: &SurfaceInteraction) -> Float {
        self.base.eval_1(si) * self.scale
    }
    fn eval_3(&self, si: &SurfaceInteraction) -> Spectrum {
        self.base.eval_3(si) * self.scale
    }
    fn mean(&self) -> Float {
        self.base.mean() * self.scale
    }
}

/// Lerp between two textures by a third, scalar-valued one (spec §4.6.x),
/// grounded on the teacher's `MixMaterial` blend (`materials/mixmat.rs`).
pub struct MixTexture {
    pub a: Box<dyn Texture>,
    pub b: Box<dyn Texture>,
    pub amount: Box<dyn Texture>,
}

impl Texture for MixTexture {
    fn eval_1(&self, si: &SurfaceInteraction) -> Float {
        let t = self.amount.eval_1(si);
        crate::core::float::lerp(t, self.a.eval_1(si), self.b.eval_1(si))
    }
    fn eval_3(&self, si: &SurfaceInteraction) -> Spectrum {
        let t = self.amount.eval_1(si);
        self.a.eval_3(si) * (1.0 - t) + self.b.eval_3(si) * t
    }
    fn mean(&self) -> Float {
        let t = self.amount.mean();
        crate::core::float::lerp(t, self.a.mean(), self.b.mean())
    }
}
