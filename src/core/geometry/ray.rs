//! Ray and ray differentials (spec §3 "Ray").

use crate::core::float::{Float, RAY_EPSILON};
use crate::core::geometry::vector::{normalize3, Point3f, Vector3f};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub o: Point3f,
    pub d: Vector3f,
    pub mint: Float,
    pub maxt: Float,
    /// Cached `1/d`, recomputed whenever `d` changes via [`Ray::new`] or
    /// [`Ray::set_direction`].
    pub d_rcp: Vector3f,
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Ray {
            o,
            d,
            mint: RAY_EPSILON,
            maxt: Float::INFINITY,
            d_rcp: Vector3f::new(1.0 / d.x, 1.0 / d.y, 1.0 / d.z),
        }
    }

    pub fn with_range(o: Point3f, d: Vector3f, mint: Float, maxt: Float) -> Self {
        let mut r = Ray::new(o, d);
        r.mint = mint;
        r.maxt = maxt;
        r
    }

    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }

    pub fn set_direction(&mut self, d: Vector3f) {
        self.d = d;
        self.d_rcp = Vector3f::new(1.0 / d.x, 1.0 / d.y, 1.0 / d.z);
    }

    /// Spawn a ray from surface point `p` along `d`, offsetting `mint` per
    /// spec §3: `mint = (1 + max|p|) * RayEpsilon`.
    pub fn spawn(p: Point3f, d: Vector3f) -> Self {
        let max_abs = p.x.abs().max(p.y.abs()).max(p.z.abs());
        let mint = (1.0 + max_abs) * RAY_EPSILON;
        Ray::with_range(p, normalize3(d), mint, Float::INFINITY)
    }
}

/// Auxiliary rays offset by one pixel in image space, carried alongside the
/// primary ray so textures that need screen-space derivatives can compute
/// them (spec §3 "SurfaceInteraction", §9 "Ray differentials").
#[derive(Debug, Clone, Copy)]
pub struct RayDifferential {
    pub ray: Ray,
    pub rx_origin: Point3f,
    pub ry_origin: Point3f,
    pub rx_direction: Vector3f,
    pub ry_direction: Vector3f,
    pub has_differentials: bool,
}

impl RayDifferential {
    pub fn new(ray: Ray) -> Self {
        RayDifferential {
            ray,
            rx_origin: ray.o,
            ry_origin: ray.o,
            rx_direction: ray.d,
            ry_direction: ray.d,
            has_differentials: false,
        }
    }

    /// Scale the auxiliary rays toward the primary ray by `amount` (spec
    /// §9), used to keep texture filter footprints proportional to
    /// samples-per-pixel.
    pub fn scale_differentials(&mut self, amount: Float) {
        self.rx_origin = self.ray.o + (self.rx_origin - self.ray.o) * amount;
        self.ry_origin = self.ray.o + (self.ry_origin - self.ray.o) * amount;
        self.rx_direction = self.ray.d + (self.rx_direction - self.ray.d) * amount;
        self.ry_direction = self.ray.d + (self.ry_direction - self.ray.d) * amount;
    }
}
