//! Environment/infinite light over an equirectangular radiance map,
//! grounded on `src/libaspirin/lights/envmap.cpp` in
//! `examples/original_source/`: luminance-weighted importance sampling via
//! a `Distribution2D`, with the `sin(theta)` Jacobian correction for the
//! spherical parameterization.

use crate::core::emitter::{Emitter, EmitterFlags};
use crate::core::float::{Float, PI};
use crate::core::geometry::{BoundingSphere, Bounds3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::interaction::{DirectIllumSample, SurfaceInteraction};
use crate::core::sampling::Distribution2D;
use crate::core::spectrum::Spectrum;

/// In-memory equirectangular radiance map (`width x height` row-major,
/// `v=0` at the north pole), standing in for the image-codec-backed bitmap
/// the original loads from disk — loading PNG/EXR is out of scope per
/// spec.md's non-goals.
pub struct EnvironmentLight {
    pixels: Vec<Spectrum>,
    width: usize,
    height: usize,
    dist: Distribution2D,
    bsphere: BoundingSphere,
}

impl EnvironmentLight {
    pub fn new(pixels: Vec<Spectrum>, width: usize, height: usize) -> Self {
        assert_eq!(pixels.len(), width * height);
        let mut luminance = Vec::with_capacity(pixels.len());
        for (i, p) in pixels.iter().enumerate() {
            let row = i / width;
            let sin_theta = (PI * (row as Float + 0.5) / height as Float).sin();
            luminance.push(p.luminance() * sin_theta);
        }
        EnvironmentLight {
            dist: Distribution2D::new(luminance, width, height),
            pixels,
            width,
            height,
            bsphere: BoundingSphere {
                center: Point3f::new(0.0, 0.0, 0.0),
                radius: 1.0,
            },
        }
    }

    /// Recomputes the light's world-space bounding sphere from the scene's
    /// bbox (`Emitter::set_scene` in the original), since an infinite light
    /// needs a finite radius to spawn a ray toward.
    pub fn fit_to_scene(&mut self, scene_bbox: Bounds3f) {
        let sphere = scene_bbox.bounding_sphere();
        self.bsphere = BoundingSphere {
            center: sphere.center,
            radius: sphere.padded_radius(),
        };
    }

    fn sample_bitmap(&self, uv: Point2f) -> Spectrum {
        let x = ((uv.x * self.width as Float) as usize).min(self.width - 1);
        let y = ((uv.y * self.height as Float) as usize).min(self.height - 1);
        self.pixels[y * self.width + x]
    }

    fn dir_to_uv(d: Vector3f) -> Point2f {
        let u = d.x.atan2(-d.z) * (0.5 / PI) + 0.5;
        let v = crate::core::float::clamp(d.y, -1.0, 1.0).acos() / PI;
        Point2f::new(u - u.floor(), v)
    }

    fn uv_to_dir(uv: Point2f) -> Vector3f {
        let theta = uv.y * PI;
        let phi = uv.x * 2.0 * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        Vector3f::new(sin_phi * sin_theta, cos_theta, -cos_phi * sin_theta)
    }
}

impl Emitter for EnvironmentLight {
    fn sample_direct(&self, reference_p: Point3f, sample: Point2f) -> (DirectIllumSample, Spectrum) {
        let (uv, map_pdf) = self.dist.sample(sample);
        if map_pdf <= 0.0 {
            return (DirectIllumSample::from_points(reference_p, crate::core::geometry::Normal3f::new(0.0, 0.0, 0.0), reference_p), Spectrum::black());
        }
        let d = Self::uv_to_dir(uv);
        let sin_theta = (1.0 - d.y * d.y).max(0.0).sqrt().max(1e-4);
        let dist = 2.0 * self.bsphere.radius;
        let pdf = map_pdf / (2.0 * PI * PI * sin_theta);

        let mut ds = DirectIllumSample::from_points(reference_p + d * dist, crate::core::geometry::Normal3f::from(-d), reference_p);
        ds.pdf = pdf;
        ds.delta = false;
        let weight = if pdf > 0.0 { self.sample_bitmap(uv) / pdf } else { Spectrum::black() };
        (ds, weight)
    }

    fn pdf_direct(&self, _reference_p: Point3f, ds: &DirectIllumSample) -> Float {
        let uv = Self::dir_to_uv(ds.d);
        let sin_theta = (1.0 - ds.d.y * ds.d.y).max(0.0).sqrt().max(1e-4);
        self.dist.pdf(uv) / (2.0 * PI * PI * sin_theta)
    }

    fn eval(&self, si: &SurfaceInteraction) -> Spectrum {
        let world_dir = si.to_world(-si.wi);
        let uv = Self::dir_to_uv(world_dir);
        self.sample_bitmap(uv)
    }

    /// Importance-sample a direction from the radiance map, then a point
    /// on a disk perpendicular to it that covers the scene's bounding
    /// sphere, so the emitted ray actually starts outside the scene and
    /// travels toward it (standard infinite-light forward-emission
    /// construction). Weight is `Le / (pdf_dir * pdf_disk)`.
    fn sample_ray(&self, sample_pos: Point2f, sample_dir: Point2f) -> (Ray, Spectrum) {
        let (uv, map_pdf) = self.dist.sample(sample_dir);
        if map_pdf <= 0.0 {
            return (Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0)), Spectrum::black());
        }
        let d = Self::uv_to_dir(uv);
        let sin_theta = (1.0 - d.y * d.y).max(0.0).sqrt().max(1e-4);
        let pdf_dir = map_pdf / (2.0 * PI * PI * sin_theta);

        let frame = crate::core::geometry::Frame::new(crate::core::geometry::Normal3f::from(d));
        let disk = crate::core::sampling::square_to_uniform_disk_concentric(sample_pos);
        let radius = self.bsphere.radius;
        let origin = self.bsphere.center - d * radius + (frame.s * disk.x + frame.t * disk.y) * radius;
        let pdf_disk = 1.0 / (PI * radius * radius);

        let le = self.sample_bitmap(uv);
        let pdf = pdf_dir * pdf_disk;
        let weight = if pdf > 0.0 { le / pdf } else { Spectrum::black() };
        (Ray::new(origin, d), weight)
    }

    fn flags(&self) -> EmitterFlags {
        EmitterFlags::INFINITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_env(w: usize, h: usize) -> EnvironmentLight {
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let bright = (x + y) % 2 == 0;
                pixels.push(if bright { Spectrum::splat(5.0) } else { Spectrum::splat(0.1) });
            }
        }
        EnvironmentLight::new(pixels, w, h)
    }

    #[test]
    fn sample_direct_weight_matches_bitmap_over_pdf() {
        let env = checker_env(8, 4);
        let (ds, weight) = env.sample_direct(Point3f::new(0.0, 0.0, 0.0), Point2f::new(0.37, 0.61));
        assert!(ds.pdf > 0.0);
        assert!(weight.r >= 0.0 && weight.r.is_finite());
    }

    #[test]
    fn uv_direction_roundtrip() {
        let uv = Point2f::new(0.3, 0.6);
        let d = EnvironmentLight::uv_to_dir(uv);
        let uv2 = EnvironmentLight::dir_to_uv(d);
        assert!((uv.x - uv2.x).abs() < 1e-4);
        assert!((uv.y - uv2.y).abs() < 1e-4);
    }
}
