//! Camera/sensor contract (spec §4.4 "Sensor"), grounded on
//! `include/aspirin/sensor.h` and `src/libaspirin/sensors/perspective.cpp`
//! in `examples/original_source/`: a film-space sample maps to a world-space
//! ray through a `camera_to_sample` projective transform chain.

use crate::core::float::Float;
use crate::core::geometry::{Point2f, Ray, RayDifferential, Transform, Vector3f};
use crate::core::spectrum::Spectrum;

/// A camera generates rays from film samples, weighted by `We` (here always
/// a constant importance of 1, since this crate carries no camera
/// vignetting or lens response model).
pub trait Sensor: Send + Sync {
    fn film_size(&self) -> (i32, i32);

    /// `pos_sample` is a film-space sample in `[0, size)` pixel units;
    /// `lens_sample` is reserved for a thin-lens model (unused by the
    /// pinhole/perspective camera this crate implements).
    fn sample_ray(&self, pos_sample: Point2f, lens_sample: Point2f) -> (Ray, Spectrum);

    fn near_clip(&self) -> Float;
    fn far_clip(&self) -> Float;

    /// Ray differential matching `sample_ray` on the principal ray, with
    /// auxiliary rays offset by one pixel in each image axis (spec §4.12).
    fn sample_ray_differential(&self, pos_sample: Point2f, lens_sample: Point2f) -> (RayDifferential, Spectrum) {
        let (ray, weight) = self.sample_ray(pos_sample, lens_sample);
        let (rx, _) = self.sample_ray(Point2f::new(pos_sample.x + 1.0, pos_sample.y), lens_sample);
        let (ry, _) = self.sample_ray(Point2f::new(pos_sample.x, pos_sample.y + 1.0), lens_sample);
        let mut rd = RayDifferential::new(ray);
        rd.rx_origin = rx.o;
        rd.rx_direction = rx.d;
        rd.ry_origin = ry.o;
        rd.ry_direction = ry.d;
        rd.has_differentials = true;
        (rd, weight)
    }
}

/// Pinhole perspective camera (spec §4.4), grounded on
/// `PerspectiveCamera::sample_ray` in `perspective.cpp`: unproject the film
/// sample through `sample_to_camera`, normalize to get the ray direction,
/// then carry it into world space by `world_transform`.
pub struct PerspectiveCamera {
    world_transform: Transform,
    sample_to_camera: Transform,
    resolution: (i32, i32),
    near_clip: Float,
    far_clip: Float,
}

impl PerspectiveCamera {
    /// `fov_degrees` is the field of view along the shorter image axis, per
    /// `perspective.cpp`'s aspect-correcting scale applied after the raw
    /// perspective projection.
    pub fn new(
        world_transform: Transform,
        resolution: (i32, i32),
        fov_degrees: Float,
        near_clip: Float,
        far_clip: Float,
    ) -> Self {
        let (w, h) = resolution;
        let aspect = w as Float / h as Float;

        // Matches `m_camera_to_sample` in `perspective.cpp` exactly: project,
        // then remap NDC [-1, 1] to [0, 1] (flipping y), then scale up to
        // raster pixel units.
        let camera_to_sample = Transform::perspective(fov_degrees, near_clip, far_clip)
            .then(&Transform::translate(Vector3f::new(-1.0, -1.0 / aspect, 0.0)))
            .then(&Transform::scale(Vector3f::new(-0.5, -0.5 * aspect, 1.0)))
            .then(&Transform::scale(Vector3f::new(w as Float, h as Float, 1.0)));

        PerspectiveCamera {
            world_transform,
            sample_to_camera: camera_to_sample.inverse(),
            resolution,
            near_clip,
            far_clip,
        }
    }
}

impl Sensor for PerspectiveCamera {
    fn film_size(&self) -> (i32, i32) {
        self.resolution
    }

    fn sample_ray(&self, pos_sample: Point2f, _lens_sample: Point2f) -> (Ray, Spectrum) {
        let film_p = crate::core::geometry::Point3f::new(pos_sample.x, pos_sample.y, 0.0);
        let near_p = self.sample_to_camera.transform_point(film_p);
        let d = crate::core::geometry::normalize3(Vector3f::new(near_p.x, near_p.y, near_p.z));

        let mut ray = Ray::new(crate::core::geometry::Point3f::new(0.0, 0.0, 0.0), d);
        ray.mint = self.near_clip / d.z;
        ray.maxt = self.far_clip / d.z;

        let ray = self.world_transform.transform_ray(&ray);
        (ray, Spectrum::one())
    }

    fn near_clip(&self) -> Float {
        self.near_clip
    }

    fn far_clip(&self) -> Float {
        self.far_clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Point3f;

    fn center_camera(w: i32, h: i32) -> PerspectiveCamera {
        PerspectiveCamera::new(Transform::identity(), (w, h), 60.0, 1e-2, 1000.0)
    }

    #[test]
    fn image_center_ray_points_down_forward_axis() {
        let cam = center_camera(400, 300);
        let (ray, _) = cam.sample_ray(Point2f::new(200.0, 150.0), Point2f::new(0.0, 0.0));
        assert!(ray.d.x.abs() < 1e-3);
        assert!(ray.d.y.abs() < 1e-3);
        assert!(ray.d.z > 0.9);
    }

    #[test]
    fn ray_origin_follows_world_transform() {
        let xform = Transform::translate(Vector3f::new(0.0, 0.0, 5.0));
        let cam = PerspectiveCamera::new(xform, (400, 300), 60.0, 1e-2, 1000.0);
        let (ray, _) = cam.sample_ray(Point2f::new(200.0, 150.0), Point2f::new(0.0, 0.0));
        assert!(crate::core::geometry::length3(ray.o - Point3f::new(0.0, 0.0, 5.0)) < 1e-4);
    }

    #[test]
    fn clip_planes_propagate_into_ray_range() {
        let cam = center_camera(100, 100);
        let (ray, _) = cam.sample_ray(Point2f::new(50.0, 50.0), Point2f::new(0.0, 0.0));
        assert!(ray.mint > 0.0);
        assert!(ray.maxt > ray.mint);
    }

    #[test]
    fn corner_rays_diverge_from_center_ray() {
        let cam = center_camera(400, 300);
        let (center, _) = cam.sample_ray(Point2f::new(200.0, 150.0), Point2f::new(0.0, 0.0));
        let (corner, _) = cam.sample_ray(Point2f::new(0.0, 0.0), Point2f::new(0.0, 0.0));
        assert!(crate::core::geometry::length3(center.d - corner.d) > 1e-3);
    }

    #[test]
    fn ray_differential_matches_principal_ray() {
        let cam = center_camera(400, 300);
        let (rd, _) = cam.sample_ray_differential(Point2f::new(200.0, 150.0), Point2f::new(0.0, 0.0));
        let (ray, _) = cam.sample_ray(Point2f::new(200.0, 150.0), Point2f::new(0.0, 0.0));
        assert_eq!(rd.ray.d, ray.d);
        assert!(rd.has_differentials);
        assert_ne!(rd.rx_direction, rd.ray.d);
    }
}
