//! Acceleration-structure interface (spec §4.13): opaque to the
//! integrator, contract only. No BVH/Embree-style structure is in scope
//! (spec.md's non-goals); `LinearAccel` is the reference implementation, a
//! brute-force scan standing in for whatever spatial structure a production
//! build would plug in behind the same trait.

use std::sync::Arc;

use crate::core::geometry::{Bounds3f, Ray};
use crate::core::interaction::PreliminaryIntersection;
use crate::core::shape::Shape;

/// A closest/any-hit query surface over the scene's shape list. The shape
/// index returned alongside a hit indexes into whatever list the caller
/// built the accelerator from; the primitive index on the
/// `PreliminaryIntersection` indexes within that shape (e.g. a mesh's
/// triangle list).
pub trait Accel: Send + Sync {
    fn closest_hit(&self, ray: &Ray) -> Option<(usize, PreliminaryIntersection)>;

    fn any_hit(&self, ray: &Ray) -> bool;

    fn bbox(&self) -> Bounds3f;
}

/// Brute-force linear scan over every shape's primitives. Ordering among
/// equidistant hits is immaterial (spec §4.13); this implementation always
/// returns the closest by `t`, and identical rays always revisit the same
/// primitives in the same order, so repeated queries are identical.
pub struct LinearAccel {
    shapes: Vec<Arc<dyn Shape>>,
    bbox: Bounds3f,
}

impl LinearAccel {
    pub fn new(shapes: Vec<Arc<dyn Shape>>) -> Self {
        let mut bbox = Bounds3f::empty();
        for s in &shapes {
            bbox = bbox.union(&s.bbox());
        }
        LinearAccel { shapes, bbox }
    }

    pub fn shapes(&self) -> &[Arc<dyn Shape>] {
        &self.shapes
    }
}

impl Accel for LinearAccel {
    fn closest_hit(&self, ray: &Ray) -> Option<(usize, PreliminaryIntersection)> {
        let mut best: Option<(usize, PreliminaryIntersection)> = None;
        let mut narrowed = *ray;
        for (shape_idx, shape) in self.shapes.iter().enumerate() {
            for prim_index in 0..shape.primitive_count() as u32 {
                if let Some(pi) = shape.intersect_primitive(&narrowed, prim_index) {
                    narrowed.maxt = pi.t;
                    best = Some((shape_idx, pi));
                }
            }
        }
        best
    }

    fn any_hit(&self, ray: &Ray) -> bool {
        for shape in &self.shapes {
            for prim_index in 0..shape.primitive_count() as u32 {
                if shape.intersect_primitive(ray, prim_index).is_some() {
                    return true;
                }
            }
        }
        false
    }

    fn bbox(&self) -> Bounds3f {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::float::Float;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::core::shape::mesh::Mesh;

    fn unit_quad() -> Mesh {
        Mesh::new(
            vec![
                Point3f::new(-1.0, -1.0, 0.0),
                Point3f::new(1.0, -1.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(-1.0, 1.0, 0.0),
            ],
            vec![],
            vec![],
            vec![[0, 1, 2], [0, 2, 3]],
            None,
        )
    }

    #[test]
    fn closest_hit_finds_quad() {
        let accel = LinearAccel::new(vec![Arc::new(unit_quad())]);
        let ray = Ray::with_range(
            Point3f::new(0.0, 0.0, -5.0),
            Vector3f::new(0.0, 0.0, 1.0),
            0.0,
            Float::INFINITY,
        );
        let hit = accel.closest_hit(&ray);
        assert!(hit.is_some());
        assert!((hit.unwrap().1.t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn any_hit_misses_outside_quad() {
        let accel = LinearAccel::new(vec![Arc::new(unit_quad())]);
        let ray = Ray::with_range(Point3f::new(5.0, 5.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), 0.0, 1000.0);
        assert!(!accel.any_hit(&ray));
    }
}
