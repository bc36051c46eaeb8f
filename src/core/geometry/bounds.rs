//! Axis-aligned bounding box and bounding sphere (spec §3).

use crate::core::float::Float;
use crate::core::geometry::vector::{Point3f, Vector3f};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3f {
    pub min: Point3f,
    pub max: Point3f,
}

impl Bounds3f {
    pub fn empty() -> Self {
        Bounds3f {
            min: Point3f::new(Float::INFINITY, Float::INFINITY, Float::INFINITY),
            max: Point3f::new(Float::NEG_INFINITY, Float::NEG_INFINITY, Float::NEG_INFINITY),
        }
    }

    pub fn from_points(a: Point3f, b: Point3f) -> Self {
        Bounds3f {
            min: Point3f::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3f::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn union_point(&self, p: Point3f) -> Self {
        Bounds3f {
            min: Point3f::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3f::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn union(&self, other: &Bounds3f) -> Self {
        self.union_point(other.min).union_point(other.max)
    }

    pub fn centroid(&self) -> Point3f {
        Point3f::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn diagonal(&self) -> Vector3f {
        self.max - self.min
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        let center = self.centroid();
        let radius = crate::core::geometry::vector::length3(self.max - center);
        BoundingSphere { center, radius }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3f,
    pub radius: Float,
}

impl BoundingSphere {
    /// Radius padded by `(1 + eps)` so rays spawned from the scene's virtual
    /// support (environment emitters, spec §3 "BoundingBox / BoundingSphere")
    /// never self-intersect the sphere they were spawned from.
    pub fn padded_radius(&self) -> Float {
        self.radius * (1.0 + 1e-3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_grows_to_contain_both() {
        let a = Bounds3f::from_points(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        let b = Bounds3f::from_points(Point3f::new(-1.0, 2.0, 0.5), Point3f::new(0.5, 3.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Point3f::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Point3f::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn bounding_sphere_contains_corners() {
        let b = Bounds3f::from_points(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let s = b.bounding_sphere();
        assert!((s.radius - (3.0_f32).sqrt()).abs() < 1e-5);
    }
}
