//! Orthonormal shading frame (spec §3 "Frame"), built from a unit normal by
//! the revised Duff-Burg construction so the basis is branch-free except
//! for the sign of `n.z`. Grounded on `include/aspirin/frame.h` in
//! `examples/original_source/` (same trig helper set, same `to_local`/
//! `to_world` contract), restated in the teacher's `Vector3f`-based idiom.

use crate::core::float::Float;
use crate::core::geometry::vector::{cross3, dot3, normalize3, Normal3f, Vector3f};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub s: Vector3f,
    pub t: Vector3f,
    pub n: Vector3f,
}

impl Frame {
    pub fn new(n: Normal3f) -> Self {
        let n = normalize3(Vector3f::from(n));
        let sign = 1.0_f32.copysign(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;
        let s = Vector3f::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let t = Vector3f::new(b, sign + n.y * n.y * a, -n.y);
        Frame { s, t, n }
    }

    pub fn to_local(&self, v: Vector3f) -> Vector3f {
        Vector3f::new(dot3(v, self.s), dot3(v, self.t), dot3(v, self.n))
    }

    pub fn to_world(&self, v: Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }

    pub fn cos_theta(v: Vector3f) -> Float {
        v.z
    }

    pub fn cos_theta_2(v: Vector3f) -> Float {
        v.z * v.z
    }

    pub fn sin_theta_2(v: Vector3f) -> Float {
        v.x * v.x + v.y * v.y
    }

    pub fn sin_theta(v: Vector3f) -> Float {
        crate::core::float::safe_sqrt(Self::sin_theta_2(v))
    }

    pub fn tan_theta(v: Vector3f) -> Float {
        crate::core::float::safe_sqrt(1.0 - v.z * v.z) / v.z
    }

    pub fn tan_theta_2(v: Vector3f) -> Float {
        (1.0 - v.z * v.z).max(0.0) / (v.z * v.z)
    }

    pub fn sincos_phi(v: Vector3f) -> (Float, Float) {
        let sin_theta_2 = Self::sin_theta_2(v);
        if sin_theta_2.abs() <= 1e-9 {
            return (0.0, 1.0);
        }
        let inv_sin_theta = 1.0 / sin_theta_2.sqrt();
        (
            crate::core::float::clamp(v.y * inv_sin_theta, -1.0, 1.0),
            crate::core::float::clamp(v.x * inv_sin_theta, -1.0, 1.0),
        )
    }

    pub fn sin_phi(v: Vector3f) -> Float {
        Self::sincos_phi(v).0
    }

    pub fn cos_phi(v: Vector3f) -> Float {
        Self::sincos_phi(v).1
    }

    pub fn is_orthonormal(&self) -> bool {
        let unit_len = |v: Vector3f| (dot3(v, v).sqrt() - 1.0).abs() < 1e-4;
        unit_len(self.s)
            && unit_len(self.t)
            && unit_len(self.n)
            && dot3(self.s, self.t).abs() < 1e-4
            && dot3(self.s, self.n).abs() < 1e-4
            && dot3(self.t, self.n).abs() < 1e-4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::vector::normalize3;

    fn check_orthonormal(n: Normal3f) {
        let f = Frame::new(n);
        assert!(f.is_orthonormal(), "frame from {:?} not orthonormal: {:?}", n, f);
        let cross = cross3(f.s, f.t);
        assert!(dot3(cross, f.n) > 0.999, "s x t should equal n (right-handed)");
    }

    #[test]
    fn frame_orthonormality_many_normals() {
        // spec §8 invariant 1, sampled over a grid of directions including
        // the z = -1 branch that exercises the sign-aware Duff-Burg fix.
        for i in 0..37 {
            for j in 0..19 {
                let theta = (i as Float / 37.0) * std::f32::consts::PI * 2.0;
                let phi = (j as Float / 19.0) * std::f32::consts::PI;
                let n = normalize3(Vector3f::new(
                    phi.sin() * theta.cos(),
                    phi.sin() * theta.sin(),
                    phi.cos(),
                ));
                check_orthonormal(Normal3f::from(n));
            }
        }
        check_orthonormal(Normal3f::new(0.0, 0.0, -1.0));
        check_orthonormal(Normal3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn to_local_to_world_roundtrip() {
        let f = Frame::new(Normal3f::new(0.0, 1.0, 0.0));
        let v = Vector3f::new(0.3, 0.1, 0.9);
        let local = f.to_local(v);
        let world = f.to_world(local);
        assert!((world.x - v.x).abs() < 1e-5);
        assert!((world.y - v.y).abs() < 1e-5);
        assert!((world.z - v.z).abs() < 1e-5);
    }
}
