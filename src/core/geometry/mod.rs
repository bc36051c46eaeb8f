//! Ray/Frame/Transform/bounds layer (spec §3, §4): the coordinate-system
//! vocabulary every sampler and evaluator in the crate speaks.

pub mod bounds;
pub mod frame;
pub mod ray;
pub mod transform;
pub mod vector;

pub use bounds::{BoundingSphere, Bounds3f};
pub use frame::Frame;
pub use ray::{Ray, RayDifferential};
pub use transform::{Matrix4, Transform};
pub use vector::{
    abs_dot3, cross3, dot3, faceforward, length3, normalize3, normalize_nrm, nrm_dot_nrm,
    nrm_dot_vec3, Normal3f, Point2f, Point3f, Vector3f,
};
