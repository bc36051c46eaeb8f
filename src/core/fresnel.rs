//! Fresnel reflectance helpers (spec §4.7 "dielectric/conductor Fresnel"),
//! grounded on `include/aspirin/fresnel.h` in `examples/original_source/`.

use crate::core::float::{safe_sqrt, Float};
use crate::core::geometry::Vector3f;
use crate::core::spectrum::Spectrum;

pub fn reflect(wi: Vector3f) -> Vector3f {
    Vector3f::new(-wi.x, -wi.y, wi.z)
}

pub fn reflect_about(wi: Vector3f, n: Vector3f) -> Vector3f {
    n * (2.0 * crate::core::geometry::dot3(wi, n)) - wi
}

pub fn refract(wi: Vector3f, cos_theta_t: Float, eta_ti: Float) -> Vector3f {
    Vector3f::new(-eta_ti * wi.x, -eta_ti * wi.y, cos_theta_t)
}

/// Refraction about an arbitrary normal `n` (e.g. a sampled microfacet
/// normal rather than the shading frame's z axis), used by rough dielectric
/// lobes. `cos_theta_t` and `eta_ti` come from `fresnel_dielectric(dot(wi,
/// n), eta)`.
pub fn refract_about(wi: Vector3f, n: Vector3f, cos_theta_t: Float, eta_ti: Float) -> Vector3f {
    let cos_theta_i = crate::core::geometry::dot3(wi, n);
    n * (cos_theta_i * eta_ti - cos_theta_t) - wi * eta_ti
}

/// Unpolarized dielectric Fresnel reflectance. Returns
/// `(reflectance, cos_theta_t, eta_it, eta_ti)`.
pub fn fresnel_dielectric(cos_theta_i: Float, eta: Float) -> (Float, Float, Float, Float) {
    let (eta_it, eta_ti) = if cos_theta_i >= 0.0 {
        (eta, 1.0 / eta)
    } else {
        (1.0 / eta, eta)
    };

    let cos_theta_t_sqr = 1.0 - eta_ti * eta_ti * (1.0 - cos_theta_i * cos_theta_i);
    let cos_theta_i_abs = cos_theta_i.abs();
    let cos_theta_t_abs = safe_sqrt(cos_theta_t_sqr);

    let a_s = (cos_theta_i_abs - eta_it * cos_theta_t_abs) / (cos_theta_i_abs + eta_it * cos_theta_t_abs);
    let a_p = (cos_theta_t_abs - eta_it * cos_theta_i_abs) / (cos_theta_t_abs + eta_it * cos_theta_i_abs);

    let r = if eta == 1.0 {
        0.0
    } else if cos_theta_i_abs == 0.0 {
        1.0
    } else {
        0.5 * (a_s * a_s + a_p * a_p)
    };

    let cos_theta_t = cos_theta_t_abs * (-cos_theta_i).signum();
    (r, cos_theta_t, eta_it, eta_ti)
}

/// Fresnel reflectance of an opaque conductor (complex IOR `eta + i*k`).
pub fn fresnel_conductor(cos_theta_i: Float, eta: Spectrum, k: Spectrum) -> Spectrum {
    let cos_theta_i_2 = cos_theta_i * cos_theta_i;
    let sin_theta_i_2 = 1.0 - cos_theta_i_2;
    let sin_theta_i_4 = sin_theta_i_2 * sin_theta_i_2;

    let temp1 = eta * eta - k * k - Spectrum::splat(sin_theta_i_2);
    let a_2_pb_2 = (temp1 * temp1 + k * k * eta * eta * 4.0).sqrt();
    let a = ((a_2_pb_2 + temp1) * 0.5).sqrt();

    let term1 = a_2_pb_2 + Spectrum::splat(cos_theta_i_2);
    let term2 = a * (2.0 * cos_theta_i);
    let r_s = (term1 - term2) / (term1 + term2);

    let term3 = a_2_pb_2 * cos_theta_i_2 + Spectrum::splat(sin_theta_i_4);
    let term4 = term2 * sin_theta_i_2;
    let r_p = r_s * (term3 - term4) / (term3 + term4);

    (r_s + r_p) * 0.5
}
