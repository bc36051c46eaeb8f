//! Sampling primitives and distributions (spec §4.1, §4.11 "precomputed
//! 1-D distribution over triangle areas"). The warp functions are grounded
//! on `include/aspirin/warp.h` in `examples/original_source/`, restated
//! without the Eigen template machinery.

use crate::core::float::{Float, INV_FOUR_PI, INV_PI, PI};
use crate::core::geometry::{Point2f, Vector3f};

/// Concentric (Shirley-Chiu) disk sample, used as the basis for
/// cosine-weighted hemisphere sampling.
pub fn square_to_uniform_disk_concentric(sample: Point2f) -> Point2f {
    let x = 2.0 * sample.x - 1.0;
    let y = 2.0 * sample.y - 1.0;
    if x == 0.0 && y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }
    let (r, theta) = if x * x > y * y {
        (x, (PI / 4.0) * (y / x))
    } else {
        (y, (PI / 2.0) - (x / y) * (PI / 4.0))
    };
    Point2f::new(r * theta.cos(), r * theta.sin())
}

pub fn cosine_sample_hemisphere(sample: Point2f) -> Vector3f {
    let d = square_to_uniform_disk_concentric(sample);
    let z = crate::core::float::safe_sqrt(1.0 - d.x * d.x - d.y * d.y);
    Vector3f::new(d.x, d.y, z)
}

pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta.max(0.0) * INV_PI
}

pub fn uniform_sample_sphere(sample: Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * sample.y;
    let r = crate::core::float::safe_sqrt(1.0 - z * z);
    let phi = 2.0 * PI * sample.x;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

pub fn uniform_sample_triangle(sample: Point2f) -> (Float, Float) {
    let t = crate::core::float::safe_sqrt(1.0 - sample.x);
    (1.0 - t, t * sample.y)
}

/// Piecewise-constant 1-D distribution built from non-negative weights,
/// used to sample a mesh triangle proportional to its area (spec §4.11)
/// and, for an environment map, proportional to per-texel luminance.
#[derive(Debug, Clone)]
pub struct Distribution1D {
    cdf: Vec<Float>,
    func: Vec<Float>,
    func_integral: Float,
}

impl Distribution1D {
    pub fn new(func: Vec<Float>) -> Self {
        let n = func.len();
        let mut cdf = vec![0.0; n + 1];
        for i in 1..=n {
            cdf[i] = cdf[i - 1] + func[i - 1] / n as Float;
        }
        let func_integral = cdf[n];
        if func_integral == 0.0 {
            for i in 1..=n {
                cdf[i] = i as Float / n as Float;
            }
        } else {
            for i in 1..=n {
                cdf[i] /= func_integral;
            }
        }
        Distribution1D {
            cdf,
            func,
            func_integral,
        }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    pub fn integral(&self) -> Float {
        self.func_integral
    }

    pub fn func_at(&self, idx: usize) -> Float {
        self.func[idx]
    }

    /// Returns `(sampled index, pdf of that index)`.
    pub fn sample_discrete(&self, u: Float) -> (usize, Float) {
        let idx = match self.cdf.binary_search_by(|probe| probe.partial_cmp(&u).unwrap()) {
            Ok(i) => i,
            Err(i) => i,
        };
        let idx = idx.saturating_sub(1).min(self.func.len() - 1);
        let pdf = if self.func_integral > 0.0 {
            self.func[idx] / (self.func_integral * self.func.len() as Float)
        } else {
            1.0 / self.func.len() as Float
        };
        (idx, pdf)
    }

    /// Like `sample_discrete`, but also returns `u` remapped uniformly onto
    /// `[0, 1)` within the chosen bucket, so the caller can reuse it as a
    /// fresh random number instead of drawing a new one (mesh.cpp's
    /// `sample_reuse`).
    pub fn sample_reuse(&self, u: Float) -> (usize, Float, Float) {
        let (idx, pdf) = self.sample_discrete(u);
        let lo = self.cdf[idx];
        let hi = self.cdf[idx + 1];
        let remapped = if hi > lo { (u - lo) / (hi - lo) } else { 0.0 };
        (idx, remapped.clamp(0.0, 1.0 - Float::EPSILON), pdf)
    }
}

/// Piecewise-constant 2-D distribution (row-major `nu x nv` grid), built as
/// a marginal distribution over rows plus one conditional distribution per
/// row, grounded on `Distribution2D` in
/// `examples/justinliew-rs_pbrt_edge/src/core/sampling.rs`. Used for
/// luminance-weighted environment-map importance sampling (spec §4.12).
#[derive(Debug, Clone)]
pub struct Distribution2D {
    conditional: Vec<Distribution1D>,
    marginal: Distribution1D,
    nu: usize,
}

impl Distribution2D {
    pub fn new(func: Vec<Float>, nu: usize, nv: usize) -> Self {
        let mut conditional = Vec::with_capacity(nv);
        let mut marginal_func = Vec::with_capacity(nv);
        for v in 0..nv {
            let row = func[v * nu..(v + 1) * nu].to_vec();
            let row_distr = Distribution1D::new(row);
            marginal_func.push(row_distr.integral());
            conditional.push(row_distr);
        }
        Distribution2D {
            conditional,
            marginal: Distribution1D::new(marginal_func),
            nu,
        }
    }

    /// Returns `((u, v), pdf)` with `u, v` normalized to `[0, 1)`.
    pub fn sample(&self, sample: Point2f) -> (Point2f, Float) {
        let (v_idx, v_pdf) = self.marginal.sample_discrete(sample.y);
        let (u_idx, u_pdf) = self.conditional[v_idx].sample_discrete(sample.x);
        let u = (u_idx as Float + 0.5) / self.nu as Float;
        let v = (v_idx as Float + 0.5) / self.conditional.len() as Float;
        (Point2f::new(u, v), u_pdf * v_pdf * (self.nu * self.conditional.len()) as Float)
    }

    pub fn pdf(&self, uv: Point2f) -> Float {
        let iu = ((uv.x * self.nu as Float) as usize).min(self.nu - 1);
        let iv = ((uv.y * self.conditional.len() as Float) as usize).min(self.conditional.len() - 1);
        if self.marginal.integral() == 0.0 {
            return 0.0;
        }
        self.conditional[iv].func_at(iu) / self.marginal.integral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_hemisphere_empirical_density_matches_pdf() {
        // spec §8 invariant 3, restricted to the diffuse-sampling warp
        // itself (the BSDF-level χ² check lives in core::bsdf::diffuse).
        let n = 20_000;
        let bins = 10;
        let mut counts = vec![0usize; bins];
        let mut state = 0x853c49e6748fea9bu64;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as u32) as Float / (u32::MAX as Float)
        };
        for _ in 0..n {
            let u = Point2f::new(next(), next());
            let v = cosine_sample_hemisphere(u);
            let bin = ((v.z.max(0.0).min(0.999999)) * bins as Float) as usize;
            counts[bin] += 1;
        }
        // cos(theta) weighting means higher z-bins see fewer samples per
        // unit solid angle but the same per unit z (cosine-weighted
        // sampling is uniform in z for a hemisphere), so bin counts should
        // be roughly equal.
        let mean = n as Float / bins as Float;
        for c in counts {
            assert!((c as Float - mean).abs() / mean < 0.2, "bin count {} far from mean {}", c, mean);
        }
    }

    #[test]
    fn distribution1d_sample_discrete_respects_weight() {
        let d = Distribution1D::new(vec![1.0, 3.0]);
        let (idx_lo, _) = d.sample_discrete(0.01);
        let (idx_hi, _) = d.sample_discrete(0.99);
        assert_eq!(idx_lo, 0);
        assert_eq!(idx_hi, 1);
    }

    #[test]
    fn distribution2d_sample_pdf_is_self_consistent() {
        let func = vec![1.0, 1.0, 3.0, 3.0, 1.0, 1.0, 3.0, 3.0];
        let d = Distribution2D::new(func, 4, 2);
        let (uv, pdf) = d.sample(Point2f::new(0.8, 0.5));
        assert!(pdf > 0.0);
        assert!((pdf - d.pdf(uv)).abs() / pdf < 1e-2);
    }
}
