//! Surface path integrator (spec §4.15), grounded on
//! `PathTracer::sample` in `src/libaspirin/integrators/path.cpp`: unidirectional
//! path tracing with next-event estimation and power-heuristic MIS against
//! BSDF sampling, implicit environment-light escape, and Russian roulette.

use crate::core::bsdf::{BsdfContext, BsdfFlags, TransportMode};
use crate::core::float::Float;
use crate::core::geometry::RayDifferential;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::core::spectrum::Spectrum;
use crate::integrators::{render_tiled, Integrator};

fn mis_weight(a: Float, b: Float) -> Float {
    let a2 = a * a;
    let b2 = b * b;
    if a2 > 0.0 {
        a2 / (a2 + b2)
    } else {
        0.0
    }
}

pub struct PathIntegrator {
    /// `None` means unbounded depth, matching spec.md's "defaults ∞".
    pub max_depth: Option<u32>,
    pub rr_depth: u32,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        PathIntegrator {
            max_depth: None,
            rr_depth: 5,
        }
    }
}

impl PathIntegrator {
    pub fn new(max_depth: Option<u32>, rr_depth: u32) -> Self {
        PathIntegrator { max_depth, rr_depth }
    }

    fn depth_exceeded(&self, depth: u32) -> bool {
        self.max_depth.map_or(false, |m| depth >= m)
    }

    /// The per-path estimator (spec §4.15's pseudocode), called once per
    /// sub-sample by the shared tile driver. Emission (an emitter-attached
    /// shape's radiance or the environment's on a miss) is accounted exactly
    /// once per intersection, at the top of the loop, weighted by
    /// `emission_weight` — the MIS term carried over from the *previous*
    /// bounce's BSDF sample, matching `PathTracer::sample` in the original
    /// `path.cpp`. `emission_weight` starts at 1 (nothing competes with the
    /// primary ray) and stays 1 after a delta/null bounce (NEE can never
    /// sample a delta lobe, so there is nothing to MIS against); otherwise
    /// it is `mis_weight(bs.pdf, p_e)` against the pdf NEE would have used
    /// to sample the same emitter from the same reference point.
    fn sample(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: RayDifferential) -> Spectrum {
        let mut ray = ray.ray;
        let mut throughput = Spectrum::one();
        let mut result = Spectrum::black();
        let mut eta = 1.0;
        let mut emission_weight = 1.0;

        let mut si = scene.ray_intersect(&ray);
        let ctx = BsdfContext::new(TransportMode::Radiance);

        let mut depth = 1u32;
        loop {
            if !si.is_valid() {
                if let Some(env) = scene.environment() {
                    result += throughput * emission_weight * env.eval(&si);
                }
                break;
            }

            if let Some(emitter) = &si.emitter {
                result += throughput * emission_weight * emitter.eval(&si);
            }

            if self.depth_exceeded(depth) {
                break;
            }

            let bsdf = match &si.bsdf {
                Some(b) => b.clone(),
                None => break,
            };

            if bsdf.flags().intersects(BsdfFlags::SMOOTH) {
                let (ds, emitter_val) = scene.sample_emitter_direct(si.p, sampler.next_2d(), true);
                if ds.pdf > 0.0 {
                    let wo = si.to_local(ds.d);
                    let f = bsdf.eval(&ctx, &si, wo);
                    let p_bsdf = bsdf.pdf(&ctx, &si, wo);
                    let w = if ds.delta { 1.0 } else { mis_weight(ds.pdf, p_bsdf) };
                    result += throughput * f * emitter_val * w;
                }
            }

            let (bs, f_over_pdf) = bsdf.sample(&ctx, &si, sampler.next_1d(), sampler.next_2d());
            if bs.pdf <= 0.0 || f_over_pdf.is_black() {
                break;
            }
            throughput *= f_over_pdf;
            eta *= bs.eta;

            ray = si.spawn_ray(si.to_world(bs.wo));
            let si_next = scene.ray_intersect(&ray);

            emission_weight = Self::next_emission_weight(scene, &si, &si_next, &ray, &bs);

            if depth + 1 >= self.rr_depth {
                let q = (throughput.max_component() * eta * eta).min(0.95);
                if sampler.next_1d() >= q {
                    break;
                }
                throughput *= 1.0 / q;
            }

            si = si_next;
            depth += 1;
        }

        result
    }

    /// The MIS weight emission at `si_next` (or the environment, on a miss)
    /// will be accounted at next iteration, computed against the pdf
    /// `Scene::sample_emitter_direct` would have assigned the same
    /// direction from `si`.
    fn next_emission_weight(
        scene: &Scene,
        si: &crate::core::interaction::SurfaceInteraction,
        si_next: &crate::core::interaction::SurfaceInteraction,
        ray: &crate::core::geometry::Ray,
        bs: &crate::core::bsdf::BsdfSample,
    ) -> Float {
        if bs.sampled_type.intersects(BsdfFlags::DELTA) {
            return 1.0;
        }
        if si_next.is_valid() {
            match &si_next.emitter {
                Some(emitter_next) => {
                    let ds = crate::core::interaction::DirectIllumSample::from_points(si_next.p, si_next.n, si.p);
                    mis_weight(bs.pdf, scene.pdf_emitter_direct(si.p, &ds, emitter_next))
                }
                None => 1.0,
            }
        } else {
            match scene.environment() {
                Some(env) => {
                    // An environment "hit" has no surface point to derive a
                    // direction from; the continuation ray's own direction
                    // is the direction NEE would have had to sample.
                    let ds = crate::core::interaction::DirectIllumSample {
                        p: si.p + ray.d,
                        n: crate::core::geometry::Normal3f::from(-ray.d),
                        d: ray.d,
                        dist: 1.0,
                        pdf: 0.0,
                        delta: false,
                    };
                    mis_weight(bs.pdf, scene.pdf_emitter_direct(si.p, &ds, env))
                }
                None => 1.0,
            }
        }
    }
}

impl Integrator for PathIntegrator {
    fn render(&self, scene: &Scene, sensor: &dyn Sensor, film: &crate::core::film::Film, sampler: &dyn Sampler) {
        render_tiled(scene, sensor, film, sampler, |scene, sampler, ray| self.sample(scene, sampler, ray));
    }
}
