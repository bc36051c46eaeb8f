//! Integrator implementations (spec §4.15, §4.16), grounded on
//! `include/aspirin/integrator.h` in `examples/original_source/`: each
//! drives the same tile-rendering pipeline (`BlockGenerator` + per-tile
//! `Sampler`/`ImageBlock`) with a different per-path estimator.

pub mod path;
pub mod volpath;

use crate::core::film::Film;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;

/// Shared driver contract: render a whole scene into its sensor's film
/// (spec §4.15 "Driver").
pub trait Integrator: Send + Sync {
    fn render(&self, scene: &Scene, sensor: &dyn Sensor, film: &Film, sampler: &dyn Sampler);
}

/// Default tile size in pixels, grounded on `APR_BLOCK_SIZE` in
/// `path.cpp`.
pub const BLOCK_SIZE: i32 = 32;

/// Shared tile-rendering driver (spec §4.15 "Driver", §5 "parallel worker
/// pool"): splits the film into spiral-ordered tiles via `BlockGenerator`
/// and farms them out over a rayon thread pool, grounded on the
/// `tiles.par_bridge()` idiom in
/// `examples/hackmad-pbr-rust/src/core/integrator/sampler_integrator.rs`.
/// `estimate` is the per-path estimator; everything else (jittering,
/// differential scaling, tile merging) is common to every integrator.
pub(crate) fn render_tiled<F>(
    scene: &Scene,
    sensor: &dyn Sensor,
    film: &Film,
    sampler: &dyn Sampler,
    estimate: F,
) where
    F: Fn(&Scene, &mut dyn crate::core::sampler::Sampler, crate::core::geometry::RayDifferential) -> crate::core::spectrum::Spectrum
        + Sync,
{
    use rayon::prelude::*;

    let (w, h) = sensor.film_size();
    let gen = crate::core::blockgen::BlockGenerator::new(w, h, BLOCK_SIZE);
    let total_spp = sampler.sample_count();
    let diff_scale = 1.0 / (total_spp as crate::core::float::Float).sqrt();
    let total_blocks = gen.blocks_left();

    (0..total_blocks).into_par_iter().for_each(|_| {
        let (offset, size) = match gen.next_block() {
            Some(v) => v,
            None => return,
        };
        let mut tile_sampler = sampler.clone_box();
        tile_sampler.seed((offset.1 as u64) << 32 | offset.0 as u64);

        let mut block = crate::core::imageblock::ImageBlock::new(size.0, size.1, Some(film.filter()));
        block.set_offset(offset.0, offset.1);

        for y in 0..size.1 {
            for x in 0..size.0 {
                let pixel = crate::core::geometry::Point2f::new((x + offset.0) as crate::core::float::Float, (y + offset.1) as crate::core::float::Float);
                for _ in 0..total_spp {
                    let jitter = tile_sampler.next_2d();
                    let pos_sample = crate::core::geometry::Point2f::new(pixel.x + jitter.x, pixel.y + jitter.y);
                    let (mut ray, ray_weight) = sensor.sample_ray_differential(pos_sample, tile_sampler.next_2d());
                    ray.scale_differentials(diff_scale);
                    let value = estimate(scene, tile_sampler.as_mut(), ray);
                    block.put(pos_sample, value * ray_weight);
                }
            }
        }
        film.put(&block);
    });
}
