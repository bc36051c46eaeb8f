//! Minimal demo front end: builds a small in-process scene (no XML parser,
//! matching spec.md's scope carve-out), renders it, and writes the result
//! as a PPM file. Stands in for the production scene-file pipeline the
//! library itself deliberately does not implement.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use structopt::StructOpt;

use irradiant::config::{CameraConfig, FilmConfig, FilterConfig, IntegratorConfig, SamplerConfig, SceneConfig};
use irradiant::core::bsdf::diffuse::DiffuseBsdf;
use irradiant::core::emitter::area::AreaLight;
use irradiant::core::emitter::Emitter;
use irradiant::core::geometry::{Point3f, Transform, Vector3f};
use irradiant::core::scene::Scene;
use irradiant::core::shape::Shape;
use irradiant::core::spectrum::Spectrum;
use irradiant::core::texture::ConstantTexture;
use irradiant::core::shape::mesh::Mesh;

#[derive(StructOpt)]
#[structopt(name = "irradiant_demo", about = "renders a small built-in scene to a PPM file")]
struct Opt {
    #[structopt(long, default_value = "out.ppm")]
    output: String,

    #[structopt(long, default_value = "256")]
    width: i32,

    #[structopt(long, default_value = "256")]
    height: i32,

    #[structopt(long, default_value = "32")]
    spp: usize,

    #[structopt(long, default_value = "8")]
    max_depth: u32,
}

fn build_scene() -> Scene {
    let floor: Arc<dyn Shape> = Arc::new(Mesh::new(
        vec![
            Point3f::new(-5.0, -5.0, 0.0),
            Point3f::new(5.0, -5.0, 0.0),
            Point3f::new(5.0, 5.0, 0.0),
            Point3f::new(-5.0, 5.0, 0.0),
        ],
        vec![],
        vec![],
        vec![[0, 1, 2], [0, 2, 3]],
        Some(Arc::new(DiffuseBsdf::new(Box::new(ConstantTexture::new(Spectrum::new(
            0.7, 0.7, 0.7,
        )))))),
    ));

    let light_shape: Arc<dyn Shape> = Arc::new(Mesh::new(
        vec![
            Point3f::new(-1.5, -1.5, 5.0),
            Point3f::new(1.5, -1.5, 5.0),
            Point3f::new(1.5, 1.5, 5.0),
            Point3f::new(-1.5, 1.5, 5.0),
        ],
        vec![],
        vec![],
        vec![[0, 2, 1], [0, 3, 2]],
        None,
    ));
    let light: Arc<dyn Emitter> = Arc::new(AreaLight::new(
        light_shape,
        Box::new(ConstantTexture::new(Spectrum::new(12.0, 12.0, 12.0))),
    ));

    Scene::new(vec![floor], vec![None], vec![light], None)
}

fn write_ppm(path: &str, width: i32, height: i32, pixels: &[Spectrum]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    writeln!(w, "P3")?;
    writeln!(w, "{} {}", width, height)?;
    writeln!(w, "255")?;
    for p in pixels {
        let to_byte = |c: f32| (c.max(0.0).min(1.0).powf(1.0 / 2.2) * 255.0).round() as u8;
        writeln!(w, "{} {} {}", to_byte(p.r), to_byte(p.g), to_byte(p.b))?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();

    let config = SceneConfig {
        camera: CameraConfig {
            to_world: Transform::look_at(
                Point3f::new(0.0, -8.0, 2.5),
                Point3f::new(0.0, 0.0, 1.0),
                Vector3f::new(0.0, 0.0, 1.0),
            ),
            resolution: (opt.width, opt.height),
            fov_degrees: 40.0,
            near_clip: 1e-2,
            far_clip: 1000.0,
        },
        sampler: SamplerConfig {
            sample_count: opt.spp,
            seed: 0,
        },
        film: FilmConfig {
            width: opt.width,
            height: opt.height,
        },
        filter: FilterConfig::Gaussian { stddev: 0.5 },
        integrator: IntegratorConfig::Path {
            max_depth: Some(opt.max_depth),
            rr_depth: 5,
        },
    };

    if let Err(e) = config.validate() {
        log::error!("invalid scene configuration: {}", e);
        std::process::exit(1);
    }

    log::info!("building scene");
    let scene = build_scene();

    let sensor = config.camera.build().expect("camera config already validated");
    let film = config
        .film
        .build(&config.filter)
        .expect("film config already validated");
    let sampler = config.sampler.build().expect("sampler config already validated");
    let integrator = config.integrator.build().expect("integrator config already validated");

    log::info!("rendering {}x{} at {} spp", opt.width, opt.height, opt.spp);
    integrator.render(&scene, sensor.as_ref(), &film, sampler.as_ref());

    let pixels = film.develop();
    write_ppm(&opt.output, opt.width, opt.height, &pixels).expect("failed to write output image");
    log::info!("wrote {}", opt.output);
}
