//! Render-settings records standing in for the parsed scene-description
//! object graph spec.md scopes out of the core (no XML grammar, no dynamic
//! plugin registry). A `SceneConfig` carries everything needed to build the
//! sensor, sampler, film, and integrator for a render; the scene graph
//! itself (shapes, emitters) is still built directly against the `Scene`
//! API, matching spec §4.15/4.16's "constructed directly, no plugin
//! factory" note for the integrators.

use std::sync::Arc;

use crate::core::film::Film;
use crate::core::geometry::Transform;
use crate::core::rfilter::GaussianFilter;
use crate::core::sampler::{IndependentSampler, Sampler};
use crate::core::sensor::{PerspectiveCamera, Sensor};
use crate::error::ConfigError;
use crate::integrators::path::PathIntegrator;
use crate::integrators::volpath::VolumetricPathIntegrator;
use crate::integrators::Integrator;

#[derive(Debug, Clone, Copy)]
pub struct FilmConfig {
    pub width: i32,
    pub height: i32,
}

impl FilmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::TypeMismatch {
                property: "film.width/height",
                expected: "positive integer",
            });
        }
        Ok(())
    }

    pub fn build(&self, filter: &FilterConfig) -> Result<Film, ConfigError> {
        self.validate()?;
        Ok(Film::with_filter(self.width, self.height, filter.build()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub to_world: Transform,
    pub resolution: (i32, i32),
    pub fov_degrees: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl CameraConfig {
    pub fn build(&self) -> Result<Arc<dyn Sensor>, ConfigError> {
        if self.fov_degrees <= 0.0 || self.fov_degrees >= 180.0 {
            return Err(ConfigError::TypeMismatch {
                property: "camera.fov",
                expected: "degrees in (0, 180)",
            });
        }
        Ok(Arc::new(PerspectiveCamera::new(
            self.to_world,
            self.resolution,
            self.fov_degrees,
            self.near_clip,
            self.far_clip,
        )))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    pub sample_count: usize,
    pub seed: u64,
}

impl SamplerConfig {
    pub fn build(&self) -> Result<Box<dyn Sampler>, ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::MissingProperty {
                plugin: "independent sampler",
                property: "sample_count",
            });
        }
        let mut sampler = IndependentSampler::new(self.sample_count);
        sampler.seed(self.seed);
        Ok(Box::new(sampler))
    }
}

/// The reconstruction filter kind, standing in for the `<rfilter type="...">`
/// plugin selection spec.md's XML layer would otherwise resolve. Only the
/// Gaussian filter has a reference implementation in this crate.
#[derive(Debug, Clone, Copy)]
pub enum FilterConfig {
    Gaussian { stddev: f32 },
}

impl FilterConfig {
    pub fn build(&self) -> Box<GaussianFilter> {
        match self {
            FilterConfig::Gaussian { stddev } => Box::new(GaussianFilter::new(*stddev)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum IntegratorConfig {
    Path { max_depth: Option<u32>, rr_depth: u32 },
    Volumetric { max_depth: Option<u32>, rr_depth: u32 },
}

impl IntegratorConfig {
    pub fn build(&self) -> Result<Arc<dyn Integrator>, ConfigError> {
        match *self {
            IntegratorConfig::Path { max_depth, rr_depth } => {
                if rr_depth == 0 {
                    return Err(ConfigError::MissingProperty {
                        plugin: "path",
                        property: "rr_depth",
                    });
                }
                Ok(Arc::new(PathIntegrator::new(max_depth, rr_depth)))
            }
            IntegratorConfig::Volumetric { max_depth, rr_depth } => {
                if rr_depth == 0 {
                    return Err(ConfigError::MissingProperty {
                        plugin: "volpath",
                        property: "rr_depth",
                    });
                }
                Ok(Arc::new(VolumetricPathIntegrator::new(max_depth, rr_depth)))
            }
        }
    }
}

/// The render-settings half of a scene: everything except the shape/emitter
/// graph, which callers build directly against `Scene::new` (spec.md scopes
/// the XML object-graph builder out of this crate).
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub sampler: SamplerConfig,
    pub film: FilmConfig,
    pub filter: FilterConfig,
    pub integrator: IntegratorConfig,
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.film.validate()?;
        self.camera.build().map(|_| ())?;
        self.sampler.build().map(|_| ())?;
        self.integrator.build().map(|_| ())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> SceneConfig {
        SceneConfig {
            camera: CameraConfig {
                to_world: Transform::identity(),
                resolution: (64, 64),
                fov_degrees: 45.0,
                near_clip: 1e-2,
                far_clip: 1000.0,
            },
            sampler: SamplerConfig { sample_count: 16, seed: 0 },
            film: FilmConfig { width: 64, height: 64 },
            filter: FilterConfig::Gaussian { stddev: 0.5 },
            integrator: IntegratorConfig::Path { max_depth: Some(8), rr_depth: 5 },
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn zero_spp_is_rejected() {
        let mut config = sample_config();
        config.sampler.sample_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::MissingProperty { .. })));
    }

    #[test]
    fn degenerate_fov_is_rejected() {
        let mut config = sample_config();
        config.camera.fov_degrees = 200.0;
        assert!(matches!(config.validate(), Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn zero_rr_depth_is_rejected() {
        let mut config = sample_config();
        config.integrator = IntegratorConfig::Volumetric { max_depth: None, rr_depth: 0 };
        assert!(matches!(config.validate(), Err(ConfigError::MissingProperty { .. })));
    }
}
