//! Participating medium contract (spec §4.13) and the homogeneous
//! reference implementation, grounded on `include/aspirin/medium.h` and
//! `src/libaspirin/media/homogeneous.cpp` in `examples/original_source/`.

use std::sync::Arc;

use crate::core::float::Float;
use crate::core::geometry::Ray;
use crate::core::interaction::MediumInteraction;
use crate::core::phase::PhaseFunction;
use crate::core::spectrum::Spectrum;

pub trait Medium: Send + Sync {
    /// Sample a free-flight distance along `ray` within `[ray.mint,
    /// ray.maxt)`, collision-sampling against the single spectral `channel`
    /// (0=r, 1=g, 2=b) the caller picked via `min(3*u, 2)` (spec §4.16).
    /// Returns the interaction (with `t = infinity` if the sampled distance
    /// escaped the segment) and the pdf of that event along that channel.
    fn sample_interaction(&self, ray: &Ray, sample: Float, channel: usize) -> (MediumInteraction, Float);

    /// Beer-Lambert transmittance over `ray`'s full `[mint, maxt]` extent,
    /// used for binary (non-collision-sampled) transmittance estimation.
    fn eval_transmittance(&self, ray: &Ray) -> Spectrum;

    fn phase_function(&self) -> &dyn PhaseFunction;

    fn is_homogeneous(&self) -> bool;
}

pub struct HomogeneousMedium {
    sigma_a: Spectrum,
    sigma_s: Spectrum,
    sigma_t: Spectrum,
    phase: Arc<dyn PhaseFunction>,
}

impl HomogeneousMedium {
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, phase: Arc<dyn PhaseFunction>) -> Self {
        HomogeneousMedium {
            sigma_a,
            sigma_s,
            sigma_t: sigma_a + sigma_s,
            phase,
        }
    }
}

impl Medium for HomogeneousMedium {
    fn sample_interaction(&self, ray: &Ray, sample: Float, channel: usize) -> (MediumInteraction, Float) {
        // Collision-sample against the caller-chosen channel, matching the
        // teacher's `m_sigma_t[channel]`; RGB-averaged transmittance still
        // weights every channel via `.mean()` below.
        let sigma_t_channel = self.sigma_t.channel(channel).max(1e-8);
        let sampled_distance = -(1.0 - sample).ln() / sigma_t_channel;
        let segment = ray.maxt - ray.mint;

        let (t, distance_used) = if sampled_distance < segment {
            (sampled_distance + ray.mint, sampled_distance)
        } else {
            (Float::INFINITY, segment)
        };

        let transmittance = (self.sigma_t * (-distance_used)).exp();
        let transmittance = if transmittance.max_component() < 1e-20 {
            Spectrum::black()
        } else {
            transmittance
        };

        // Mean over channels of sigma_t * transmittance (collision pdf), or
        // just transmittance (escape pdf), matching
        // `(m_sigma_t * (-d)).exp().mean()` / `(... * m_sigma_t).mean()`.
        let final_pdf = if t.is_finite() {
            let weighted = transmittance * self.sigma_t;
            (weighted.r + weighted.g + weighted.b) / 3.0
        } else {
            (transmittance.r + transmittance.g + transmittance.b) / 3.0
        };

        let mi = MediumInteraction {
            t,
            p: ray.at(if t.is_finite() { t } else { ray.maxt }),
            wi: -ray.d,
            sigma_a: self.sigma_a,
            sigma_s: self.sigma_s,
            transmittance,
        };
        (mi, final_pdf)
    }

    fn eval_transmittance(&self, ray: &Ray) -> Spectrum {
        let neg_length = ray.mint - ray.maxt;
        (self.sigma_t * neg_length).exp()
    }

    fn phase_function(&self) -> &dyn PhaseFunction {
        self.phase.as_ref()
    }

    fn is_homogeneous(&self) -> bool {
        true
    }
}
