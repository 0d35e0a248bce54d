//! Core path tracing integrator.
//!
//! Implements a recursive radiance estimate with:
//! - A flat sky as the only light source
//! - Albedo multiply per bounce (the diffuse/mirror lobes are importance
//!   sampled by the scatter directions themselves)
//! - Fixed recursion depth, no Russian roulette
//! - Gamma-2 tone mapping of the running average

use crate::{Color, Hittable, Ray};
use lumen_math::Interval;
use rand::RngCore;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Accumulation stops once the sample count exceeds this
    pub max_samples: u32,
    /// Radiance returned by rays that escape the scene
    pub sky: Color,
    /// Self-intersection epsilon for bounced rays
    pub t_min: f32,
    /// Far clip for the nearest-hit sweep
    pub t_max: f32,
    /// Worker threads; `None` uses the available hardware parallelism
    pub threads: Option<usize>,
    /// Seed for reproducible frames; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_samples: 200,
            sky: Color::new(0.5, 0.7, 1.0),
            t_min: 1e-3,
            t_max: 1000.0,
            threads: None,
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Interval searched for the nearest hit.
    #[inline]
    pub fn hit_interval(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }
}

/// Compute the color seen by a ray.
///
/// `depth` counts the path vertices still allowed: at 0 the path is
/// exhausted and contributes black, so a camera ray traced with depth 1
/// returns the sky when it misses and black when it hits anything.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, config.hit_interval()) else {
        return config.sky;
    };

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, world, depth - 1, config, rng)
        }
        // Absorbed
        None => Color::ZERO,
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Map one averaged linear channel to a byte.
#[inline]
pub fn tone_map(linear: f32) -> u8 {
    const INTENSITY: Interval = Interval {
        min: 0.0,
        max: 0.999,
    };
    (256.0 * INTENSITY.clamp(linear_to_gamma(linear))) as u8
}

/// Convert an accumulated color sum over `samples` frames to 8-bit RGBA.
pub fn color_to_rgba(sum: Color, samples: u32) -> [u8; 4] {
    let average = sum / samples.max(1) as f32;
    [
        tone_map(average.x),
        tone_map(average.y),
        tone_map(average.z),
        255,
    ]
}
