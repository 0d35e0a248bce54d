//! Lumen - progressive CPU path tracing
//!
//! A small Monte Carlo path tracer for scenes of spheres. Rays bounce off
//! Lambertian and fuzzy-metal surfaces until they escape to a flat sky;
//! samples accumulate frame over frame until the camera moves.
//!
//! ```no_run
//! use lumen_tracer::{Camera, ProgressiveRenderer, RenderConfig, Scene};
//!
//! let scene = Scene::demo()?;
//! let mut renderer = ProgressiveRenderer::new(RenderConfig::default(), Camera::new())?;
//! renderer.resize(1280, 720);
//! while renderer.render_frame(&scene).is_some() {
//!     let frame = renderer.display_buffer();
//!     upload(frame.pixels, frame.width, frame.height);
//! }
//! # fn upload(_: &[u8], _: u32, _: u32) {}
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod band;
mod camera;
mod error;
mod hittable;
mod integrator;
mod material;
mod orbit;
mod progressive;
mod scene;
mod sphere;

pub use band::{band_count, generate_bands, render_band, rows_per_band, Band, FrameContext};
pub use camera::{Camera, ViewBasis};
pub use error::{RenderError, SceneError, SceneResult};
pub use hittable::{HitRecord, Hittable};
pub use integrator::{color_to_rgba, linear_to_gamma, ray_color, tone_map, RenderConfig};
pub use material::{random_in_unit_sphere, reflect, Color, Material, ScatterResult};
pub use orbit::OrbitController;
pub use progressive::{DisplayBuffer, FrameStats, ProgressiveRenderer, RenderPhase};
pub use scene::{Scene, SceneDescription, SphereDescription};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn rand::RngCore) -> f32 {
    use rand::Rng;
    rng.gen::<f32>()
}
