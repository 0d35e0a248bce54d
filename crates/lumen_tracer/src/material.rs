//! Surface scattering for the two sphere materials.

use std::f32::consts::TAU;

use lumen_math::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::{gen_f32, hittable::HitRecord, Ray};

/// Color type alias (linear RGB, components in 0-1 for albedos)
pub type Color = Vec3;

/// Result of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Factor applied to the radiance gathered along `scattered`
    pub attenuation: Color,
    /// The continuation ray, starting at the hit point
    pub scattered: Ray,
}

/// Surface material of a sphere.
///
/// The two laws differ in kind (randomized diffuse vs. mirror plus fuzz),
/// so they are dispatched by a single `match` rather than a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Material {
    /// Ideal diffuse surface.
    Lambertian { albedo: Color },
    /// Reflective surface; `fuzz` = 0.0 is a perfect mirror, 1.0 is very rough.
    Metal { albedo: Color, fuzz: f32 },
}

impl Material {
    /// Create a Lambertian material.
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    /// Create a Metal material.
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal { albedo, fuzz }
    }

    /// The surface color used as the albedo multiplier.
    pub fn albedo(&self) -> Color {
        match *self {
            Material::Lambertian { albedo } | Material::Metal { albedo, .. } => albedo,
        }
    }

    /// Check color and fuzz ranges.
    pub fn validate(&self) -> SceneResult<()> {
        for value in self.albedo().to_array() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SceneError::InvalidColor { value });
            }
        }
        if let Material::Metal { fuzz, .. } = *self {
            if !(0.0..=1.0).contains(&fuzz) {
                return Err(SceneError::InvalidFuzz(fuzz));
            }
        }
        Ok(())
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed (a fuzzed metal reflection that
    /// ended up below the surface).
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match *self {
            Material::Lambertian { albedo } => {
                let mut scatter_direction =
                    rec.normal + random_in_unit_sphere(rng).normalize_or_zero();

                // Catch degenerate scatter direction
                if near_zero(scatter_direction) {
                    scatter_direction = rec.normal;
                }

                Some(ScatterResult {
                    attenuation: albedo,
                    scattered: Ray::new(rec.p, scatter_direction),
                })
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction(), rec.normal);
                let scattered_dir = reflected + fuzz * random_in_unit_sphere(rng);

                // Only scatter if the reflected ray is in the same hemisphere as the normal
                if scattered_dir.dot(rec.normal) > 0.0 {
                    Some(ScatterResult {
                        attenuation: albedo,
                        scattered: Ray::new(rec.p, scattered_dir),
                    })
                } else {
                    None
                }
            }
        }
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// True if every component is within 1e-6 of zero.
#[inline]
fn near_zero(v: Vec3) -> bool {
    v.abs().cmplt(Vec3::splat(1e-6)).all()
}

/// Uniform point inside the unit ball, without rejection.
///
/// theta ~ U[0, 2pi), phi = acos(2v - 1) with v ~ U[0, 1], r = cbrt(u).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let theta = gen_f32(rng) * TAU;
    let phi = (2.0 * gen_f32(rng) - 1.0).acos();
    let r = gen_f32(rng).cbrt();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(
        r * sin_phi * cos_theta,
        r * sin_phi * sin_theta,
        r * cos_phi,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record_facing_z(material: &Material) -> HitRecord<'_> {
        HitRecord {
            p: Vec3::new(0.0, 0.0, 0.5),
            normal: Vec3::Z,
            t: 2.5,
            front_face: true,
            color: material.albedo(),
            material,
        }
    }

    #[test]
    fn test_random_in_unit_sphere_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let p = random_in_unit_sphere(&mut rng);
            assert!(p.length() <= 1.0 + 1e-5, "{p:?} outside unit ball");
        }
    }

    #[test]
    fn test_random_in_unit_sphere_is_centered() {
        // Uniform over the ball: mean ~0, mean squared radius = 3/5
        let mut rng = StdRng::seed_from_u64(11);
        let n = 50_000;
        let mut sum = Vec3::ZERO;
        let mut sum_r2 = 0.0;
        for _ in 0..n {
            let p = random_in_unit_sphere(&mut rng);
            sum += p;
            sum_r2 += p.length_squared();
        }
        let mean = sum / n as f32;
        assert!(mean.length() < 0.02, "mean = {mean:?}");
        assert!((sum_r2 / n as f32 - 0.6).abs() < 0.01);
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(v, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_lambertian_scatters_into_normal_hemisphere() {
        let material = Material::lambertian(Color::new(0.5, 0.5, 0.5));
        let rec = record_facing_z(&material);
        let ray_in = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..1000 {
            let result = material.scatter(&ray_in, &rec, &mut rng).unwrap();
            assert!(result.scattered.direction().dot(rec.normal) >= 0.0);
            assert_eq!(result.scattered.origin(), rec.p);
            assert_eq!(result.attenuation, Color::new(0.5, 0.5, 0.5));
        }
    }

    #[test]
    fn test_smooth_metal_head_on_is_exact_mirror() {
        let material = Material::metal(Color::new(0.8, 0.8, 0.8), 0.0);
        let rec = record_facing_z(&material);
        let ray_in = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -2.0));
        let mut rng = StdRng::seed_from_u64(5);

        let result = material.scatter(&ray_in, &rec, &mut rng).unwrap();
        assert_eq!(result.scattered.direction(), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_metal_absorbs_below_surface() {
        // A grazing ray reflected with maximum fuzz dips below the surface
        // for some samples; those must be absorbed, the rest must be above.
        let material = Material::metal(Color::ONE, 1.0);
        let rec = record_facing_z(&material);
        let ray_in = Ray::new(Vec3::new(-3.0, 0.0, 0.51), Vec3::new(1.0, 0.0, -0.01));
        let mut rng = StdRng::seed_from_u64(9);

        let mut absorbed = 0;
        for _ in 0..1000 {
            match material.scatter(&ray_in, &rec, &mut rng) {
                Some(result) => assert!(result.scattered.direction().dot(rec.normal) > 0.0),
                None => absorbed += 1,
            }
        }
        assert!(absorbed > 0);
    }

    /// Replays a fixed list of `next_u32` values.
    struct FixedRng {
        values: Vec<u32>,
        next: usize,
    }

    impl FixedRng {
        fn new(values: &[u32]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }

        fn next_u64(&mut self) -> u64 {
            ((self.next_u32() as u64) << 32) | self.next_u32() as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest {
                *byte = self.next_u32() as u8;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_near_zero_threshold() {
        assert!(near_zero(Vec3::ZERO));
        assert!(near_zero(Vec3::splat(1e-7)));
        assert!(near_zero(Vec3::new(-9e-7, 9e-7, 0.0)));
        assert!(!near_zero(Vec3::new(1e-7, 1e-7, 1e-5)));
        assert!(!near_zero(Vec3::new(0.0, -2e-6, 0.0)));
    }

    #[test]
    fn test_lambertian_degenerate_direction_falls_back_to_normal() {
        // theta = 0, v = 0 (phi = pi), u ~ 1: the ball sample points along -Z,
        // exactly opposite the +Z normal, so normal + sample is ~zero
        let mut rng = FixedRng::new(&[0, 0, u32::MAX]);
        let sample = random_in_unit_sphere(&mut rng).normalize_or_zero();
        assert!(near_zero(Vec3::Z + sample));
        assert_ne!(Vec3::Z + sample, Vec3::Z);

        let material = Material::lambertian(Color::new(0.5, 0.5, 0.5));
        let rec = record_facing_z(&material);
        let ray_in = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let mut rng = FixedRng::new(&[0, 0, u32::MAX]);

        let result = material.scatter(&ray_in, &rec, &mut rng).unwrap();
        assert_eq!(result.scattered.direction(), rec.normal);
        assert_eq!(result.scattered.origin(), rec.p);
    }

    #[test]
    fn test_validate_ranges() {
        assert!(Material::lambertian(Color::new(0.0, 0.5, 1.0)).validate().is_ok());
        assert!(matches!(
            Material::lambertian(Color::new(1.5, 0.5, 0.5)).validate(),
            Err(SceneError::InvalidColor { .. })
        ));
        assert!(matches!(
            Material::metal(Color::ONE, 1.2).validate(),
            Err(SceneError::InvalidFuzz(_))
        ));
    }
}
