//! Sphere primitive for ray tracing.

use crate::{
    error::{SceneError, SceneResult},
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use lumen_math::{Interval, Vec3};

/// A sphere with a surface material.
///
/// Immutable once built; `new` rejects anything that would feed NaNs into
/// the integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a new sphere, validating its geometry and material.
    pub fn new(center: Vec3, radius: f32, material: Material) -> SceneResult<Self> {
        if !center.is_finite() {
            return Err(SceneError::InvalidGeometry(format!(
                "sphere center {center} is not finite"
            )));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SceneError::InvalidGeometry(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        material.validate()?;

        Ok(Self {
            center,
            radius,
            material,
        })
    }

    /// Lambertian sphere.
    pub fn lambertian(center: Vec3, radius: f32, albedo: Vec3) -> SceneResult<Self> {
        Self::new(center, radius, Material::lambertian(albedo))
    }

    /// Metal sphere.
    pub fn metal(center: Vec3, radius: f32, albedo: Vec3, fuzz: f32) -> SceneResult<Self> {
        Self::new(center, radius, Material::metal(albedo, fuzz))
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward_normal, &self.material))
    }
}
