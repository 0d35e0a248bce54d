//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Color, Material, Ray};
use lumen_math::{Interval, Vec3};

/// Record of a ray-object intersection.
///
/// Lives on the stack for one intersection + scatter step only.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Albedo of the struck surface
    pub color: Color,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    /// Build a record from an outward normal, orienting it against the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: &'a Material,
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            t,
            front_face: true,
            color: material.albedo(),
            material,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}
