//! Scene description: an immutable list of spheres.
//!
//! Scenes are built once at startup, either in code or from a JSON
//! description, and shared read-only by every render worker.

use serde::{Deserialize, Serialize};

use crate::error::SceneResult;
use crate::hittable::{HitRecord, Hittable};
use crate::{Color, Material, Ray, Sphere};
use lumen_math::{Interval, Vec3};

/// All geometry the renderer can see.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    /// Create a scene from already validated spheres.
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Self { spheres }
    }

    /// The demo scene: a row of five spheres on a large ground sphere,
    /// a larger green one behind and a large mirror in front.
    pub fn demo() -> SceneResult<Self> {
        let spheres = vec![
            Sphere::lambertian(Vec3::new(-1.0, 0.5, 0.0), 0.5, Color::new(1.0, 0.5, 0.5))?,
            Sphere::lambertian(Vec3::new(0.0, 0.5, 0.0), 0.5, Color::new(0.6, 0.6, 0.6))?,
            Sphere::lambertian(Vec3::new(1.0, 0.5, 0.0), 0.5, Color::new(0.5, 0.5, 1.0))?,
            Sphere::lambertian(Vec3::new(1.0, 1.0, -2.0), 1.0, Color::new(0.5, 1.0, 0.5))?,
            Sphere::lambertian(Vec3::new(0.0, -100.0, 0.0), 100.0, Color::new(0.5, 0.5, 0.5))?,
            Sphere::metal(Vec3::new(-2.0, 0.5, 0.0), 0.5, Color::new(0.8, 0.8, 0.8), 0.1)?,
            Sphere::metal(Vec3::new(2.0, 0.5, 0.0), 0.5, Color::new(0.8, 0.8, 0.8), 0.1)?,
            Sphere::metal(Vec3::new(-1.0, 1.0, 2.0), 1.0, Color::new(0.8, 0.8, 0.8), 0.1)?,
        ];
        Ok(Self::new(spheres))
    }

    /// Parse and validate a JSON scene description.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let desc: SceneDescription = serde_json::from_str(json)?;
        desc.build()
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Get the number of spheres.
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

impl Hittable for Scene {
    /// Nearest hit across every sphere.
    ///
    /// The window's upper bound shrinks to the closest hit so far; at equal
    /// distance the first sphere found wins.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;
        let mut closest_so_far = ray_t.max;

        for sphere in &self.spheres {
            if let Some(rec) = sphere.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }
}

/// Serialized form of a sphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

/// Serialized form of a scene.
///
/// ```json
/// { "spheres": [
///     { "center": [0, 0.5, 0], "radius": 0.5,
///       "material": { "type": "lambertian", "albedo": [0.6, 0.6, 0.6] } },
///     { "center": [2, 0.5, 0], "radius": 0.5,
///       "material": { "type": "metal", "albedo": [0.8, 0.8, 0.8], "fuzz": 0.1 } }
/// ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    pub spheres: Vec<SphereDescription>,
}

impl SceneDescription {
    /// Validate every sphere and build the scene.
    pub fn build(self) -> SceneResult<Scene> {
        let spheres = self
            .spheres
            .into_iter()
            .map(|s| Sphere::new(s.center, s.radius, s.material))
            .collect::<SceneResult<Vec<_>>>()?;
        Ok(Scene::new(spheres))
    }
}

impl From<&Scene> for SceneDescription {
    fn from(scene: &Scene) -> Self {
        Self {
            spheres: scene
                .spheres()
                .iter()
                .map(|s| SphereDescription {
                    center: s.center(),
                    radius: s.radius(),
                    material: *s.material(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SceneError;

    #[test]
    fn test_nearest_hit_wins_regardless_of_order() {
        // The metal sphere is listed last but is closer to the ray origin
        let scene = Scene::new(vec![
            Sphere::lambertian(Vec3::new(0.0, 0.0, -10.0), 1.0, Color::new(0.2, 0.2, 0.2)).unwrap(),
            Sphere::metal(Vec3::new(0.0, 0.0, -4.0), 1.0, Color::new(0.9, 0.9, 0.9), 0.0).unwrap(),
        ]);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let rec = scene.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-4);
        assert!(matches!(rec.material, Material::Metal { .. }));
    }

    #[test]
    fn test_equal_distance_keeps_first_sphere() {
        let center = Vec3::new(0.0, 0.0, -5.0);
        let scene = Scene::new(vec![
            Sphere::lambertian(center, 1.0, Color::new(0.1, 0.2, 0.3)).unwrap(),
            Sphere::metal(center, 1.0, Color::new(0.9, 0.9, 0.9), 0.0).unwrap(),
        ]);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let rec = scene.hit(&ray, Interval::new(0.001, 1000.0)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-4);
        assert_eq!(*rec.material, Material::lambertian(Color::new(0.1, 0.2, 0.3)));
        assert_eq!(rec.color, Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_far_clip_bounds_sweep() {
        let scene = Scene::new(vec![
            Sphere::lambertian(Vec3::new(0.0, 0.0, -2000.0), 1.0, Color::ONE).unwrap(),
        ]);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(scene.hit(&ray, Interval::new(0.001, 1000.0)).is_none());
        assert!(scene.hit(&ray, Interval::FORWARD).is_some());
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::default();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(scene.is_empty());
        assert!(scene.hit(&ray, Interval::FORWARD).is_none());
    }

    #[test]
    fn test_demo_scene() {
        let scene = Scene::demo().unwrap();
        assert_eq!(scene.len(), 8);

        let metals = scene
            .spheres()
            .iter()
            .filter(|s| matches!(s.material(), Material::Metal { .. }))
            .count();
        assert_eq!(metals, 3);

        // Looking straight down hits the ground sphere
        let ray = Ray::new(Vec3::new(0.0, 5.0, 4.0), Vec3::NEG_Y);
        let rec = scene.hit(&ray, Interval::new(0.001, 1000.0)).unwrap();
        assert!(rec.p.y.abs() < 0.1);
        assert_eq!(rec.color, Color::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "spheres": [
                { "center": [0.0, 0.5, 0.0], "radius": 0.5,
                  "material": { "type": "lambertian", "albedo": [0.6, 0.6, 0.6] } },
                { "center": [2.0, 0.5, 0.0], "radius": 0.5,
                  "material": { "type": "metal", "albedo": [0.8, 0.8, 0.8], "fuzz": 0.1 } }
            ]
        }"#;

        let scene = Scene::from_json(json).unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(
            *scene.spheres()[1].material(),
            Material::metal(Color::new(0.8, 0.8, 0.8), 0.1)
        );
    }

    #[test]
    fn test_from_json_rejects_bad_radius() {
        let json = r#"{ "spheres": [
            { "center": [0, 0, 0], "radius": -2,
              "material": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] } }
        ] }"#;

        assert!(matches!(
            Scene::from_json(json),
            Err(SceneError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            Scene::from_json("{ \"spheres\": [ { \"radius\": 1 } ] }"),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn test_description_rebuilds_same_scene() {
        let scene = Scene::demo().unwrap();
        let json = serde_json::to_string(&SceneDescription::from(&scene)).unwrap();
        let rebuilt = Scene::from_json(&json).unwrap();
        assert_eq!(rebuilt.spheres(), scene.spheres());
    }
}
