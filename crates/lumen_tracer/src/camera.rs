//! Camera for ray generation.

use crate::Ray;
use lumen_math::Vec3;

/// Pinhole camera looking from an eye position toward a target.
///
/// Cheap to rebuild; the progressive renderer derives a fresh
/// [`ViewBasis`] every frame because the eye may move between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32, // Vertical field of view in degrees
    aspect: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::new(0.0, 0.0, 7.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 45.0,
            aspect: 1.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Set the width / height ratio of the image plane.
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Move the eye, keeping target and lens.
    pub fn set_eye(&mut self, look_from: Vec3) {
        self.look_from = look_from;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn eye(&self) -> Vec3 {
        self.look_from
    }

    pub fn target(&self) -> Vec3 {
        self.look_at
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Compute the orthonormal frame and image-plane vectors.
    pub fn basis(&self) -> ViewBasis {
        // Calculate viewport dimensions
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect * viewport_height;

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let horizontal = u * viewport_width;
        let vertical = v * viewport_height;
        let lower_left_corner = self.look_from - horizontal / 2.0 - vertical / 2.0 - w;

        ViewBasis {
            origin: self.look_from,
            horizontal,
            vertical,
            lower_left_corner,
            u,
            v,
            w,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame ray-generating frame of a [`Camera`].
///
/// The image plane sits one unit in front of the eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub origin: Vec3,
    pub horizontal: Vec3,
    pub vertical: Vec3,
    pub lower_left_corner: Vec3,
    /// Camera right
    pub u: Vec3,
    /// Camera up
    pub v: Vec3,
    /// Points from the target back toward the eye
    pub w: Vec3,
}

impl ViewBasis {
    /// Primary ray through normalized screen coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner of the image plane.
    #[inline]
    pub fn ray(&self, s: f32, t: f32) -> Ray {
        Ray::new(
            self.origin,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin,
        )
    }
}
