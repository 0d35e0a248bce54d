//! Orbit controller turning pointer drags into eye positions.
//!
//! Drag deltas move a target yaw/pitch; every `update` eases the current
//! angles toward the target, so the eye keeps moving for a while after the
//! drag stops. Each distinct eye it produces invalidates the accumulated
//! image.

use std::f32::consts::FRAC_PI_2;

use lumen_math::{Mat3, Vec3};

/// Radians of rotation per pixel of drag.
const DRAG_SENSITIVITY: f32 = 0.01;
/// Fraction of the remaining angle covered per update.
const SMOOTHING: f32 = 0.05;
/// Below this difference the current angle snaps to the target.
const SNAP_EPSILON: f32 = 0.01;
/// Keeps pitch strictly inside (-pi/2, pi/2) so the view never flips.
const PITCH_MARGIN: f32 = 0.01;

/// Smoothed yaw/pitch orbit around the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitController {
    target_yaw: f32,
    target_pitch: f32,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl OrbitController {
    /// Orbit at `distance` from the origin, looking down -Z.
    pub fn new(distance: f32) -> Self {
        Self {
            target_yaw: 0.0,
            target_pitch: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            distance,
        }
    }

    /// Start at the given angles with no easing pending.
    pub fn with_angles(mut self, yaw: f32, pitch: f32) -> Self {
        self.target_yaw = yaw;
        self.target_pitch = Self::clamp_pitch(pitch);
        self.yaw = self.target_yaw;
        self.pitch = self.target_pitch;
        self
    }

    /// Apply a pointer drag of `(dx, dy)` pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.target_yaw += dx * DRAG_SENSITIVITY;
        self.target_pitch = Self::clamp_pitch(self.target_pitch + dy * DRAG_SENSITIVITY);
    }

    /// Ease toward the target angles and return the new eye position.
    pub fn update(&mut self) -> Vec3 {
        self.yaw = ease(self.yaw, self.target_yaw);
        self.pitch = ease(self.pitch, self.target_pitch);
        self.eye()
    }

    /// Eye position for the current (not target) angles.
    pub fn eye(&self) -> Vec3 {
        Mat3::from_rotation_y(-self.yaw)
            * Mat3::from_rotation_x(-self.pitch)
            * Vec3::new(0.0, 0.0, self.distance)
    }

    /// True while the current angles still differ from the target.
    pub fn is_settling(&self) -> bool {
        self.yaw != self.target_yaw || self.pitch != self.target_pitch
    }

    fn clamp_pitch(pitch: f32) -> f32 {
        if pitch <= -FRAC_PI_2 {
            -FRAC_PI_2 + PITCH_MARGIN
        } else if pitch >= FRAC_PI_2 {
            FRAC_PI_2 - PITCH_MARGIN
        } else {
            pitch
        }
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(7.0)
    }
}

#[inline]
fn ease(current: f32, target: f32) -> f32 {
    if (target - current).abs() < SNAP_EPSILON {
        target
    } else {
        current + SMOOTHING * (target - current)
    }
}
