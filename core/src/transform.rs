//! Actor transforms. Each actor owns exactly one and is the only writer.
//!
//! Facing convention: local +Z is "forward"; yaw rotates about +Y, so a
//! yaw of 0 faces +Z and a yaw of π/2 faces +X.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale:    Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.rotation = Quat::from_rotation_y(yaw);
    }

    /// Turn about +Y so forward points at `target` in the XZ plane.
    /// Leaves rotation unchanged when `target` is directly above/below.
    pub fn face_towards(&mut self, target: Vec3) {
        if let Some(yaw) = yaw_towards(self.position, target) {
            self.set_yaw(yaw);
        }
    }

    /// Turn about +Y so forward points directly away from `target`.
    pub fn face_away_from(&mut self, target: Vec3) {
        if let Some(yaw) = yaw_towards(target, self.position) {
            self.set_yaw(yaw);
        }
    }

    pub fn translate_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }
}

/// Yaw that makes +Z point from `from` toward `to`, ignoring height.
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx.abs() < f32::EPSILON && dz.abs() < f32::EPSILON {
        return None;
    }
    Some(dx.atan2(dz))
}

/// Shortest signed angle from yaw `a` to yaw `b`, in (-π, π].
pub fn yaw_delta(a: f32, b: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut d = (b - a) % TAU;
    if d > PI {
        d -= TAU;
    } else if d <= -PI {
        d += TAU;
    }
    d
}

/// Yaw of a rotation's forward vector.
pub fn yaw_of(rotation: Quat) -> f32 {
    let f = rotation * Vec3::Z;
    f.x.atan2(f.z)
}
