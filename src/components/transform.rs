//! Spatial state of a game object.

use bevy_math::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, orientation and scale of an object in world space.
///
/// Owned by value: cloning an object always yields an independent transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set rotation from Euler angles in degrees (X, then Y, then Z).
    pub fn with_rotation_degrees(mut self, degrees: Vec3) -> Self {
        self.set_rotation_degrees(degrees);
        self
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
    }

    pub fn set_rotation_degrees(&mut self, degrees: Vec3) {
        self.rotation = Quat::from_euler(
            EulerRot::XYZ,
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
    }

    /// Rotate by additional Euler angles in degrees.
    pub fn rotate_degrees(&mut self, degrees: Vec3) {
        let delta = Quat::from_euler(
            EulerRot::XYZ,
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
        self.rotation = (delta * self.rotation).normalize();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Facing direction; -Z in local space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Map a point from local space to world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (point * self.scale)
    }
}

/// Serialized form of a [`Transform`] used in level files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformData {
    pub translation: [f32; 3],
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl From<TransformData> for Transform {
    fn from(data: TransformData) -> Self {
        Transform::from_translation(Vec3::from_array(data.translation))
            .with_rotation_degrees(Vec3::from_array(data.rotation))
            .with_scale(Vec3::from_array(data.scale))
    }
}
