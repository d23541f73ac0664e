//! Node transform

use glam::{Mat4, Quat, Vec3};

/// Local transform of a scene node (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Build from glTF-style decomposed arrays (translation, xyzw rotation, scale)
    pub fn from_decomposed(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            position: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation).normalize(),
            scale: Vec3::from_array(scale),
        }
    }

    /// Get the local matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rotation composed from a rest pose and an angle around local X
    pub fn with_x_rotation(base: Quat, angle: f32) -> Quat {
        base * Quat::from_rotation_x(angle)
    }

    /// Rotation composed from a rest pose and an angle around local Y
    pub fn with_y_rotation(base: Quat, angle: f32) -> Quat {
        base * Quat::from_rotation_y(angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposed_rotation_is_normalized() {
        let t = Transform::from_decomposed([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 2.0], [1.0; 3]);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((t.rotation.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn y_rotation_composes_after_base() {
        let base = Quat::from_rotation_x(0.3);
        let q = Transform::with_y_rotation(base, 0.5);
        let expected = Quat::from_rotation_x(0.3) * Quat::from_rotation_y(0.5);
        assert!(q.abs_diff_eq(expected, 1e-6));
    }
}
