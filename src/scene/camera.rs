//! Perspective camera

use glam::{Mat4, Vec2, Vec3};

use super::picking::Ray;

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(40.0, 16.0 / 9.0, 0.1, 100.0)
    }
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Camera for viewing the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::default(),
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, projection: Projection) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            projection,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection.matrix() * self.view_matrix()
    }

    /// Update aspect ratio from viewport dimensions
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.projection.aspect = width / height;
        }
    }

    /// World-space ray through a point in normalized device coordinates (-1..1)
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection_matrix().inverse();
        let near = inv * ndc.extend(0.0).extend(1.0);
        let far = inv * ndc.extend(1.0).extend(1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Ray::new(self.position, far - near)
    }

    /// World-space ray through a pixel of a viewport of the given size
    pub fn ray_from_screen(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        let ndc = Vec2::new((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0);
        self.ray_from_ndc(ndc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_points_at_target() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Projection::default());
        let ray = camera.ray_from_screen(400.0, 300.0, 800.0, 600.0);
        assert!(ray.direction.abs_diff_eq(-Vec3::Z, 1e-4));
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn aspect_ignores_empty_viewport() {
        let mut camera = Camera::default();
        let before = camera.projection.aspect;
        camera.set_aspect(0.0, 100.0);
        assert_eq!(camera.projection.aspect, before);
        camera.set_aspect(200.0, 100.0);
        assert_eq!(camera.projection.aspect, 2.0);
    }
}
