//! Orbit camera controls
//!
//! Rotates the camera around a target point. Zoom and pan can be switched
//! off, which is how the interior view pins the camera at the driver seat
//! while still allowing the user to look around.

use glam::{Vec2, Vec3};

use super::Camera;

/// Per-frame pointer input for the orbit controls
#[derive(Debug, Clone, Default)]
pub struct CameraInput {
    /// Pointer delta since last frame (in pixels)
    pub mouse_delta: Vec2,

    /// Mouse scroll delta (positive = scroll up / zoom in)
    pub scroll_delta: f32,

    /// Primary button held: orbit
    pub orbit_active: bool,

    /// Secondary button held: pan
    pub pan_active: bool,
}

impl CameraInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame deltas (call after update)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}

/// Orbit camera controller
///
/// - Drag: orbit around target
/// - Scroll: zoom (change distance) when `enable_zoom`
/// - Secondary drag: move the target when `enable_pan`
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Target point to orbit around
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Current azimuth angle (horizontal) in radians
    pub azimuth: f32,
    /// Current elevation angle (vertical) in radians
    pub elevation: f32,
    /// Lowest elevation, derived from the max polar angle
    pub min_elevation: f32,
    pub max_elevation: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
    /// Zoom factor per scroll unit
    pub zoom_factor: f32,
    /// Target movement per pixel, scaled by distance
    pub pan_sensitivity: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 10.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            azimuth: 0.0,
            elevation: std::f32::consts::FRAC_PI_6,
            min_elevation: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_elevation: std::f32::consts::FRAC_PI_2 - 0.01,
            enable_pan: true,
            enable_zoom: true,
            orbit_sensitivity: 0.005,
            zoom_factor: 1.1,
            pan_sensitivity: 0.001,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            ..Default::default()
        }
    }

    /// Keep the camera at or above the horizon plane of the target when the
    /// max polar angle is 90 degrees
    pub fn with_max_polar_angle(mut self, degrees: f32) -> Self {
        self.min_elevation = std::f32::consts::FRAC_PI_2 - degrees.to_radians();
        self.elevation = self.elevation.clamp(self.min_elevation, self.max_elevation);
        self
    }

    pub fn set_distance_bounds(&mut self, min: f32, max: f32) {
        self.min_distance = min;
        self.max_distance = max.max(min);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Place the camera at `position` looking at `target`. Angles are derived
    /// from the offset and the distance is clamped to the current bounds.
    pub fn set_view(&mut self, position: Vec3, target: Vec3) {
        self.target = target;
        let offset = position - target;
        let length = offset.length();
        if length > f32::EPSILON {
            self.elevation = (offset.y / length)
                .asin()
                .clamp(self.min_elevation, self.max_elevation);
            self.azimuth = offset.z.atan2(offset.x);
        }
        self.distance = length.clamp(self.min_distance, self.max_distance);
    }

    /// Camera position from orbit parameters
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.elevation.cos() * self.azimuth.cos();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.elevation.cos() * self.azimuth.sin();
        self.target + Vec3::new(x, y, z)
    }

    /// Write position and target into the camera
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position();
        camera.target = self.target;
    }

    /// Right direction for panning (on XZ plane based on azimuth)
    fn right_direction(&self) -> Vec3 {
        Vec3::new(-self.azimuth.sin(), 0.0, self.azimuth.cos())
    }

    pub fn update(&mut self, camera: &mut Camera, input: &CameraInput, _dt: f32) {
        if self.enable_zoom && input.scroll_delta != 0.0 {
            if input.scroll_delta > 0.0 {
                self.distance /= self.zoom_factor;
            } else {
                self.distance *= self.zoom_factor;
            }
        }
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if input.orbit_active && input.mouse_delta != Vec2::ZERO {
            self.azimuth += input.mouse_delta.x * self.orbit_sensitivity;
            self.elevation += input.mouse_delta.y * self.orbit_sensitivity;
            self.elevation = self.elevation.clamp(self.min_elevation, self.max_elevation);
            self.azimuth %= std::f32::consts::TAU;
        }

        if self.enable_pan && input.pan_active && input.mouse_delta != Vec2::ZERO {
            let scale = self.pan_sensitivity * self.distance;
            self.target -= self.right_direction() * input.mouse_delta.x * scale;
            self.target += Vec3::Y * input.mouse_delta.y * scale;
        }

        self.apply(camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_view_round_trips_position() {
        let mut controls = OrbitControls::default().with_max_polar_angle(90.0);
        controls.set_distance_bounds(4.0, 12.0);
        controls.set_view(Vec3::new(4.25, 1.0, 0.0), Vec3::new(0.0, 0.5, 0.0));
        assert!(controls.position().abs_diff_eq(Vec3::new(4.25, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn set_view_clamps_distance() {
        let mut controls = OrbitControls::default();
        controls.set_distance_bounds(0.5, 0.5);
        controls.set_view(Vec3::new(0.0, 1.2, 0.0), Vec3::new(0.0, 1.15, 0.1));
        assert!((controls.distance - 0.5).abs() < 1e-6);
        assert!(((controls.position() - controls.target).length() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn zoom_disabled_ignores_scroll() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::new(Vec3::ZERO, 6.0);
        controls.set_distance_bounds(4.0, 12.0);
        controls.enable_zoom = false;

        let input = CameraInput {
            scroll_delta: 1.0,
            ..Default::default()
        };
        controls.update(&mut camera, &input, 0.016);
        assert_eq!(controls.distance, 6.0);

        controls.enable_zoom = true;
        controls.update(&mut camera, &input, 0.016);
        assert!(controls.distance < 6.0);
    }

    #[test]
    fn elevation_stays_above_horizon() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::new(Vec3::ZERO, 5.0).with_max_polar_angle(90.0);
        let input = CameraInput {
            mouse_delta: Vec2::new(0.0, -10_000.0),
            orbit_active: true,
            ..Default::default()
        };
        controls.update(&mut camera, &input, 0.016);
        assert!(controls.elevation >= 0.0);
        assert!(camera.position.y >= -1e-5);
    }

    #[test]
    fn pan_disabled_keeps_target() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::new(Vec3::new(0.0, 0.5, 0.0), 5.0);
        controls.enable_pan = false;
        let input = CameraInput {
            mouse_delta: Vec2::new(50.0, 20.0),
            pan_active: true,
            ..Default::default()
        };
        controls.update(&mut camera, &input, 0.016);
        assert_eq!(controls.target, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(camera.target, controls.target);
    }
}
