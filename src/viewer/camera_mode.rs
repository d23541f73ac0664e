//! Exterior orbit view and interior driver-seat view

use glam::Vec3;

use crate::scene::{Camera, OrbitControls};

/// Which view the camera is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Exterior,
    Interior,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Exterior => CameraMode::Interior,
            CameraMode::Interior => CameraMode::Exterior,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CameraMode::Exterior => "exterior",
            CameraMode::Interior => "interior",
        }
    }
}

/// Everything a view mode sets on the camera and orbit controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub position: Vec3,
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
}

impl CameraParams {
    /// Orbiting the whole car from outside
    pub fn exterior() -> Self {
        Self {
            position: Vec3::new(4.25, 1.0, 0.0),
            target: Vec3::new(0.0, 0.5, 0.0),
            min_distance: 4.0,
            max_distance: 12.0,
            enable_pan: true,
            enable_zoom: true,
        }
    }

    /// Driver's seat, looking ahead. Distance is pinned so the user can
    /// only look around.
    pub fn interior() -> Self {
        Self {
            position: Vec3::new(0.0, 1.2, 0.0),
            target: Vec3::new(0.0, 1.15, 0.1),
            min_distance: 0.5,
            max_distance: 0.5,
            enable_pan: false,
            enable_zoom: false,
        }
    }

    /// Push these parameters into the controls and camera in one step
    pub fn apply(&self, controls: &mut OrbitControls, camera: &mut Camera) {
        controls.set_distance_bounds(self.min_distance, self.max_distance);
        controls.enable_pan = self.enable_pan;
        controls.enable_zoom = self.enable_zoom;
        controls.set_view(self.position, self.target);
        controls.apply(camera);
    }
}

/// Two-state switch between the exterior and interior bundles
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModeSwitch {
    mode: CameraMode,
    exterior: CameraParams,
    interior: CameraParams,
}

impl Default for CameraModeSwitch {
    fn default() -> Self {
        Self::new(CameraParams::exterior(), CameraParams::interior())
    }
}

impl CameraModeSwitch {
    pub fn new(exterior: CameraParams, interior: CameraParams) -> Self {
        Self {
            mode: CameraMode::Exterior,
            exterior,
            interior,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn params(&self, mode: CameraMode) -> &CameraParams {
        match mode {
            CameraMode::Exterior => &self.exterior,
            CameraMode::Interior => &self.interior,
        }
    }

    pub fn active_params(&self) -> &CameraParams {
        self.params(self.mode)
    }

    /// Apply the current mode's bundle without switching
    pub fn apply(&self, controls: &mut OrbitControls, camera: &mut Camera) {
        self.active_params().apply(controls, camera);
    }

    /// Flip the mode and apply the new bundle
    pub fn toggle_view(&mut self, controls: &mut OrbitControls, camera: &mut Camera) -> CameraMode {
        self.mode = self.mode.toggled();
        self.apply(controls, camera);
        log::info!("Camera view: {}", self.mode.name());
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CameraModeSwitch, OrbitControls, Camera) {
        let switch = CameraModeSwitch::default();
        let mut controls = OrbitControls::default().with_max_polar_angle(90.0);
        let mut camera = Camera::default();
        switch.apply(&mut controls, &mut camera);
        (switch, controls, camera)
    }

    #[test]
    fn toggle_applies_interior_bundle() {
        let (mut switch, mut controls, mut camera) = setup();
        assert_eq!(switch.toggle_view(&mut controls, &mut camera), CameraMode::Interior);
        assert!(!controls.enable_pan);
        assert!(!controls.enable_zoom);
        assert_eq!(controls.min_distance, 0.5);
        assert_eq!(controls.max_distance, 0.5);
        assert_eq!(camera.target, Vec3::new(0.0, 1.15, 0.1));
    }

    #[test]
    fn toggling_twice_restores_everything() {
        let (mut switch, mut controls, mut camera) = setup();
        let controls_before = controls.clone();
        let camera_before = camera.clone();

        switch.toggle_view(&mut controls, &mut camera);
        switch.toggle_view(&mut controls, &mut camera);

        assert_eq!(switch.mode(), CameraMode::Exterior);
        assert_eq!(controls, controls_before);
        assert_eq!(camera, camera_before);
    }

    #[test]
    fn exterior_camera_sits_at_bundle_position() {
        let (_, _, camera) = setup();
        assert!(camera.position.abs_diff_eq(Vec3::new(4.25, 1.0, 0.0), 1e-5));
        assert_eq!(camera.target, Vec3::new(0.0, 0.5, 0.0));
    }
}
