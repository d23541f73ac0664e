//! Viewer configuration
//!
//! One viewer, parameterized by asset paths, camera bundles and environment.
//! [`ViewerConfig::default`] is the interactive Volvo S90 configurator;
//! [`ViewerConfig::showroom`] is the brighter turntable variant.

use glam::Vec3;

use crate::error::{ViewerError, ViewerResult};
use crate::resources::MaterialSlot;
use crate::viewer::{CameraParams, PickTable, DAMPING, OPEN_ANGLE};

/// Camera projection and the two view bundles
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Largest angle between the up axis and the view offset
    pub max_polar_angle_degrees: f32,
    pub exterior: CameraParams,
    pub interior: CameraParams,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 40.0,
            near: 0.1,
            far: 100.0,
            max_polar_angle_degrees: 90.0,
            exterior: CameraParams::exterior(),
            interior: CameraParams::interior(),
        }
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

/// Ground grid drawn under the car
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub size: f32,
    pub divisions: u32,
    pub color: Vec3,
    pub opacity: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            divisions: 40,
            color: Vec3::ONE,
            opacity: 0.2,
        }
    }
}

/// Parameters passed through to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    /// Tone-mapping exposure
    pub exposure: f32,
    pub background: Vec3,
    pub fog: Option<Fog>,
    pub ambient_intensity: f32,
    pub grid: GridConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        let background = Vec3::splat(0x33 as f32 / 255.0);
        Self {
            exposure: 0.4,
            background,
            fog: Some(Fog {
                color: background,
                near: 10.0,
                far: 15.0,
            }),
            ambient_intensity: 0.5,
            grid: GridConfig::default(),
        }
    }
}

/// Configuration for a viewer instance
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub model_path: String,
    /// Equirectangular HDR used for reflections
    pub environment_map_path: String,
    pub camera: CameraConfig,
    pub environment: EnvironmentConfig,
    /// Hinge angle of a fully open door, in radians
    pub door_open_angle: f32,
    /// Fraction of the remaining hinge angle covered per frame, in (0, 1)
    pub door_damping: f32,
    pub pick_table: PickTable,
    /// Authored material name → viewer material slot
    pub material_bindings: Vec<(String, MaterialSlot)>,
    /// Meshes rendered with a depth bias so they sit on top of the body
    pub decal_meshes: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Car Viewer".to_string(),
            model_path: "models/gltf/VolvoS90/volvos90.gltf".to_string(),
            environment_map_path: "textures/equirectangular/venice_sunset_1k.hdr".to_string(),
            camera: CameraConfig::default(),
            environment: EnvironmentConfig::default(),
            door_open_angle: OPEN_ANGLE,
            door_damping: DAMPING,
            pick_table: PickTable::standard(),
            material_bindings: vec![
                ("Car Paint".to_string(), MaterialSlot::Paint),
                ("Glass".to_string(), MaterialSlot::Glass),
                ("Glass headlights".to_string(), MaterialSlot::Glass),
            ],
            decal_meshes: vec!["Lettering_Rear_2".to_string()],
        }
    }
}

impl ViewerConfig {
    /// Brighter turntable variant with a wider starting angle
    pub fn showroom() -> Self {
        let mut config = Self::default();
        config.title = "Car Showroom".to_string();
        config.environment.exposure = 0.85;
        config.camera.exterior = CameraParams {
            position: Vec3::new(4.25, 1.4, -4.5),
            min_distance: 0.0,
            max_distance: 9.0,
            ..CameraParams::exterior()
        };
        config
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> ViewerResult<Self> {
        match name {
            "default" | "volvo" => Ok(Self::default()),
            "showroom" => Ok(Self::showroom()),
            other => Err(ViewerError::InvalidConfig(format!("unknown preset '{other}'"))),
        }
    }

    pub fn with_model_path(mut self, path: &str) -> Self {
        self.model_path = path.to_string();
        self
    }

    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.environment.exposure = exposure;
        self
    }

    pub fn with_door_damping(mut self, damping: f32) -> Self {
        self.door_damping = damping;
        self
    }

    pub fn with_pick_table(mut self, table: PickTable) -> Self {
        self.pick_table = table;
        self
    }

    pub fn with_material_binding(mut self, material: &str, slot: MaterialSlot) -> Self {
        self.material_bindings.push((material.to_string(), slot));
        self
    }

    /// Slot bound to an authored material name
    pub fn slot_for_material(&self, material: &str) -> Option<MaterialSlot> {
        self.material_bindings
            .iter()
            .find(|(name, _)| name == material)
            .map(|(_, slot)| *slot)
    }

    pub fn validate(&self) -> ViewerResult<()> {
        let fail = |msg: String| Err(ViewerError::InvalidConfig(msg));

        if !(self.door_damping > 0.0 && self.door_damping < 1.0) {
            return fail(format!("door damping {} must be in (0, 1)", self.door_damping));
        }
        if !(self.door_open_angle > 0.0 && self.door_open_angle <= std::f32::consts::PI) {
            return fail(format!("door open angle {} must be in (0, pi]", self.door_open_angle));
        }
        if !(self.environment.exposure.is_finite() && self.environment.exposure > 0.0) {
            return fail(format!("exposure {} must be positive", self.environment.exposure));
        }

        let camera = &self.camera;
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) {
            return fail(format!("field of view {} out of range", camera.fov_y_degrees));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return fail(format!("clip planes {}..{} are invalid", camera.near, camera.far));
        }
        for (label, params) in [("exterior", &camera.exterior), ("interior", &camera.interior)] {
            if !(params.position.is_finite() && params.target.is_finite()) {
                return fail(format!("{label} camera has non-finite coordinates"));
            }
            if !(params.min_distance >= 0.0 && params.max_distance >= params.min_distance) {
                return fail(format!(
                    "{label} distance bounds {}..{} are invalid",
                    params.min_distance, params.max_distance
                ));
            }
        }

        if let Some(fog) = &self.environment.fog {
            if !(fog.near >= 0.0 && fog.far > fog.near) {
                return fail(format!("fog range {}..{} is invalid", fog.near, fog.far));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        ViewerConfig::default().validate().unwrap();
        ViewerConfig::showroom().validate().unwrap();
    }

    #[test]
    fn showroom_differs_only_cosmetically() {
        let base = ViewerConfig::default();
        let showroom = ViewerConfig::showroom();
        assert_eq!(showroom.environment.exposure, 0.85);
        assert_eq!(showroom.camera.exterior.max_distance, 9.0);
        assert_eq!(showroom.camera.interior, base.camera.interior);
        assert_eq!(showroom.model_path, base.model_path);
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(ViewerConfig::preset("showroom").unwrap(), ViewerConfig::showroom());
        assert!(matches!(
            ViewerConfig::preset("garage"),
            Err(ViewerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn damping_outside_unit_interval_is_rejected() {
        for damping in [0.0, 1.0, -0.2, f32::NAN] {
            let config = ViewerConfig::default().with_door_damping(damping);
            assert!(config.validate().is_err(), "accepted {damping}");
        }
    }

    #[test]
    fn inverted_distance_bounds_are_rejected() {
        let mut config = ViewerConfig::default();
        config.camera.interior.min_distance = 2.0;
        config.camera.interior.max_distance = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn material_bindings_resolve() {
        let config = ViewerConfig::default().with_material_binding("Chrome", MaterialSlot::Details);
        assert_eq!(config.slot_for_material("Glass headlights"), Some(MaterialSlot::Glass));
        assert_eq!(config.slot_for_material("Chrome"), Some(MaterialSlot::Details));
        assert_eq!(config.slot_for_material("Rubber"), None);
    }
}
