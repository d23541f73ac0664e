//! Scene interaction controller
//!
//! Owns every piece of viewer state. UI events and clicks go through
//! [`ViewerController::dispatch`] and [`ViewerController::pick_at`]; the
//! host calls [`ViewerController::frame`] once per rendered frame, which
//! advances the animations and writes the resulting poses into the scene.

use glam::Quat;

use crate::assets;
use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::resources::{MaterialLibrary, MaterialSlot};
use crate::scene::{
    raycast, Camera, CameraInput, NodeId, OrbitControls, Projection, SceneGraph, Transform,
};

use super::camera_mode::{CameraMode, CameraModeSwitch};
use super::commands::{CommandTable, Invocation};
use super::doors::{DoorId, DoorTracker};
use super::motion::MotionState;
use super::pick::PickDispatcher;

const WHEEL_PARTS: [&str; 4] = ["Rim", "Tire", "Wheelhub", "Brake_Disc"];

/// Names of every node that spins with the wheels
pub fn wheel_node_names() -> Vec<String> {
    WHEEL_PARTS
        .iter()
        .flat_map(|part| {
            DoorId::ALL
                .iter()
                .map(move |corner| format!("{}_{}", part, corner.code()))
        })
        .collect()
}

/// Interaction state, independent of any loaded model
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub doors: DoorTracker,
    pub camera_mode: CameraModeSwitch,
    pub motion: MotionState,
    pub pick: PickDispatcher,
    pub materials: MaterialLibrary,
}

/// Animated node with the rotation it had when the model was bound
#[derive(Debug, Clone, Copy)]
struct Animated {
    node: NodeId,
    rest: Quat,
}

/// References into the bound model. Absent nodes are simply not animated.
#[derive(Debug, Clone, Default)]
struct ModelBindings {
    hinges: [Option<Animated>; 4],
    wheels: Vec<Animated>,
    missing: Vec<String>,
}

impl ModelBindings {
    fn resolve(scene: &SceneGraph) -> Self {
        let mut bindings = Self::default();
        let find = |name: &str, missing: &mut Vec<String>| {
            let found = scene.find_by_name(name).and_then(|id| {
                scene.node(id).map(|n| Animated {
                    node: id,
                    rest: n.transform.rotation,
                })
            });
            if found.is_none() {
                log::warn!("{}", ViewerError::MissingNamedObject(name.to_string()));
                missing.push(name.to_string());
            }
            found
        };

        for (slot, door) in DoorId::ALL.into_iter().enumerate() {
            bindings.hinges[slot] = find(door.hinge_node(), &mut bindings.missing);
        }
        for name in wheel_node_names() {
            if let Some(wheel) = find(&name, &mut bindings.missing) {
                bindings.wheels.push(wheel);
            }
        }
        bindings
    }
}

/// Single owner of the viewer's state and the bound model
pub struct ViewerController {
    config: ViewerConfig,
    state: ViewerState,
    commands: CommandTable,
    scene: SceneGraph,
    bindings: ModelBindings,
    camera: Camera,
    controls: OrbitControls,
    grid_offset: f32,
    placeholder: bool,
}

impl ViewerController {
    pub fn new(config: ViewerConfig) -> ViewerResult<Self> {
        config.validate()?;

        let camera_config = &config.camera;
        let mut camera = Camera::new(
            camera_config.exterior.position,
            camera_config.exterior.target,
            Projection::perspective(
                camera_config.fov_y_degrees,
                16.0 / 9.0,
                camera_config.near,
                camera_config.far,
            ),
        );
        let mut controls =
            OrbitControls::default().with_max_polar_angle(camera_config.max_polar_angle_degrees);
        let camera_mode = CameraModeSwitch::new(camera_config.exterior, camera_config.interior);
        camera_mode.apply(&mut controls, &mut camera);

        let state = ViewerState {
            doors: DoorTracker::new(config.door_open_angle, config.door_damping),
            camera_mode,
            motion: MotionState::new(),
            pick: PickDispatcher::new(config.pick_table.clone()),
            materials: MaterialLibrary::new(),
        };

        Ok(Self {
            config,
            state,
            commands: CommandTable::standard(),
            scene: SceneGraph::new(),
            bindings: ModelBindings::default(),
            camera,
            controls,
            grid_offset: 0.0,
            placeholder: false,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Z position of the ground grid
    pub fn grid_offset(&self) -> f32 {
        self.grid_offset
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Door, wheel and hinge names the bound model lacks
    pub fn missing_objects(&self) -> &[String] {
        &self.bindings.missing
    }

    /// Take ownership of a loaded model: resolve animated nodes, swap bound
    /// materials for the viewer's own and flag decals
    pub fn bind_model(&mut self, mut scene: SceneGraph) {
        let ids: Vec<NodeId> = scene.mesh_nodes().collect();
        for id in ids {
            let Some(node) = scene.node_mut(id) else {
                continue;
            };
            let is_decal = self.config.decal_meshes.iter().any(|d| *d == node.name);
            let Some(mesh) = node.mesh.as_mut() else {
                continue;
            };
            for primitive in &mut mesh.primitives {
                primitive.slot = primitive
                    .material_name
                    .as_deref()
                    .and_then(|name| self.config.slot_for_material(name));
            }
            if is_decal {
                mesh.polygon_offset = Some((-10.0, -1.0));
            }
        }

        self.bindings = ModelBindings::resolve(&scene);
        self.scene = scene;
        self.placeholder = false;
        log::info!(
            "Model bound: {} hinges, {} wheel parts",
            self.bindings.hinges.iter().flatten().count(),
            self.bindings.wheels.len()
        );
    }

    /// Bind a load result, falling back to the placeholder model on failure.
    /// Returns whether the real model was bound.
    pub fn load_model_or_placeholder(&mut self, result: ViewerResult<SceneGraph>) -> bool {
        match result {
            Ok(scene) => {
                self.bind_model(scene);
                true
            }
            Err(e) => {
                log::error!("{e}; showing placeholder");
                self.bind_model(assets::placeholder_model());
                self.placeholder = true;
                false
            }
        }
    }

    pub fn toggle_door(&mut self, door: DoorId) {
        self.state.doors.toggle_door(door);
    }

    pub fn toggle_view(&mut self) -> CameraMode {
        self.state
            .camera_mode
            .toggle_view(&mut self.controls, &mut self.camera)
    }

    pub fn toggle_motion(&mut self) -> bool {
        self.state.motion.toggle_motion()
    }

    pub fn set_color(&mut self, slot: MaterialSlot, value: &str) -> ViewerResult<()> {
        self.state.materials.set_color(slot, value)
    }

    /// Run the command bound to a UI control
    pub fn dispatch(&mut self, control: &str, value: Option<&str>) -> ViewerResult<()> {
        match self.commands.resolve(control, value)? {
            Invocation::ToggleDoor(door) => self.toggle_door(door),
            Invocation::ToggleView => {
                self.toggle_view();
            }
            Invocation::ToggleMotion => {
                self.toggle_motion();
            }
            Invocation::SetColor(slot, value) => self.set_color(slot, &value)?,
        }
        Ok(())
    }

    /// Toggle the door whose handle is `object`, if it is one
    pub fn pick_object(&mut self, object: &str) -> Option<DoorId> {
        self.state.pick.dispatch(object, &mut self.state.doors)
    }

    /// Resolve a click at pixel (`x`, `y`) of a `width`×`height` viewport
    pub fn pick_at(&mut self, x: f32, y: f32, width: f32, height: f32) -> Option<DoorId> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        self.camera.set_aspect(width, height);
        let ray = self.camera.ray_from_screen(x, y, width, height);
        let hit = raycast(&self.scene, &ray).into_iter().next()?;
        log::info!("Clicked object: {} at {:.2}", hit.name, hit.distance);
        self.pick_object(&hit.name)
    }

    /// Advance one frame. `time` is wall-clock seconds since start.
    pub fn frame(&mut self, time: f64, dt: f32, input: &CameraInput) {
        self.controls.update(&mut self.camera, input, dt);

        if let Some(pose) = self.state.motion.advance(time) {
            for wheel in &self.bindings.wheels {
                if let Some(node) = self.scene.node_mut(wheel.node) {
                    node.transform.rotation =
                        Transform::with_x_rotation(wheel.rest, pose.wheel_angle);
                }
            }
            self.grid_offset = pose.grid_offset;
        }

        self.state.doors.advance();
        for (door, hinge) in DoorId::ALL.into_iter().zip(self.bindings.hinges) {
            let Some(hinge) = hinge else {
                continue;
            };
            let angle = self.state.doors.state(door).current_angle;
            if let Some(node) = self.scene.node_mut(hinge.node) {
                node.transform.rotation = Transform::with_y_rotation(hinge.rest, angle);
            }
        }
    }

    /// Label for a door's toggle button
    pub fn door_label(&self, door: DoorId) -> String {
        self.state.doors.button_label(door)
    }
}
