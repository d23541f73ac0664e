//! Web front end
//!
//! Wires the page's controls to a [`ViewerController`] and exposes the
//! per-frame data a JavaScript renderer needs. The page drives the loop:
//!
//! ```js
//! const viewer = new WebViewer("default");
//! viewer.start("container");
//! viewer.load_model();
//! renderer.setAnimationLoop((now) => {
//!     viewer.frame(now);
//!     applyMatrices(viewer.node_names(), viewer.node_matrices());
//!     renderer.render(scene, camera);
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Mat4, Vec2};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::assets;
use crate::error::{ViewerError, ViewerResult};
use crate::init_web_logging;
use crate::resources::{format_hex_color, MaterialSlot};
use crate::scene::{CameraInput, SceneGraph};
use crate::viewer::{Command, DoorId, ViewerController};
use crate::ViewerConfig;

type Listener = Closure<dyn FnMut(web_sys::Event)>;

struct WebState {
    controller: ViewerController,
    input: CameraInput,
    last_frame_ms: Option<f64>,
    /// Kept alive for as long as the viewer exists
    listeners: Vec<Listener>,
}

/// Spawn a future on the browser's event loop
pub fn spawn_local<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Log a message to the browser console
#[wasm_bindgen]
pub fn console_log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document exists"))
}

/// Fetch a URL into memory
async fn fetch_bytes(url: &str) -> ViewerResult<Vec<u8>> {
    let fail = |reason: String| ViewerError::AssetLoad {
        path: url.to_string(),
        reason,
    };
    let window = web_sys::window().ok_or_else(|| fail("no global window".to_string()))?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fail(format!("{e:?}")))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| fail("fetch did not return a Response".to_string()))?;
    if !response.ok() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let buffer = response.array_buffer().map_err(|e| fail(format!("{e:?}")))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| fail(format!("{e:?}")))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Fetch a model and the buffers it references next to it
async fn fetch_model(url: &str) -> ViewerResult<SceneGraph> {
    let bytes = fetch_bytes(url).await?;
    let base = url.rfind('/').map_or("", |i| &url[..=i]);

    let mut external = HashMap::new();
    for uri in assets::external_buffer_uris(url, &bytes)? {
        let buffer = fetch_bytes(&format!("{base}{uri}")).await?;
        external.insert(uri, buffer);
    }
    assets::load_gltf_with_buffers(url, &bytes, &external)
}

/// Rewrite every door button to match its door's state
fn refresh_door_labels(controller: &ViewerController) {
    let Ok(document) = document() else {
        return;
    };
    for door in DoorId::ALL {
        if let Some(button) = document.get_element_by_id(door.control_id()) {
            button.set_inner_html(&format!(
                "<i class=\"fa-solid fa-door-open\"></i> {}",
                controller.door_label(door)
            ));
        }
    }
}

/// Viewer instance owned by the page
#[wasm_bindgen]
pub struct WebViewer {
    state: Rc<RefCell<WebState>>,
}

#[wasm_bindgen]
impl WebViewer {
    /// Create a viewer from a preset name ("default" or "showroom")
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str) -> Result<WebViewer, JsValue> {
        init_web_logging();
        let config = ViewerConfig::preset(preset).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let controller = ViewerController::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Viewer created with preset '{}'", preset);

        Ok(WebViewer {
            state: Rc::new(RefCell::new(WebState {
                controller,
                input: CameraInput::new(),
                last_frame_ms: None,
                listeners: Vec::new(),
            })),
        })
    }

    /// Register a listener for every control in the command table, plus
    /// click picking on the element with id `canvas_id`
    pub fn start(&self, canvas_id: &str) -> Result<(), JsValue> {
        let document = document()?;
        let controls: Vec<(String, Command)> = {
            let state = self.state.borrow();
            let commands = state.controller.commands();
            commands
                .controls()
                .into_iter()
                .filter_map(|id| commands.get(id).map(|c| (id.to_string(), c)))
                .collect()
        };

        let mut listeners = Vec::new();
        for (id, command) in controls {
            let Some(element) = document.get_element_by_id(&id) else {
                log::warn!("Page has no control '{}'", id);
                continue;
            };

            let state = Rc::clone(&self.state);
            let listener = if command.needs_value() {
                let Ok(input) = element.clone().dyn_into::<web_sys::HtmlInputElement>() else {
                    log::warn!("Control '{}' is not an input element", id);
                    continue;
                };
                let control = id.clone();
                Listener::new(move |_event: web_sys::Event| {
                    let value = input.value();
                    let mut state = state.borrow_mut();
                    if let Err(e) = state.controller.dispatch(&control, Some(&value)) {
                        log::warn!("{e}");
                    }
                })
            } else {
                let control = id.clone();
                Listener::new(move |_event: web_sys::Event| {
                    let mut state = state.borrow_mut();
                    if let Err(e) = state.controller.dispatch(&control, None) {
                        log::warn!("{e}");
                    }
                    refresh_door_labels(&state.controller);
                })
            };

            let event = if command.needs_value() { "input" } else { "click" };
            element.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
            listeners.push(listener);
        }

        if let Some(canvas) = document.get_element_by_id(canvas_id) {
            let state = Rc::clone(&self.state);
            let target = canvas.clone();
            let listener = Listener::new(move |event: web_sys::Event| {
                let Some(mouse) = event.dyn_ref::<web_sys::MouseEvent>() else {
                    return;
                };
                let rect = target.get_bounding_client_rect();
                let x = mouse.client_x() as f32 - rect.left() as f32;
                let y = mouse.client_y() as f32 - rect.top() as f32;

                let mut state = state.borrow_mut();
                let picked = state
                    .controller
                    .pick_at(x, y, rect.width() as f32, rect.height() as f32);
                if picked.is_some() {
                    refresh_door_labels(&state.controller);
                }
            });
            canvas.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
            listeners.push(listener);
        } else {
            log::warn!("Page has no canvas container '{}', picking disabled", canvas_id);
        }

        let mut state = self.state.borrow_mut();
        refresh_door_labels(&state.controller);
        state.listeners.extend(listeners);
        Ok(())
    }

    /// Fetch and bind the model, or the configured one when `url` is absent.
    /// A failed load is logged and replaced by the placeholder.
    pub fn load_model(&self, url: Option<String>) {
        let url = url.unwrap_or_else(|| self.state.borrow().controller.config().model_path.clone());
        let state = Rc::clone(&self.state);
        spawn_local(async move {
            let result = fetch_model(&url).await;
            state.borrow_mut().controller.load_model_or_placeholder(result);
        });
    }

    /// Run a control by id, as if the page had fired it
    pub fn dispatch(&self, control: &str, value: Option<String>) -> Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        state
            .controller
            .dispatch(control, value.as_deref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        refresh_door_labels(&state.controller);
        Ok(())
    }

    /// Pick at a viewport pixel; returns the toggled door's code
    pub fn click(&self, x: f32, y: f32, width: f32, height: f32) -> Option<String> {
        let mut state = self.state.borrow_mut();
        let door = state.controller.pick_at(x, y, width, height)?;
        refresh_door_labels(&state.controller);
        Some(door.code().to_string())
    }

    /// Accumulate pointer motion for the next frame
    pub fn pointer(&self, dx: f32, dy: f32, orbit: bool, pan: bool) {
        let mut state = self.state.borrow_mut();
        state.input.mouse_delta += Vec2::new(dx, dy);
        state.input.orbit_active = orbit;
        state.input.pan_active = pan;
    }

    pub fn wheel(&self, delta: f32) {
        self.state.borrow_mut().input.scroll_delta += delta;
    }

    /// Advance one frame; `now_ms` is `performance.now()`
    pub fn frame(&self, now_ms: f64) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let dt = state
            .last_frame_ms
            .map(|last| ((now_ms - last) / 1000.0) as f32)
            .unwrap_or(0.0);
        state.last_frame_ms = Some(now_ms);

        state.controller.frame(now_ms / 1000.0, dt, &state.input);
        state.input.reset_deltas();
    }

    pub fn node_names(&self) -> Vec<String> {
        let state = self.state.borrow();
        state
            .controller
            .scene()
            .nodes()
            .map(|(_, node)| node.name.clone())
            .collect()
    }

    /// Column-major world matrices, 16 floats per node in `node_names` order
    pub fn node_matrices(&self) -> js_sys::Float32Array {
        let matrices: Vec<Mat4> = self.state.borrow().controller.scene().world_matrices();
        js_sys::Float32Array::from(bytemuck::cast_slice::<Mat4, f32>(&matrices))
    }

    pub fn camera_position(&self) -> Vec<f32> {
        self.state.borrow().controller.camera().position.to_array().to_vec()
    }

    pub fn camera_target(&self) -> Vec<f32> {
        self.state.borrow().controller.camera().target.to_array().to_vec()
    }

    pub fn camera_mode(&self) -> String {
        self.state.borrow().controller.state().camera_mode.mode().name().to_string()
    }

    pub fn grid_offset(&self) -> f32 {
        self.state.borrow().controller.grid_offset()
    }

    pub fn exposure(&self) -> f32 {
        self.state.borrow().controller.config().environment.exposure
    }

    pub fn environment_map_path(&self) -> String {
        self.state.borrow().controller.config().environment_map_path.clone()
    }

    /// `#rrggbb` color of "paint", "details" or "glass"
    pub fn material_color(&self, slot: &str) -> Option<String> {
        let slot = MaterialSlot::ALL.into_iter().find(|s| s.name() == slot)?;
        let state = self.state.borrow();
        Some(format_hex_color(state.controller.state().materials.get(slot).color))
    }

    pub fn door_label(&self, code: &str) -> Option<String> {
        let door = DoorId::from_code(code)?;
        Some(self.state.borrow().controller.door_label(door))
    }

    pub fn is_placeholder(&self) -> bool {
        self.state.borrow().controller.is_placeholder()
    }
}
