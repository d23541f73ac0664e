//! Car Viewer - an interactive 3D car configurator
//!
//! The viewer loads a car model and lets the user:
//! - Orbit the car from outside or look around from the driver's seat
//! - Open and close each door, by button or by clicking the door handle
//! - Recolor paint, details and glass
//! - Spin the wheels over a scrolling ground grid
//!
//! Rendering is left to the host. The crate keeps the scene graph, camera,
//! materials and environment parameters the renderer draws from, and
//! updates them once per frame through [`ViewerController::frame`].
//!
//! # Web
//! Built for `wasm32`, the crate exports a `WebViewer` that wires the page's
//! buttons and color inputs to the viewer and hands node matrices to a
//! JavaScript renderer every animation frame.

pub mod assets;
pub mod config;
pub mod error;
pub mod resources;
pub mod scene;
pub mod viewer;

// Web-specific module
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::ViewerConfig;
pub use error::{ViewerError, ViewerResult};
pub use viewer::{CameraMode, DoorId, ViewerController};

// Web initialization helper
#[cfg(target_arch = "wasm32")]
pub fn init_web_logging() {
    // Set up panic hook for better error messages in console
    console_error_panic_hook::set_once();
    // Set up console logging for web
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
}
