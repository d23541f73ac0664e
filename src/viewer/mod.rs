//! Scene interaction: doors, camera modes, motion and picking
//!
//! Each door, the camera and the motion flag are independent two-state
//! machines. Doors can be toggled in either camera mode and while moving.

mod camera_mode;
mod commands;
mod controller;
mod doors;
mod motion;
mod pick;

pub use camera_mode::*;
pub use commands::*;
pub use controller::*;
pub use doors::*;
pub use motion::*;
pub use pick::*;
