//! Resource management

mod material;

pub use material::*;
