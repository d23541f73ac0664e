//! Viewer error types

use thiserror::Error;

/// Errors surfaced by the viewer
///
/// All of these are recoverable: the viewer keeps running after logging them.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to load asset '{path}': {reason}")]
    AssetLoad { path: String, reason: String },
    #[error("Scene has no object named '{0}'")]
    MissingNamedObject(String),
    #[error("No command is bound to control '{0}'")]
    UnknownControl(String),
    #[error("Control '{0}' requires a value")]
    MissingValue(String),
    #[error("Invalid color '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("Invalid viewer configuration: {0}")]
    InvalidConfig(String),
}

pub type ViewerResult<T> = Result<T, ViewerError>;
