//! Errors raised while validating scenes, cameras and render settings.
//!
//! The tracing hot path never fails; every degenerate input that could turn
//! into NaN or a division by zero is rejected here, up front.

use thiserror::Error;

/// Errors that can occur while building or rendering a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Invalid sphere: {0}")]
    InvalidSphere(String),

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Pixel ({row}, {col}) is outside the {width}x{height} framebuffer")]
    PixelOutOfBounds {
        row: u32,
        col: u32,
        width: u32,
        height: u32,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
