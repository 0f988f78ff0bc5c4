//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur during raster operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// An output surface of the requested size could not be acquired.
    #[error("output surface unavailable for {width}x{height}")]
    SurfaceUnavailable { width: u32, height: u32 },

    /// Pixel data does not match the stated dimensions.
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Failed to decode image data.
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    /// Failed to encode or write an image.
    #[error("failed to save image: {0}")]
    ImageSave(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
