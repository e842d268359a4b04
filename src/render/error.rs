//! Error types for the rendering pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The context's worker pool could not be created. Terminal for that
    /// context; build a new one to retry.
    #[error("render context initialization failed: {0}")]
    ContextInit(String),

    #[error("invalid render dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image encoding error: {0}")]
    ImageEncoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
