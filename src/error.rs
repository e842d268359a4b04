//! Application-level error types

use crate::export::ExportError;
use crate::render::error::RenderError;
use thiserror::Error;

/// Configuration and persistence failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to {operation} '{path}': {error}")]
    FileSystem {
        operation: String,
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("invalid JSON in '{path}': {error}")]
    Json {
        path: String,
        #[source]
        error: serde_json::Error,
    },

    #[error("no preset named '{0}'")]
    PresetNotFound(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, AppError>;
