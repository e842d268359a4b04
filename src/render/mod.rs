//! Rendering module: per-pixel shading, render contexts, stacking, output
//!
//! This module turns a parameter snapshot and a time value into a raster. The
//! per-pixel work lives in [`shading`]; [`context::RenderContext`] owns the
//! surface and its workers; [`compositor`] builds long exposures.

use image::{DynamicImage, RgbImage};
use std::path::Path;
use tracing::info;

pub mod compositor;
pub mod constants;
pub mod context;
pub mod error;
pub mod lighting;
pub mod shading;
pub mod types;
pub mod watermark;

use self::error::{RenderError, Result};

pub use self::context::{RenderContext, ViewTransform};
pub use self::lighting::RingLight;
pub use self::shading::ShadingParams;
pub use self::types::{Frame, PixelBuffer, Zoom};

use crate::params::SimulationParameters;

/// Render a single frame on a short-lived context.
///
/// `render(params, time, width, height, zoom)`; deterministic for identical
/// inputs. Long-running callers should keep a [`RenderContext`] instead.
pub fn render_frame(
    params: &SimulationParameters,
    time: f64,
    width: u32,
    height: u32,
    zoom: Zoom,
) -> Result<Frame> {
    let ctx = RenderContext::new(width, height)?;
    Ok(ctx.render(&ShadingParams::prepare(params), time, zoom))
}

/// Save 8-bit image as PNG
pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    DynamicImage::ImageRgb8(img.clone())
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| RenderError::ImageEncoding(e.to_string()))?;
    info!("   Saved PNG => {}", path.display());
    Ok(())
}
