//! Render context and view transform
//!
//! A [`RenderContext`] is an explicitly owned render surface: fixed output
//! dimensions plus a private worker pool. The live view and the exporter each
//! own one, so they never share state. Dropping the context releases its
//! workers.

use super::compositor::stack_exposures;
use super::constants::{MAX_DIMENSION, UV_SCALE};
use super::error::{RenderError, Result};
use super::shading::ShadingParams;
use super::types::{Frame, PixelBuffer, Zoom};
use nalgebra::Vector2;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Encapsulates a render surface: dimensions, coordinate mapping and workers
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub width_usize: usize,
    pub height_usize: usize,
    pool: ThreadPool,
}

impl RenderContext {
    /// Create a context using rayon's default worker count.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_threads(width, height, 0)
    }

    /// Create a context with `threads` workers (0 picks the default).
    ///
    /// Fails with [`RenderError::InvalidDimensions`] for empty or oversized
    /// surfaces and [`RenderError::ContextInit`] when the pool cannot start.
    pub fn with_threads(width: u32, height: u32, threads: usize) -> Result<Self> {
        validate_dimensions(width, height)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("cymatics-render-{i}"))
            .build()
            .map_err(|e| RenderError::ContextInit(e.to_string()))?;
        debug!("Render context {width}x{height} with {} workers", pool.current_num_threads());

        Ok(Self {
            width,
            height,
            width_usize: width as usize,
            height_usize: height as usize,
            pool,
        })
    }

    /// Change output dimensions, keeping the worker pool.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        validate_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        self.width_usize = width as usize;
        self.height_usize = height as usize;
        Ok(())
    }

    /// Get total pixel count
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width_usize * self.height_usize
    }

    /// Pixel-to-shading-space mapping for this surface at `zoom`.
    pub fn view(&self, zoom: Zoom) -> ViewTransform {
        ViewTransform::new(self.width, self.height, zoom)
    }

    /// Render one frame. Deterministic for identical inputs, independent of
    /// the worker count.
    pub fn render(&self, params: &ShadingParams, time: f64, zoom: Zoom) -> Frame {
        let view = self.view(zoom);
        let shader = params.at_time(time);
        let width = self.width_usize;
        let mut pixels: PixelBuffer = vec![(0.0, 0.0, 0.0); self.pixel_count()];

        self.pool.install(|| {
            pixels.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    let c = shader.shade(view.pixel_to_uv(x as u32, y as u32));
                    *px = (c.x, c.y, c.z);
                }
            });
        });

        Frame { width: self.width, height: self.height, pixels }
    }

    /// Render `count` exposures starting at `time` and screen-blend them.
    pub fn render_stacked(
        &self,
        params: &ShadingParams,
        time: f64,
        count: u32,
        speed: f64,
        zoom: Zoom,
    ) -> Frame {
        stack_exposures(self, params, time, count, speed, zoom)
    }

    /// Run `op` on this context's workers.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Maps pixel indices to shading-space points.
///
/// Pixel `(x, y)` is addressed top-down; the fragment centre is measured
/// bottom-up, centred on the surface and scaled by the shorter edge so the
/// container stays round on non-square outputs.
#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
    height: f64,
    half_res: Vector2<f64>,
    inv_min_edge: f64,
    zoom: f64,
    center: Vector2<f64>,
}

impl ViewTransform {
    pub fn new(width: u32, height: u32, zoom: Zoom) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self {
            height: h,
            half_res: Vector2::new(w * 0.5, h * 0.5),
            inv_min_edge: 1.0 / w.min(h).max(1.0),
            zoom: zoom.effective_level(),
            center: zoom.center,
        }
    }

    #[inline]
    pub fn pixel_to_uv(&self, x: u32, y: u32) -> Vector2<f64> {
        let frag = Vector2::new(x as f64 + 0.5, self.height - y as f64 - 0.5);
        let uv = (frag - self.half_res) * self.inv_min_edge;
        ((uv - self.center) / self.zoom + self.center) * UV_SCALE
    }
}
