//! High-resolution still export
//!
//! Export renders on its own [`RenderContext`] at a fixed square resolution
//! with zoom forced to 1 about the origin, so the live view's clock, zoom and
//! surface are never touched. The finished PNG is written to a `.part` file
//! and renamed into place; a failed export leaves no file behind.

use crate::params::SimulationParameters;
use crate::render::constants::EXPORT_RESOLUTION;
use crate::render::error::RenderError;
use crate::render::watermark::{draw_watermark, studio_watermark};
use crate::render::{RenderContext, ShadingParams, Zoom};
use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export context failed: {0}")]
    Context(#[from] RenderError),

    #[error("failed to encode export {path}: {reason}")]
    Encode { path: String, reason: String },

    #[error("failed to write export {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Export settings. The defaults produce the studio still.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    /// Edge length of the square output in pixels.
    pub resolution: u32,
    pub watermark: bool,
    /// Worker threads for the isolated context (0 picks the default).
    pub threads: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { resolution: EXPORT_RESOLUTION, watermark: true, threads: 0 }
    }
}

/// `exportStill(params, time, frameCount)` at the studio resolution.
pub fn export_still(params: &SimulationParameters, time: f64, frame_count: u32) -> Result<RgbImage> {
    export_still_with(params, time, frame_count, &ExportOptions::default())
}

/// Render a stacked still on a fresh context and stamp the watermark.
pub fn export_still_with(
    params: &SimulationParameters,
    time: f64,
    frame_count: u32,
    options: &ExportOptions,
) -> Result<RgbImage> {
    let ctx = RenderContext::with_threads(options.resolution, options.resolution, options.threads)?;
    let resolved = params.resolved();
    let shading = ShadingParams::prepare(&resolved);
    info!(
        "Exporting {res}x{res} still at t={time:.3}s with {frame_count}x stack",
        res = options.resolution
    );

    let mut frame = ctx.render_stacked(
        &shading,
        time,
        frame_count,
        resolved.simulation_speed,
        Zoom::identity(),
    );
    if options.watermark {
        draw_watermark(&mut frame, &studio_watermark());
    }
    Ok(frame.to_rgb8())
}

/// `cymatics_SQ_{n}x_stack_{timestamp}.png`, with the ISO timestamp's `:`
/// and `.` replaced so the name is valid on every file system.
pub fn export_file_name(frame_count: u32, at: DateTime<Utc>) -> String {
    let timestamp = at.format("%Y-%m-%dT%H-%M-%S-%3fZ");
    format!("cymatics_SQ_{frame_count}x_stack_{timestamp}.png")
}

/// Write `img` into `dir` under the timestamped export name.
pub fn save_export(img: &RgbImage, dir: &Path, frame_count: u32) -> Result<PathBuf> {
    let path = dir.join(export_file_name(frame_count, Utc::now()));
    write_png_atomic(img, &path)?;
    Ok(path)
}

/// Encode to `<path>.part`, then rename into place.
pub fn write_png_atomic(img: &RgbImage, path: &Path) -> Result<()> {
    let part = part_path(path);
    if let Err(e) = img.save_with_format(&part, ImageFormat::Png) {
        remove_partial(&part);
        return Err(ExportError::Encode {
            path: path.display().to_string(),
            reason: e.to_string(),
        });
    }
    if let Err(source) = fs::rename(&part, path) {
        remove_partial(&part);
        return Err(ExportError::Write { path: path.display().to_string(), source });
    }
    info!("   Saved export => {}", path.display());
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn remove_partial(part: &Path) {
    if part.exists() {
        if let Err(e) = fs::remove_file(part) {
            warn!("Could not remove partial export {}: {}", part.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn temp_dir(tag: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("cymatics_export_{tag}_{ts}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn small(watermark: bool) -> ExportOptions {
        ExportOptions { resolution: 48, watermark, threads: 2 }
    }

    #[test]
    fn test_export_matches_live_render() {
        let params = SimulationParameters::default();
        let exported = export_still_with(&params, 3.2, 1, &small(false)).unwrap();
        let live = RenderContext::new(48, 48).unwrap();
        let frame = live.render(&ShadingParams::prepare(&params), 3.2, Zoom::identity());
        assert_eq!(exported, frame.to_rgb8());
    }

    #[test]
    fn test_export_does_not_touch_live_view() {
        let params = SimulationParameters::default();
        let mut view = crate::animation::LiveView::new(16, 16).unwrap();
        view.zoom = Zoom::new(2.0, 0.1, 0.1);
        view.tick(0.05, &params);
        let before = (view.playback, view.zoom);
        export_still_with(&params, 10.0, 2, &small(true)).unwrap();
        assert_eq!((view.playback, view.zoom), before);
    }

    #[test]
    fn test_zero_resolution_fails_without_writing() {
        let dir = temp_dir("zero");
        let opts = ExportOptions { resolution: 0, ..small(true) };
        let err = export_still_with(&SimulationParameters::default(), 0.0, 1, &opts).unwrap_err();
        assert!(matches!(err, ExportError::Context(RenderError::InvalidDimensions { .. })));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_watermark_changes_bottom_only() {
        let params = SimulationParameters::default();
        let plain = export_still_with(&params, 1.0, 1, &ExportOptions { resolution: 384, ..small(false) }).unwrap();
        let marked = export_still_with(&params, 1.0, 1, &ExportOptions { resolution: 384, ..small(true) }).unwrap();
        for (x, y, p) in plain.enumerate_pixels() {
            if y < 384 - 30 {
                assert_eq!(p, marked.get_pixel(x, y));
            }
        }
        assert_ne!(plain, marked);
    }

    #[test]
    fn test_file_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            export_file_name(8, at),
            "cymatics_SQ_8x_stack_2024-03-09T14-05-07-000Z.png"
        );
    }

    #[test]
    fn test_save_export_leaves_no_part_file() {
        let dir = temp_dir("save");
        let img = RgbImage::new(4, 4);
        let path = save_export(&img, &dir, 3).unwrap();
        assert!(path.exists());
        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("cymatics_SQ_3x_stack_"));
        assert!(names[0].ends_with(".png"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_into_missing_dir_fails_cleanly() {
        let dir = temp_dir("missing").join("does_not_exist");
        let err = write_png_atomic(&RgbImage::new(2, 2), &dir.join("x.png")).unwrap_err();
        assert!(matches!(err, ExportError::Encode { .. } | ExportError::Write { .. }));
        assert!(!dir.exists());
    }
}
