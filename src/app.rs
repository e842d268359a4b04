//! Application orchestration and workflow management
//!
//! Each subcommand is broken into small stage functions: resolve parameters,
//! render, write, log. `main` only parses options and calls [`run`].

use crate::animation::{LiveView, Playback};
use crate::cli::{Command, Opts};
use crate::error::{ConfigError, Result};
use crate::export::{export_still_with, save_export, write_png_atomic, ExportOptions};
use crate::export_log::{ExportLogger, ExportRecord};
use crate::field::mode::ModeBlend;
use crate::field::geometry_label;
use crate::params::SimulationParameters;
use crate::presets::PresetLibrary;
use crate::render::{self, RenderContext, ShadingParams, Zoom};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Dispatch a parsed command.
pub fn run(opts: &Opts) -> Result<()> {
    match &opts.command {
        Command::Render => {
            let params = load_parameters(opts)?;
            run_render(opts, &params).map(|_| ())
        }
        Command::Export => {
            let params = load_parameters(opts)?;
            run_export(opts, &params, &ExportLogger::new()).map(|_| ())
        }
        Command::Animate => {
            let params = load_parameters(opts)?;
            run_animate(opts, &params).map(|_| ())
        }
        Command::Mode => {
            let params = load_parameters(opts)?;
            println!("{}", describe_modes(&params));
            Ok(())
        }
        Command::PresetSave(name) => {
            let params = load_parameters(opts)?;
            let mut library = PresetLibrary::load(&opts.presets_path)?;
            library.save(name, params)?;
            Ok(())
        }
        Command::PresetList => {
            let library = PresetLibrary::load(&opts.presets_path)?;
            if library.presets().is_empty() {
                println!("No presets in {}", opts.presets_path);
            }
            for preset in library.presets() {
                let p = &preset.params;
                println!(
                    "{:<24} {:>7.2} Hz  {:<8} {}",
                    preset.name,
                    p.frequency,
                    p.container_shape.name(),
                    geometry_label(p.frequency, p.container_shape, p.calibration_mode_offset)
                );
            }
            Ok(())
        }
        Command::PresetDelete(name) => {
            let mut library = PresetLibrary::load(&opts.presets_path)?;
            library.delete(name)?;
            Ok(())
        }
    }
}

/// Initialize application directories
pub fn setup_directories(out_dir: &str) -> Result<()> {
    fs::create_dir_all(out_dir).map_err(|e| ConfigError::FileSystem {
        operation: "create directory".to_string(),
        path: out_dir.to_string(),
        error: e,
    })?;
    Ok(())
}

/// Resolve the parameter snapshot: preset, then JSON file, then defaults,
/// with command-line overrides applied last.
pub fn load_parameters(opts: &Opts) -> Result<SimulationParameters> {
    let mut params = if let Some(name) = &opts.preset {
        let library = PresetLibrary::load(&opts.presets_path)?;
        let preset = library
            .find(name)
            .ok_or_else(|| ConfigError::PresetNotFound(name.clone()))?;
        info!("Using preset '{name}'");
        preset.params.clone()
    } else if let Some(path) = &opts.params_path {
        read_parameters_file(Path::new(path))?
    } else {
        SimulationParameters::default()
    };

    if let Some(frequency) = opts.frequency {
        params.frequency = frequency;
    }
    if let Some(shape) = opts.shape {
        params.container_shape = shape;
    }
    if let Some(stack) = opts.stack {
        params.export_frame_stack = stack;
    }
    Ok(params)
}

/// Read a JSON parameter snapshot. Missing fields take their defaults.
pub fn read_parameters_file(path: &Path) -> Result<SimulationParameters> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|error| ConfigError::FileSystem {
        operation: "read parameters".to_string(),
        path: display.clone(),
        error,
    })?;
    let params = SimulationParameters::from_json(&contents)
        .map_err(|error| ConfigError::Json { path: display, error })?;
    Ok(params)
}

/// Render a single frame to PNG.
pub fn run_render(opts: &Opts, params: &SimulationParameters) -> Result<PathBuf> {
    setup_directories(&opts.out_dir)?;
    let output = match &opts.out {
        Some(path) => PathBuf::from(path),
        None => Path::new(&opts.out_dir).join(render_file_name(params, opts.time)),
    };

    info!("STAGE 1/2: Rendering {}x{} frame at t={:.3}s...", opts.width, opts.height, opts.time);
    let ctx = RenderContext::with_threads(opts.width, opts.height, opts.threads)?;
    let zoom = Zoom::new(opts.zoom, opts.center.0, opts.center.1);
    let frame = ctx.render(&ShadingParams::prepare(params), opts.time, zoom);

    info!("STAGE 2/2: Saving frame...");
    render::save_png(&frame.to_rgb8(), &output)?;
    Ok(output)
}

/// Render the stacked, watermarked still on an isolated context, save it and
/// record it in the export log.
pub fn run_export(opts: &Opts, params: &SimulationParameters, logger: &ExportLogger) -> Result<PathBuf> {
    setup_directories(&opts.out_dir)?;
    let resolved = params.resolved();
    let frame_count = resolved.export_frame_stack;
    let options = ExportOptions {
        resolution: opts.resolution,
        watermark: opts.watermark,
        threads: opts.threads,
    };

    info!(
        "STAGE 1/3: Exporting {res}x{res} still ({frame_count}x stack)...",
        res = options.resolution
    );
    let img = export_still_with(&resolved, opts.time, frame_count, &options)?;

    info!("STAGE 2/3: Writing PNG...");
    let path = save_export(&img, Path::new(&opts.out_dir), frame_count)?;

    info!("STAGE 3/3: Logging export...");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    logger.log_export(ExportRecord::new(
        file_name,
        opts.time,
        frame_count,
        options.resolution,
        options.watermark,
        resolved,
    ));

    Ok(path)
}

/// Drive the live view at a fixed frame rate and write each frame.
pub fn run_animate(opts: &Opts, params: &SimulationParameters) -> Result<usize> {
    let dir = Path::new(&opts.out_dir).join(format!(
        "cymatics_anim_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    setup_directories(&dir.to_string_lossy())?;

    let mut view = LiveView::new(opts.width, opts.height)?;
    view.zoom = Zoom::new(opts.zoom, opts.center.0, opts.center.1);
    view.playback = Playback { time: opts.time, playing: true };
    let dt = 1.0 / opts.fps;

    info!("STAGE 1/1: Rendering {} frames at {:.1} fps into {}", opts.frames, opts.fps, dir.display());
    let mut written = 0;
    for i in 0..opts.frames {
        if opts.pause_at == Some(i) {
            info!("   Pausing clock at frame {i} (t={:.3}s)", view.playback.time);
            view.playback.playing = false;
        }
        // First frame shows the starting time.
        let frame = view.tick(if i == 0 { 0.0 } else { dt }, params);
        let path = dir.join(format!("frame_{i:05}.png"));
        write_png_atomic(&frame.to_rgb8(), &path)?;
        written += 1;

        let progress = (i + 1) * 10 / opts.frames.max(1);
        if progress != i * 10 / opts.frames.max(1) {
            tracing::debug!("   animate: {}% done", progress * 10);
        }
    }
    if written == 0 {
        warn!("No frames requested; nothing written");
    }
    info!("   => {written} frames, final t={:.3}s", view.playback.time);
    Ok(written)
}

/// Frequency, shape and the modes active at that frequency.
pub fn describe_modes(params: &SimulationParameters) -> String {
    let p = params.resolved();
    let blend = ModeBlend::at(p.frequency, p.container_shape, p.calibration_mode_offset);
    let orders: Vec<String> = blend
        .active_orders()
        .iter()
        .map(|o| format!("N={}", o.value()))
        .collect();
    format!(
        "{:.2} Hz, {} container: {} [{} | blend {:.2}]",
        p.frequency,
        p.container_shape,
        geometry_label(p.frequency, p.container_shape, p.calibration_mode_offset),
        orders.join(" + "),
        blend.weight
    )
}

/// `cymatics_{shape}_{freq}hz_t{time}.png`
pub fn render_file_name(params: &SimulationParameters, time: f64) -> String {
    format!(
        "cymatics_{}_{:.2}hz_t{:.3}.png",
        params.container_shape,
        params.frequency,
        time
    )
}
