//! Command-line argument parsing.
//!
//! Arguments are parsed by hand as `--flag=value` pairs after a subcommand.
//! `CYMATICS_*` environment variables set defaults that explicit flags
//! override.

use crate::field::ContainerShape;
use std::env;
use std::process;
use std::str::FromStr;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
cymatics-lab: Faraday wave simulator and still renderer

USAGE:
    cymatics-lab <COMMAND> [OPTIONS]

COMMANDS:
    render               Render one frame to PNG
    export               Render the 3840x3840 watermarked still
    animate              Render a PNG sequence through the live view
    preset save NAME     Save the current parameters as a named preset
    preset list          List saved presets
    preset delete NAME   Delete a preset
    mode                 Print the active wave modes for the parameters

PARAMETER SOURCES:
    --params=FILE        Load parameters from a JSON file
    --preset=NAME        Load parameters from a saved preset
    --presets=FILE       Preset library path (default: presets.json)
    --frequency=HZ       Override the excitation frequency
    --shape=SHAPE        Override the container: circle|square|triangle|hexagon
    --stack=N            Override the long-exposure frame count

OPTIONS:
    --time=T             Simulation time in seconds (default: 0)
    --width=N            Output width for render/animate (default: 1024)
    --height=N           Output height for render/animate (default: 1024)
    --zoom=Z             Zoom level for render/animate (default: 1)
    --center=X,Y         Zoom centre in screen units (default: 0,0)
    --out=PATH           Output file for render
    --out-dir=DIR        Output directory (default: pics)
    --resolution=N       Export edge length (default: 3840)
    --no-watermark       Skip the export watermark
    --frames=N           Frames for animate (default: 120)
    --fps=F              Frame rate for animate (default: 60)
    --pause-at=N         Pause the animate clock after frame N
    --threads=N          Worker threads per render context (default: all cores)
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    CYMATICS_PRESETS     Default for --presets
    CYMATICS_OUT_DIR     Default for --out-dir
    CYMATICS_THREADS     Default for --threads
    RUST_LOG             Log filter (default: info)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Render,
    Export,
    Animate,
    PresetSave(String),
    PresetList,
    PresetDelete(String),
    Mode,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub command: Command,
    pub params_path: Option<String>,
    pub preset: Option<String>,
    pub presets_path: String,
    pub frequency: Option<f64>,
    pub shape: Option<ContainerShape>,
    pub stack: Option<u32>,
    pub time: f64,
    pub width: u32,
    pub height: u32,
    pub zoom: f64,
    pub center: (f64, f64),
    pub out: Option<String>,
    pub out_dir: String,
    pub resolution: u32,
    pub watermark: bool,
    pub frames: u32,
    pub fps: f64,
    /// Frame after which the animate clock pauses (None = never).
    pub pause_at: Option<u32>,
    /// Worker threads per render context (0 = rayon default).
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    MissingCommand,
    MissingName(&'static str),
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Opts {
    /// Defaults for `command` before env vars and flags are applied.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            params_path: None,
            preset: None,
            presets_path: crate::presets::DEFAULT_PRESET_PATH.to_string(),
            frequency: None,
            shape: None,
            stack: None,
            time: 0.0,
            width: 1024,
            height: 1024,
            zoom: 1.0,
            center: (0.0, 0.0),
            out: None,
            out_dir: "pics".to_string(),
            resolution: crate::render::constants::EXPORT_RESOLUTION,
            watermark: true,
            frames: 120,
            fps: 60.0,
            pause_at: None,
            threads: 0,
        }
    }

    /// Parse command-line arguments and environment variables, exiting on
    /// `--help`, `--version` or bad input.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("cymatics-lab {VERSION}");
                process::exit(0);
            }
            Err(ParseError::MissingCommand) => {
                eprintln!("No command given.");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
            Err(ParseError::MissingName(cmd)) => {
                eprintln!("'{cmd}' needs a preset name.");
                process::exit(1);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        if args.iter().any(|a| a == "--help" || a == "-h") {
            return Err(ParseError::Help);
        }
        if args.iter().any(|a| a == "--version" || a == "-V") {
            return Err(ParseError::Version);
        }

        let mut rest = args.iter().map(String::as_str);
        let command = match rest.next() {
            Some("render") => Command::Render,
            Some("export") => Command::Export,
            Some("animate") => Command::Animate,
            Some("mode") => Command::Mode,
            Some("preset") => match rest.next() {
                Some("list") => Command::PresetList,
                Some("save") => Command::PresetSave(preset_name(rest.next(), "preset save")?),
                Some("delete") => Command::PresetDelete(preset_name(rest.next(), "preset delete")?),
                Some(other) => return Err(ParseError::UnknownArg(other.to_string())),
                None => return Err(ParseError::MissingCommand),
            },
            Some(other) => return Err(ParseError::UnknownArg(other.to_string())),
            None => return Err(ParseError::MissingCommand),
        };

        let mut opts = Self::new(command);

        // Environment defaults first
        if let Some(val) = get_env("CYMATICS_PRESETS") {
            if !val.trim().is_empty() {
                opts.presets_path = val;
            }
        }
        if let Some(val) = get_env("CYMATICS_OUT_DIR") {
            if !val.trim().is_empty() {
                opts.out_dir = val;
            }
        }
        if let Some(val) = get_env("CYMATICS_THREADS") {
            if let Ok(n) = val.trim().parse() {
                opts.threads = n;
            }
        }

        // Flags override env vars
        for arg in rest {
            match arg {
                "--no-watermark" => opts.watermark = false,
                other => {
                    let Some((flag, val)) = other.split_once('=') else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    };
                    match flag {
                        "--params" => opts.params_path = Some(val.to_string()),
                        "--preset" => opts.preset = Some(val.to_string()),
                        "--presets" => opts.presets_path = val.to_string(),
                        "--frequency" => opts.frequency = Some(value("--frequency", val)?),
                        "--shape" => opts.shape = Some(value("--shape", val)?),
                        "--stack" => opts.stack = Some(value("--stack", val)?),
                        "--time" => opts.time = value("--time", val)?,
                        "--width" => opts.width = value("--width", val)?,
                        "--height" => opts.height = value("--height", val)?,
                        "--zoom" => opts.zoom = value("--zoom", val)?,
                        "--center" => opts.center = parse_pair(val).ok_or_else(|| invalid("--center", val))?,
                        "--out" => opts.out = Some(val.to_string()),
                        "--out-dir" => opts.out_dir = val.to_string(),
                        "--resolution" => opts.resolution = value("--resolution", val)?,
                        "--frames" => opts.frames = value("--frames", val)?,
                        "--fps" => opts.fps = value("--fps", val)?,
                        "--pause-at" => opts.pause_at = Some(value("--pause-at", val)?),
                        "--threads" => opts.threads = value("--threads", val)?,
                        _ => return Err(ParseError::UnknownArg(other.to_string())),
                    }
                }
            }
        }

        if opts.fps <= 0.0 || !opts.fps.is_finite() {
            return Err(invalid("--fps", &opts.fps.to_string()));
        }
        Ok(opts)
    }
}

fn preset_name(arg: Option<&str>, cmd: &'static str) -> Result<String, ParseError> {
    match arg {
        Some(name) if !name.starts_with("--") && !name.trim().is_empty() => Ok(name.to_string()),
        _ => Err(ParseError::MissingName(cmd)),
    }
}

fn value<T: FromStr>(flag: &'static str, val: &str) -> Result<T, ParseError> {
    val.trim().parse().map_err(|_| invalid(flag, val))
}

fn invalid(flag: &'static str, val: &str) -> ParseError {
    ParseError::InvalidValue { flag, value: val.to_string() }
}

/// Parse `X,Y`.
fn parse_pair(s: &str) -> Option<(f64, f64)> {
    let (x, y) = s.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
