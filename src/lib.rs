//! Procedural Faraday-wave simulator.
//!
//! [`field`] evaluates the standing-wave height field of a vibrating liquid in
//! a circular, square, triangular or hexagonal dish. [`render`] reflects
//! virtual ring lights off that surface into RGB frames, [`animation`] drives
//! the live clock, and [`export`] produces the stacked, watermarked still.

pub mod animation;
pub mod app;
pub mod cli;
pub mod error;
pub mod export;
pub mod export_log;
pub mod field;
pub mod params;
pub mod presets;
pub mod render;
