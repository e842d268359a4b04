//! Simulation parameter snapshot
//!
//! The controller hands the core one [`SimulationParameters`] per frame. The
//! struct deserializes from camelCase JSON with every field optional, so old
//! presets missing newer fields still load. [`SimulationParameters::resolved`]
//! applies fallbacks and range clamps; nothing here ever fails on bad numbers.

pub mod descriptors;

use crate::field::ContainerShape;
use nalgebra::Vector3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::warn;

use self::descriptors as d;

/// Maximum number of light rings the shader evaluates.
pub const MAX_RINGS: usize = 3;

/// 8-bit sRGB colour written as `#rrggbb`. Malformed strings read as white.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const WHITE: HexColor = HexColor([0xff, 0xff, 0xff]);

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if digits.len() != 6 {
            return None;
        }
        let bytes = hex::decode(digits).ok()?;
        Some(HexColor([bytes[0], bytes[1], bytes[2]]))
    }

    /// Parse, falling back to white like the control surface does.
    pub fn parse_or_white(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!("Malformed colour '{s}', using white");
            Self::WHITE
        })
    }

    /// Channels scaled to `[0, 1]`.
    pub fn to_unit_rgb(self) -> Vector3<f64> {
        let [r, g, b] = self.0;
        Vector3::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode(self.0))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(HexColor::parse_or_white(&raw))
    }
}

/// One ring of point lights hanging over the liquid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightRing {
    pub color: HexColor,
    pub dot_size: f64,
    pub height: f64,
    /// Radius in cm; normalized by half the container diameter before shading.
    pub radius: f64,
    pub spread: f64,
    pub intensity: f64,
    pub count: u32,
}

impl Default for LightRing {
    fn default() -> Self {
        Self {
            color: HexColor::WHITE,
            dot_size: d::RING_DOT_SIZE.default,
            height: d::RING_HEIGHT.default,
            radius: d::RING_RADIUS.default,
            spread: d::RING_SPREAD.default,
            intensity: d::RING_INTENSITY.default,
            count: d::RING_COUNT.default,
        }
    }
}

impl LightRing {
    /// The warm secondary ring of the default rig.
    pub fn secondary() -> Self {
        Self {
            color: HexColor([0xff, 0xaa, 0x55]),
            dot_size: 0.20,
            height: 5.0,
            radius: 3.5,
            spread: 1.0,
            intensity: 3.0,
            count: 60,
        }
    }

    pub fn resolved(&self) -> Self {
        Self {
            color: self.color,
            dot_size: d::RING_DOT_SIZE.resolve(self.dot_size),
            height: d::RING_HEIGHT.resolve(self.height),
            radius: d::RING_RADIUS.resolve(self.radius),
            spread: d::RING_SPREAD.resolve(self.spread),
            intensity: d::RING_INTENSITY.resolve(self.intensity),
            count: d::RING_COUNT.resolve(self.count),
        }
    }
}

/// Complete per-frame parameter snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationParameters {
    pub frequency: f64,
    pub amplitude: f64,
    pub frequency_amplification: f64,
    pub damping: f64,
    pub simulation_speed: f64,
    pub liquid_density: f64,
    pub depth: f64,
    pub diameter: f64,
    pub container_shape: ContainerShape,
    pub camera_height: f64,
    pub liquid_color: HexColor,
    pub calibration_k_factor: f64,
    pub calibration_mode_offset: f64,
    pub rings: Vec<LightRing>,
    pub export_frame_stack: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            frequency: d::FREQUENCY.default,
            amplitude: d::AMPLITUDE.default,
            frequency_amplification: d::FREQUENCY_AMPLIFICATION.default,
            damping: d::DAMPING.default,
            simulation_speed: d::SIMULATION_SPEED.default,
            liquid_density: d::LIQUID_DENSITY.default,
            depth: d::DEPTH.default,
            diameter: d::DIAMETER.default,
            container_shape: ContainerShape::Circle,
            camera_height: d::CAMERA_HEIGHT.default,
            liquid_color: HexColor([0x01, 0x03, 0x08]),
            calibration_k_factor: d::CALIBRATION_K_FACTOR.default,
            calibration_mode_offset: d::CALIBRATION_MODE_OFFSET.default,
            rings: vec![LightRing::default(), LightRing::secondary()],
            export_frame_stack: d::EXPORT_FRAME_STACK.default,
        }
    }
}

impl SimulationParameters {
    /// Parse a JSON snapshot. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Copy with fallbacks applied and every value clamped into range.
    ///
    /// Zero gain, density and K factor are treated as unset, matching how
    /// older presets stored missing values. Rings beyond [`MAX_RINGS`] are
    /// dropped.
    pub fn resolved(&self) -> Self {
        if self.rings.len() > MAX_RINGS {
            warn!("{} light rings configured, only the first {MAX_RINGS} are used", self.rings.len());
        }
        Self {
            frequency: d::FREQUENCY.resolve(self.frequency),
            amplitude: d::AMPLITUDE.resolve(self.amplitude),
            frequency_amplification: d::FREQUENCY_AMPLIFICATION.resolve_nonzero(self.frequency_amplification),
            damping: d::DAMPING.resolve(self.damping),
            simulation_speed: d::SIMULATION_SPEED.resolve(self.simulation_speed),
            liquid_density: d::LIQUID_DENSITY.resolve_nonzero(self.liquid_density),
            depth: d::DEPTH.resolve(self.depth),
            diameter: d::DIAMETER.resolve(self.diameter),
            container_shape: self.container_shape,
            camera_height: d::CAMERA_HEIGHT.resolve(self.camera_height),
            liquid_color: self.liquid_color,
            calibration_k_factor: d::CALIBRATION_K_FACTOR.resolve_nonzero(self.calibration_k_factor),
            calibration_mode_offset: d::CALIBRATION_MODE_OFFSET.resolve(self.calibration_mode_offset),
            rings: self.rings.iter().take(MAX_RINGS).map(LightRing::resolved).collect(),
            export_frame_stack: d::EXPORT_FRAME_STACK.resolve(self.export_frame_stack),
        }
    }

    /// Half the container diameter, the unit ring radii are expressed in
    /// during shading.
    #[inline]
    pub fn container_radius(&self) -> f64 {
        self.diameter * 0.5
    }
}
