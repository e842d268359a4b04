//! LED ring reflections
//!
//! Each ring is a circle of point lights in the plane `z = height`. A
//! reflected view ray is intersected with that plane and scored by how close
//! the hit lands to the ring, with an angular dot pattern on top.

use super::constants::CHROMATIC_OFFSET;
use crate::field::{fract, mix, smoothstep};
use crate::params::LightRing;
use nalgebra::Vector3;
use std::f64::consts::TAU;

/// Rays flatter than this never reach the ring plane.
const PARALLEL_EPSILON: f64 = 0.001;
/// Base half-width of the acceptance band around the ring.
const BAND_HALF_WIDTH: f64 = 0.15;
const RIBBON_GAIN: f64 = 4.0;
const GLOW_DECAY: f64 = 40.0;
const MIN_SPREAD: f64 = 0.01;
const DOT_EDGE: f64 = 0.1;
/// Dot counts over which the pattern fills in to a solid ring.
const CONTINUITY_START: f64 = 48.0;
const CONTINUITY_END: f64 = 120.0;

/// Light ring in shading units, ready for per-pixel evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingLight {
    /// Radius relative to the container radius.
    pub radius: f64,
    pub height: f64,
    pub dot_size: f64,
    pub spread: f64,
    pub intensity: f64,
    pub count: f64,
    pub color: Vector3<f64>,
}

impl RingLight {
    /// Convert a resolved ring; `container_radius` is half the diameter in cm.
    pub fn prepare(ring: &LightRing, container_radius: f64) -> Self {
        Self {
            radius: ring.radius / container_radius.max(f64::EPSILON),
            height: ring.height,
            dot_size: ring.dot_size,
            spread: ring.spread,
            intensity: ring.intensity,
            count: ring.count as f64,
            color: ring.color.to_unit_rgb(),
        }
    }

    /// Brightness seen along one ray. Zero for rays parallel to the ring
    /// plane or pointing away from it.
    pub fn contribution(&self, origin: &Vector3<f64>, dir: &Vector3<f64>) -> f64 {
        if dir.z.abs() < PARALLEL_EPSILON {
            return 0.0;
        }
        let t = (self.height - origin.z) / dir.z;
        if t < 0.0 {
            return 0.0;
        }

        let hit = origin + dir * t;
        let dist = (hit.xy().norm() - self.radius).abs();

        // Ribbon: steep facets catch light from a wider band.
        let steepness = 1.0 - dir.z.abs();
        let band = BAND_HALF_WIDTH * (self.spread * steepness * RIBBON_GAIN).max(1.0);
        if dist > band {
            return 0.0;
        }

        let glow = (-dist * GLOW_DECAY / self.spread.max(MIN_SPREAD)).exp();

        let angle = hit.y.atan2(hit.x);
        let local = fract(angle / TAU * self.count);
        let half = self.dot_size * 0.5;
        let dot = smoothstep(half + DOT_EDGE, half, (local - 0.5).abs());
        let continuity = smoothstep(CONTINUITY_START, CONTINUITY_END, self.count);

        glow * mix(dot, 1.0, continuity) * self.intensity
    }

    /// Per-channel contribution for the three chromatic rays, tinted by the
    /// ring colour.
    pub fn shade(&self, origin: &Vector3<f64>, rays: &ChromaticRays) -> Vector3<f64> {
        Vector3::new(
            self.contribution(origin, &rays.red),
            self.contribution(origin, &rays.green),
            self.contribution(origin, &rays.blue),
        )
        .component_mul(&self.color)
    }
}

/// Slightly diverged reflection rays that fake dispersion.
#[derive(Clone, Copy, Debug)]
pub struct ChromaticRays {
    pub red: Vector3<f64>,
    pub green: Vector3<f64>,
    pub blue: Vector3<f64>,
}

impl ChromaticRays {
    pub fn split(reflected: Vector3<f64>) -> Self {
        let offset = Vector3::new(CHROMATIC_OFFSET, 0.0, 0.0);
        Self {
            red: (reflected + offset).normalize(),
            green: reflected,
            blue: (reflected - offset).normalize(),
        }
    }
}

/// Mirror `incident` about the unit `normal`.
#[inline]
pub fn reflect(incident: Vector3<f64>, normal: Vector3<f64>) -> Vector3<f64> {
    incident - normal * (2.0 * normal.dot(&incident))
}
