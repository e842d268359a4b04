//! Per-pixel shading: height field, normal, reflection, ring lighting.

use super::constants::{
    LIQUID_BASE_WEIGHT, REFLECTION_FADE_END, REFLECTION_FADE_START, SURFACE_HEIGHT_SCALE,
};
use super::lighting::{reflect, ChromaticRays, RingLight};
use crate::field::{smoothstep, surface_normal, FieldParams, HeightField};
use crate::params::{SimulationParameters, MAX_RINGS};
use nalgebra::{Vector2, Vector3};
use smallvec::SmallVec;
use tracing::debug;

/// Everything the per-pixel function reads, resolved once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadingParams {
    pub field: FieldParams,
    pub camera_height: f64,
    pub liquid_color: Vector3<f64>,
    pub rings: SmallVec<[RingLight; MAX_RINGS]>,
}

impl ShadingParams {
    /// Resolve fallbacks and ranges, then convert to shading units.
    pub fn prepare(params: &SimulationParameters) -> Self {
        let p = params.resolved();
        let container_radius = p.container_radius();
        let rings: SmallVec<[RingLight; MAX_RINGS]> = p
            .rings
            .iter()
            .map(|ring| RingLight::prepare(ring, container_radius))
            .collect();
        debug!(
            "Prepared shading: {:.2} Hz, {} container, {} rings",
            p.frequency,
            p.container_shape,
            rings.len()
        );

        Self {
            field: FieldParams {
                frequency: p.frequency,
                amplitude: p.amplitude,
                gain: p.frequency_amplification,
                damping: p.damping,
                density: p.liquid_density,
                depth: p.depth,
                diameter: p.diameter,
                shape: p.container_shape,
                k_factor: p.calibration_k_factor,
                mode_offset: p.calibration_mode_offset,
            },
            camera_height: p.camera_height,
            liquid_color: p.liquid_color.to_unit_rgb(),
            rings,
        }
    }

    /// Freeze the height field at `time`.
    pub fn at_time(&self, time: f64) -> FrameShader<'_> {
        FrameShader {
            params: self,
            field: HeightField::new(self.field, time),
        }
    }
}

/// Shading state for one frame: parameters plus the height field at one
/// instant. Shared read-only by all worker threads.
#[derive(Clone, Copy, Debug)]
pub struct FrameShader<'a> {
    params: &'a ShadingParams,
    field: HeightField,
}

impl FrameShader<'_> {
    /// Colour at shading-space point `uv`, each channel in `[0, 1]`.
    pub fn shade(&self, uv: Vector2<f64>) -> Vector3<f64> {
        let dist = self.field.shape().distance(uv);
        if dist > 1.0 {
            return Vector3::zeros();
        }

        let h = self.field.height(uv, dist);
        let pos = Vector3::new(uv.x, uv.y, h * SURFACE_HEIGHT_SCALE);
        let normal = surface_normal(&self.field, uv, h, dist);

        let camera = Vector3::new(0.0, 0.0, self.params.camera_height);
        let view = (pos - camera).normalize();
        let rays = ChromaticRays::split(reflect(view, normal));

        let reflection: Vector3<f64> = self
            .params
            .rings
            .iter()
            .map(|ring| ring.shade(&pos, &rays))
            .sum();
        let mask = smoothstep(REFLECTION_FADE_START, REFLECTION_FADE_END, dist);

        let color = self.params.liquid_color * LIQUID_BASE_WEIGHT + reflection * mask;
        color.map(|c| c.clamp(0.0, 1.0))
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }
}
