//! Surface height field and finite-difference normals
//!
//! Orchestrates band blending, the micro-harmonic overlay, the viscous
//! "organic ridge" branch, crest sharpening, wall damping and the meniscus.

use super::boundary::ContainerShape;
use super::mode::{band_seed, band_weight, blend_discrete_choice, BandChoice, SymmetryOrder};
use super::mode::{FREQUENCY_BAND_SCALE, MICRO_SEED_OFFSET};
use super::smoothstep;
use super::wave::{standing_wave, wavenumber};
use nalgebra::{Vector2, Vector3};

/// Below this frequency the surface is calm and perfectly flat.
pub const CALM_FREQUENCY: f64 = 0.1;
/// Viscosity above which ridges replace crests.
pub const ORGANIC_DENSITY_THRESHOLD: f64 = 6.0;
/// Temporal phase rate: `w = time * frequency * 1.5`.
const PHASE_RATE: f64 = 1.5;
const MICRO_K_SCALE: f64 = 3.0;
const MICRO_PHASE_SCALE: f64 = 1.2;
const MICRO_WEIGHT: f64 = 0.2;
const MENISCUS_HEIGHT: f64 = 0.2;
/// Finite-difference step for normals, in shading units.
const NORMAL_EPSILON: f64 = 0.001;
const NORMAL_Z_SCALE: f64 = 0.8;

/// Physics inputs to the height field, already resolved and clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    pub frequency: f64,
    pub amplitude: f64,
    pub gain: f64,
    pub damping: f64,
    pub density: f64,
    pub depth: f64,
    pub diameter: f64,
    pub shape: ContainerShape,
    pub k_factor: f64,
    pub mode_offset: f64,
}

/// Height field frozen at one instant. Cheap to build; build one per frame.
#[derive(Clone, Copy, Debug)]
pub struct HeightField {
    params: FieldParams,
    k: f64,
    phase: f64,
    density_factor: f64,
    bottom_friction: f64,
}

impl HeightField {
    pub fn new(params: FieldParams, time: f64) -> Self {
        Self {
            k: wavenumber(params.frequency, params.diameter, params.depth, params.k_factor),
            phase: time * params.frequency * PHASE_RATE,
            density_factor: params.density.max(1.0),
            bottom_friction: 1.0 + 1.0 / (params.depth.max(0.0) + 0.1),
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    #[inline]
    pub fn shape(&self) -> ContainerShape {
        self.params.shape
    }

    #[inline]
    pub fn is_organic(&self) -> bool {
        self.params.density > ORGANIC_DENSITY_THRESHOLD
    }

    /// Height at `p`, computing the boundary metric itself.
    pub fn height_at(&self, p: Vector2<f64>) -> f64 {
        self.height(p, self.params.shape.distance(p))
    }

    /// Height at `p` given its precomputed boundary metric `dist`.
    pub fn height(&self, p: Vector2<f64>, dist: f64) -> f64 {
        if dist > 1.0 || self.params.frequency < CALM_FREQUENCY {
            return 0.0;
        }
        let sharp = self.shaped_wave(p);

        let envelope = smoothstep(1.0, 0.90, dist);
        let damping =
            1.0 - self.params.damping * 0.5 * dist * dist * self.bottom_friction;
        let meniscus = smoothstep(0.95, 1.0, dist) * MENISCUS_HEIGHT;

        (sharp - 0.5) * self.params.amplitude * self.params.gain * damping * envelope + meniscus
    }

    /// Wave shape after the density branch and crest sharpening, before
    /// amplitude, envelope and damping. Organic fields stay within `[0, 1]`.
    pub fn shaped_wave(&self, p: Vector2<f64>) -> f64 {
        let main = self.main_wave(p);
        if self.is_organic() {
            // Ridges: |wave| flattened into plateaus, then inverted.
            let organic = smoothstep(0.2, 0.8, main.abs());
            return 1.0 - organic;
        }
        let raw = main + self.micro_wave(p) * MICRO_WEIGHT / self.density_factor;
        let sharp_exp = 1.8 + self.params.density * 0.2;
        (sharp_exp * (raw - 0.2)).exp()
    }

    /// Band-blended main standing wave.
    pub fn main_wave(&self, p: Vector2<f64>) -> f64 {
        let FieldParams { frequency, shape, mode_offset, .. } = self.params;
        blend_discrete_choice(
            frequency * FREQUENCY_BAND_SCALE,
            |band| BandChoice::for_band(band, frequency, shape, mode_offset),
            |choice| standing_wave(p, self.k, self.phase, choice.order, choice.seed, shape),
            band_weight,
        )
    }

    /// Fine ripple layer: 3× wavenumber, 1.2× phase rate, fixed order 12.
    pub fn micro_wave(&self, p: Vector2<f64>) -> f64 {
        let FieldParams { frequency, shape, mode_offset, .. } = self.params;
        let k = self.k * MICRO_K_SCALE;
        let phase = self.phase * MICRO_PHASE_SCALE;
        blend_discrete_choice(
            frequency * FREQUENCY_BAND_SCALE,
            |band| band_seed(band, mode_offset) + MICRO_SEED_OFFSET,
            |seed| standing_wave(p, k, phase, SymmetryOrder::MICRO, *seed, shape),
            band_weight,
        )
    }
}

/// Normal from forward differences of the height field.
///
/// The offsets reuse the centre's boundary metric, so they see the same
/// envelope and damping as the centre sample.
pub fn surface_normal(field: &HeightField, p: Vector2<f64>, h: f64, dist: f64) -> Vector3<f64> {
    let hx = field.height(p + Vector2::new(NORMAL_EPSILON, 0.0), dist);
    let hy = field.height(p + Vector2::new(0.0, NORMAL_EPSILON), dist);
    Vector3::new(h - hx, h - hy, NORMAL_EPSILON * NORMAL_Z_SCALE).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_params() -> FieldParams {
        FieldParams {
            frequency: 10.0,
            amplitude: 0.01,
            gain: 1.0,
            damping: 0.15,
            density: 1.0,
            depth: 5.0,
            diameter: 9.0,
            shape: ContainerShape::Circle,
            k_factor: 1.0,
            mode_offset: 0.0,
        }
    }

    fn sample_points() -> Vec<Vector2<f64>> {
        (0..40)
            .map(|i| {
                let a = i as f64 * 0.7;
                let r = (i as f64 * 0.173).fract() * 1.3;
                Vector2::new(r * a.cos(), r * a.sin())
            })
            .collect()
    }

    #[test]
    fn test_outside_boundary_is_zero() {
        for shape in ContainerShape::ALL {
            let field = HeightField::new(FieldParams { shape, ..reference_params() }, 1.3);
            for p in sample_points() {
                if shape.is_outside(p) {
                    assert_eq!(field.height_at(p), 0.0, "{shape} at {p:?}");
                }
            }
            assert_eq!(field.height_at(Vector2::new(3.0, -2.0)), 0.0);
        }
    }

    #[test]
    fn test_calm_surface_is_flat() {
        for shape in ContainerShape::ALL {
            for &density in &[1.0, 8.0] {
                let params = FieldParams { frequency: 0.05, shape, density, amplitude: 1.0, ..reference_params() };
                for &t in &[0.0, 2.5, 100.0] {
                    let field = HeightField::new(params, t);
                    for p in sample_points() {
                        assert_eq!(field.height_at(p), 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_organic_branch_bounded() {
        for shape in ContainerShape::ALL {
            for &freq in &[0.1, 2.0, 4.0, 9.0, 13.0, 27.5] {
                let params = FieldParams { frequency: freq, density: 8.0, shape, ..reference_params() };
                let field = HeightField::new(params, 0.77);
                assert!(field.is_organic());
                for p in sample_points() {
                    let s = field.shaped_wave(p);
                    assert!((0.0..=1.0).contains(&s), "organic value {s} out of [0,1]");
                }
            }
        }
    }

    #[test]
    fn test_normal_density_sharpening_positive() {
        let field = HeightField::new(reference_params(), 0.4);
        assert!(!field.is_organic());
        for p in sample_points() {
            assert!(field.shaped_wave(p) > 0.0);
        }
    }

    #[test]
    fn test_micro_layer_pinned() {
        // 10 Hz sits at band position 5.0, fully inside band 5.
        let params = FieldParams { mode_offset: 1.5, ..reference_params() };
        let t = 0.8;
        let field = HeightField::new(params, t);
        let k = wavenumber(10.0, 9.0, 5.0, 1.0);
        let seed = band_seed(5.0, 1.5) + 33.1;
        for p in sample_points() {
            let expected = standing_wave(p, k * 3.0, t * 10.0 * 1.5 * 1.2, SymmetryOrder(12.0), seed, params.shape);
            assert!((field.micro_wave(p) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_micro_weight_scales_with_density() {
        for &density in &[1.0, 4.0] {
            let field = HeightField::new(FieldParams { density, ..reference_params() }, 0.3);
            for p in sample_points() {
                let raw = field.main_wave(p) + field.micro_wave(p) * 0.2 / density;
                let expected = ((1.8 + density * 0.2) * (raw - 0.2)).exp();
                assert!((field.shaped_wave(p) - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_organic_branch_ignores_micro() {
        let field = HeightField::new(FieldParams { density: 8.0, ..reference_params() }, 1.1);
        for p in sample_points() {
            let expected = 1.0 - smoothstep(0.2, 0.8, field.main_wave(p).abs());
            assert_eq!(field.shaped_wave(p), expected);
        }
    }

    #[test]
    fn test_damping_factor_inside_envelope() {
        let p = Vector2::new(0.3, 0.2);
        let undamped = HeightField::new(FieldParams { damping: 0.0, ..reference_params() }, 0.6);
        let damped = HeightField::new(FieldParams { damping: 0.15, ..reference_params() }, 0.6);
        // Envelope is 1 and meniscus 0 for dist <= 0.9.
        for d in [0.0, 0.5, 0.8, 0.9] {
            let factor = 1.0 - 0.15 * 0.5 * d * d * (1.0 + 1.0 / (5.0 + 0.1));
            let expected = undamped.height(p, d) * factor;
            assert!((damped.height(p, d) - expected).abs() < 1e-15);
        }
        let base = (undamped.shaped_wave(p) - 0.5) * 0.01;
        assert!((undamped.height(p, 0.8) - base).abs() < 1e-15);
        assert!(base.abs() > 0.0);
    }

    #[test]
    fn test_meniscus_at_wall() {
        let field = HeightField::new(reference_params(), 0.0);
        // Envelope is zero on the wall, leaving only the meniscus.
        let h = field.height(Vector2::new(1.0, 0.0), 1.0);
        assert!((h - MENISCUS_HEIGHT).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let a = HeightField::new(reference_params(), 3.21);
        let b = HeightField::new(reference_params(), 3.21);
        for p in sample_points() {
            assert_eq!(a.height_at(p).to_bits(), b.height_at(p).to_bits());
        }
    }

    #[test]
    fn test_frequency_sweep_continuity() {
        // Band transitions are cross-faded; only the fixed low-frequency
        // progression may step.
        const STEP: f64 = 5e-4;
        const EPS: f64 = 0.05;
        let hard_edges = [CALM_FREQUENCY, 3.0, 5.0, 8.0, 10.0, 12.0];
        let points = [Vector2::new(0.3, 0.2), Vector2::new(-0.5, 0.1), Vector2::new(0.05, -0.62)];

        for p in points {
            let mut f = 0.05;
            let mut prev = HeightField::new(FieldParams { frequency: f, ..reference_params() }, 0.0).height_at(p);
            while f < 30.0 {
                let next_f = f + STEP;
                let h = HeightField::new(FieldParams { frequency: next_f, ..reference_params() }, 0.0)
                    .height_at(p);
                let near_edge = hard_edges.iter().any(|&e| f < e + 1e-9 && next_f >= e - 1e-9);
                if !near_edge {
                    assert!(
                        (h - prev).abs() < EPS,
                        "jump of {} between {f:.4} and {next_f:.4} Hz at {p:?}",
                        (h - prev).abs()
                    );
                }
                prev = h;
                f = next_f;
            }
        }
    }

    #[test]
    fn test_normal_points_up_on_flat_surface() {
        let params = FieldParams { frequency: 0.0, ..reference_params() };
        let field = HeightField::new(params, 0.0);
        let p = Vector2::new(0.2, 0.1);
        let n = surface_normal(&field, p, field.height_at(p), params.shape.distance(p));
        assert!((n - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_normal_is_unit_length() {
        let field = HeightField::new(reference_params(), 0.9);
        for p in sample_points() {
            let d = field.shape().distance(p);
            if d > 1.0 {
                continue;
            }
            let n = surface_normal(&field, p, field.height(p, d), d);
            assert!((n.norm() - 1.0).abs() < 1e-9);
            assert!(n.z > 0.0);
        }
    }
}
