//! Standing-wave synthesis
//!
//! Surface displacement is a superposition of directional cosine waves. The
//! direction set, spatial scaling, and normalization depend on the symmetry
//! order and the container shape.

use super::boundary::ContainerShape;
use super::fract;
use super::mode::{SymmetryOrder, WaveFamily};
use nalgebra::Vector2;
use std::f64::consts::{PI, TAU};

/// Spatial stretch for the phased and trigonal families.
const PHASED_K_SCALE: f64 = 0.8;
/// Spatial stretch for the square-plate family.
const SQUARE_K_SCALE: f64 = 0.7;
/// Upper bound on directional terms summed for a circular lattice.
const MAX_LATTICE_TERMS: usize = 12;

/// Capillary-dispersion wavenumber in shading units.
///
/// `k ∝ f^(2/3)`, scaled by container diameter, a shallow-water stiffening
/// factor, and the calibration K factor.
pub fn wavenumber(frequency: f64, diameter: f64, depth: f64, k_factor: f64) -> f64 {
    let k_phys = frequency.max(0.0).powf(0.6666);
    let depth_factor = 1.0 + 1.5 / (depth.max(0.0) + 0.1).sqrt();
    k_phys * diameter * 0.18 * depth_factor * k_factor
}

/// Surface displacement at `p`, roughly in `[-1, 1]`.
///
/// `t` is the temporal phase in radians; `seed` only matters for square
/// containers, where it picks the lattice rotation and the sum/product mix.
pub fn standing_wave(
    p: Vector2<f64>,
    k: f64,
    t: f64,
    order: SymmetryOrder,
    seed: f64,
    shape: ContainerShape,
) -> f64 {
    match order.family() {
        WaveFamily::PhasedTripole => phased_lobes(p, k, t, 3, TAU / 3.0) / 1.5,
        WaveFamily::PhasedPentagon => phased_lobes(p, k, t, 5, 2.0 * TAU / 5.0) / 2.0,
        WaveFamily::Lattice => match shape {
            ContainerShape::Circle => circular_lattice(p, k, t, order),
            ContainerShape::Square => square_plate(p, k, t, seed),
            ContainerShape::Triangle | ContainerShape::Hexagon => trigonal_lattice(p, k, t),
        },
    }
}

/// `count` directions evenly spread over 2π, each with its own temporal phase
/// `i * phase_step`. The lobes rotate instead of standing still.
fn phased_lobes(p: Vector2<f64>, k: f64, t: f64, count: usize, phase_step: f64) -> f64 {
    let spacing = TAU / count as f64;
    (0..count)
        .map(|i| {
            let dir = direction(i as f64 * spacing);
            (p.dot(&dir) * k * PHASED_K_SCALE).cos() * (t + i as f64 * phase_step).cos()
        })
        .sum()
}

/// floor(N) directions over π (not 2π) so integer N yields N-fold symmetry.
fn circular_lattice(p: Vector2<f64>, k: f64, t: f64, order: SymmetryOrder) -> f64 {
    let loop_count = order.value().floor().max(1.0);
    let terms = (loop_count as usize).min(MAX_LATTICE_TERMS);
    let temporal = t.cos();
    let sum: f64 = (0..terms)
        .map(|i| {
            let dir = direction(i as f64 / loop_count * PI);
            (p.dot(&dir) * k).cos() * temporal
        })
        .sum();
    sum / (loop_count * 0.5).max(1.0)
}

/// Chladni-style plate: two axis waves in a frame rotated by a multiple of
/// 45°, either averaged (ripples) or multiplied (node grid).
fn square_plate(p: Vector2<f64>, k: f64, t: f64, seed: f64) -> f64 {
    let rot = seed.floor() * (PI * 0.25);
    let (s, c) = rot.sin_cos();
    let rotated = Vector2::new(p.x * c - p.y * s, p.x * s + p.y * c);
    let temporal = t.cos();
    let wx = (rotated.x * k * SQUARE_K_SCALE).cos() * temporal;
    let wy = (rotated.y * k * SQUARE_K_SCALE).cos() * temporal;
    if fract(seed * 0.1) > 0.5 {
        (wx + wy) * 0.5
    } else {
        wx * wy
    }
}

/// Three in-phase directions at 120°.
fn trigonal_lattice(p: Vector2<f64>, k: f64, t: f64) -> f64 {
    let temporal = t.cos();
    let sum: f64 = (0..3)
        .map(|i| {
            let dir = direction(i as f64 * TAU / 3.0);
            (p.dot(&dir) * k * PHASED_K_SCALE).cos() * temporal
        })
        .sum();
    sum / 3.0
}

#[inline]
fn direction(angle: f64) -> Vector2<f64> {
    let (s, c) = angle.sin_cos();
    Vector2::new(c, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate(p: Vector2<f64>, angle: f64) -> Vector2<f64> {
        let (s, c) = angle.sin_cos();
        Vector2::new(p.x * c - p.y * s, p.x * s + p.y * c)
    }

    #[test]
    fn test_wavenumber_reference() {
        // 10 Hz, 9 cm, 5 cm depth, K = 1.
        let k = wavenumber(10.0, 9.0, 5.0, 1.0);
        let expected = 10f64.powf(0.6666) * 9.0 * 0.18 * (1.0 + 1.5 / 5.1f64.sqrt());
        assert!((k - expected).abs() < 1e-9);
    }

    #[test]
    fn test_wavenumber_shallow_is_stiffer() {
        assert!(wavenumber(10.0, 9.0, 0.5, 1.0) > wavenumber(10.0, 9.0, 20.0, 1.0));
        assert_eq!(wavenumber(0.0, 9.0, 5.0, 1.0), 0.0);
    }

    #[test]
    fn test_waves_are_bounded() {
        let shapes = ContainerShape::ALL;
        let orders = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 6.0, 8.0, 12.0, 17.3];
        for shape in shapes {
            for &n in &orders {
                for i in 0..50 {
                    let p = Vector2::new((i as f64 * 0.37).sin(), (i as f64 * 0.91).cos());
                    let h = standing_wave(p, 9.0, i as f64 * 0.3, SymmetryOrder(n), 24.68, shape);
                    assert!(h.is_finite());
                    assert!(h.abs() <= 2.5 + 1e-9, "N={n} {shape} produced {h}");
                }
            }
        }
    }

    #[test]
    fn test_circle_hexagonal_sixfold_symmetry() {
        let p = Vector2::new(0.31, 0.17);
        let a = standing_wave(p, 8.0, 0.4, SymmetryOrder::HEXAGONAL, 0.0, ContainerShape::Circle);
        let b = standing_wave(rotate(p, PI / 3.0), 8.0, 0.4, SymmetryOrder::HEXAGONAL, 0.0, ContainerShape::Circle);
        assert!((a - b).abs() < 1e-9, "N=3 lattice should repeat every 60°");
    }

    #[test]
    fn test_circle_dipole_is_single_cosine() {
        let p = Vector2::new(0.2, -0.6);
        let h = standing_wave(p, 5.0, 1.1, SymmetryOrder::DIPOLE, 0.0, ContainerShape::Circle);
        assert!((h - (0.2 * 5.0f64).cos() * 1.1f64.cos()).abs() < 1e-12);
    }

    #[test]
    fn test_phased_tripole_rotates_in_time() {
        // Advancing time by one phase step equals rotating the point by 120°.
        let p = Vector2::new(0.3, 0.12);
        let order = SymmetryOrder::PHASED_TRIPOLE;
        let later = standing_wave(p, 6.0, TAU / 3.0, order, 0.0, ContainerShape::Circle);
        let rotated = standing_wave(rotate(p, TAU / 3.0), 6.0, 0.0, order, 0.0, ContainerShape::Circle);
        assert!((later - rotated).abs() < 1e-9);
    }

    #[test]
    fn test_square_seed_selects_sum_or_product() {
        let p = Vector2::new(0.25, 0.4);
        let k = 6.0;
        // seed 1.0: rotation 45°, fract(0.1) <= 0.5 → product.
        let product = standing_wave(p, k, 0.0, SymmetryOrder::QUADRUPOLE, 1.0, ContainerShape::Square);
        let r = rotate(p, PI * 0.25);
        let expected = (r.x * k * 0.7).cos() * (r.y * k * 0.7).cos();
        assert!((product - expected).abs() < 1e-12);

        // seed 6.0: rotation 270°, fract(0.6) > 0.5 → average.
        let sum = standing_wave(p, k, 0.0, SymmetryOrder::QUADRUPOLE, 6.0, ContainerShape::Square);
        let r = rotate(p, 6.0 * PI * 0.25);
        let expected = ((r.x * k * 0.7).cos() + (r.y * k * 0.7).cos()) * 0.5;
        assert!((sum - expected).abs() < 1e-12);
    }

    #[test]
    fn test_trigonal_ignores_order() {
        let p = Vector2::new(-0.1, 0.45);
        for shape in [ContainerShape::Triangle, ContainerShape::Hexagon] {
            let a = standing_wave(p, 7.0, 0.2, SymmetryOrder::HEXAGONAL, 3.0, shape);
            let b = standing_wave(p, 7.0, 0.2, SymmetryOrder::MICRO, 9.0, shape);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_centre_peak_at_time_zero() {
        let h = standing_wave(Vector2::zeros(), 10.0, 0.0, SymmetryOrder::HEXAGONAL, 0.0, ContainerShape::Circle);
        assert!((h - 2.0).abs() < 1e-12, "3 in-phase cosines / 1.5 = 2 at the centre");
    }
}
