//! Wave-field physics: container boundaries, mode selection, standing-wave
//! synthesis, and the surface height field.
//!
//! Everything here is a pure function of (parameters, time, point). The
//! renderer calls into this module once per pixel per frame, so the helpers
//! stay allocation-free and branch on small enums rather than trait objects.

pub mod boundary;
pub mod height;
pub mod mode;
pub mod wave;

pub use boundary::ContainerShape;
pub use height::{surface_normal, FieldParams, HeightField};
pub use mode::{blend_discrete_choice, geometry_label, hash, select_mode, SymmetryOrder};
pub use wave::{standing_wave, wavenumber};

/// Hermite interpolation between two edges, matching the shading-language
/// builtin. Reversed edges (`edge0 > edge1`) produce a falling ramp.
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fractional part, always in `[0, 1)` for finite input.
#[inline]
pub fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// Linear blend; returns `a` exactly at `t == 0` and `b` exactly at `t == 1`.
#[inline]
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Sign with `sign(0) == 0`, unlike `f64::signum`.
#[inline]
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.4, 0.6, 0.0), 0.0);
        assert_eq!(smoothstep(0.4, 0.6, 1.0), 1.0);
        assert!((smoothstep(0.4, 0.6, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_smoothstep_reversed_edges_fall() {
        assert_eq!(smoothstep(1.0, 0.9, 0.5), 1.0);
        assert_eq!(smoothstep(1.0, 0.9, 1.0), 0.0);
        assert!(smoothstep(1.0, 0.9, 0.95) > 0.0 && smoothstep(1.0, 0.9, 0.95) < 1.0);
    }

    #[test]
    fn test_fract_negative() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-12);
        assert_eq!(fract(3.0), 0.0);
    }

    #[test]
    fn test_mix_endpoints_exact() {
        let a = 0.123_456_789;
        let b = -7.5;
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
    }

    #[test]
    fn test_sign_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-2.0), -1.0);
        assert_eq!(sign(0.1), 1.0);
    }
}
