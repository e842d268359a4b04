//! Hash-driven mode selection and band cross-fading
//!
//! The excitation frequency is quantized into bands (one every 2 Hz). Each band
//! index hashes to a seed, and the seed picks a symmetry order for that band.
//! Two neighbouring bands are always evaluated and cross-faded so a sweep never
//! pops between patterns.

use super::boundary::ContainerShape;
use super::{fract, mix, smoothstep};
use smallvec::SmallVec;

/// Band index = floor(frequency * scale); 0.5 gives one band per 2 Hz.
pub const FREQUENCY_BAND_SCALE: f64 = 0.5;
/// Spacing between per-band hash seeds.
pub const MODE_SEED_STRIDE: f64 = 12.34;
/// Seed shift for the micro-harmonic layer so it decorrelates from the main wave.
pub const MICRO_SEED_OFFSET: f64 = 33.1;
/// Transition window inside each band; outside it the pattern holds still.
pub const BAND_BLEND_START: f64 = 0.4;
pub const BAND_BLEND_END: f64 = 0.6;

const HASH_SCALE: f64 = 43_758.545_312_3;
const HALF_INTEGER_TOLERANCE: f64 = 0.1;

/// `fract(sin(seed) * 43758.5453)`, the classic fragment-shader hash.
#[inline]
pub fn hash(seed: f64) -> f64 {
    fract(seed.sin() * HASH_SCALE)
}

/// Number of angular lobes in a standing-wave pattern.
///
/// Integer orders are plain lattices. The half-integer orders 1.5 and 2.5 are
/// phased variants producing 3 and 5 rotating lobes. Calibration offsets can
/// push the value anywhere, so this stays a real number.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct SymmetryOrder(pub f64);

/// How the synthesizer treats an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveFamily {
    /// Three directions at 120° with temporal phase offsets.
    PhasedTripole,
    /// Five directions at 72° with temporal phase offsets.
    PhasedPentagon,
    /// Shape-dependent lattice of cosine waves.
    Lattice,
}

impl SymmetryOrder {
    pub const DIPOLE: SymmetryOrder = SymmetryOrder(1.0);
    pub const PHASED_TRIPOLE: SymmetryOrder = SymmetryOrder(1.5);
    pub const QUADRUPOLE: SymmetryOrder = SymmetryOrder(2.0);
    pub const PHASED_PENTAGON: SymmetryOrder = SymmetryOrder(2.5);
    pub const HEXAGONAL: SymmetryOrder = SymmetryOrder(3.0);
    pub const SQUARE_LATTICE: SymmetryOrder = SymmetryOrder(4.0);
    pub const COMPLEX_LATTICE: SymmetryOrder = SymmetryOrder(6.0);
    pub const OCTAGONAL: SymmetryOrder = SymmetryOrder(8.0);
    pub const MICRO: SymmetryOrder = SymmetryOrder(12.0);

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn offset(self, by: f64) -> SymmetryOrder {
        SymmetryOrder(self.0 + by)
    }

    #[inline]
    pub fn family(self) -> WaveFamily {
        if (self.0 - 1.5).abs() < HALF_INTEGER_TOLERANCE {
            WaveFamily::PhasedTripole
        } else if (self.0 - 2.5).abs() < HALF_INTEGER_TOLERANCE {
            WaveFamily::PhasedPentagon
        } else {
            WaveFamily::Lattice
        }
    }
}

/// Pick the symmetry order for a band.
///
/// Below 12 Hz the progression is fixed by frequency alone. Above it the hash
/// picks from a shape-specific table.
pub fn select_mode(hash_value: f64, frequency: f64, shape: ContainerShape) -> SymmetryOrder {
    if frequency < 3.0 {
        return SymmetryOrder::DIPOLE;
    }
    if frequency < 5.0 {
        return SymmetryOrder::PHASED_TRIPOLE;
    }
    if frequency < 8.0 {
        return SymmetryOrder::QUADRUPOLE;
    }
    if frequency < 10.0 {
        return SymmetryOrder::PHASED_PENTAGON;
    }
    if frequency < 12.0 {
        return SymmetryOrder::HEXAGONAL;
    }

    let bucket = hash_value * 10.0;
    match shape {
        ContainerShape::Square => {
            if bucket < 5.0 {
                SymmetryOrder::QUADRUPOLE
            } else {
                SymmetryOrder::SQUARE_LATTICE
            }
        }
        ContainerShape::Triangle | ContainerShape::Hexagon => SymmetryOrder::HEXAGONAL,
        ContainerShape::Circle => {
            if bucket < 4.0 {
                SymmetryOrder::COMPLEX_LATTICE
            } else if bucket < 7.0 {
                SymmetryOrder::SQUARE_LATTICE
            } else if bucket < 8.0 {
                SymmetryOrder::MICRO
            } else if bucket < 9.0 {
                SymmetryOrder::OCTAGONAL
            } else {
                SymmetryOrder::HEXAGONAL
            }
        }
    }
}

/// Hash seed for a band index, biased by the calibration offset.
#[inline]
pub fn band_seed(band: f64, mode_offset: f64) -> f64 {
    band * MODE_SEED_STRIDE + mode_offset
}

/// Cross-fade weight for a fractional band position: flat at both ends,
/// transitioning only across the middle of the band.
#[inline]
pub fn band_weight(fraction: f64) -> f64 {
    smoothstep(BAND_BLEND_START, BAND_BLEND_END, fraction)
}

/// Evaluate a hash-driven discrete choice at the two integer indices around
/// `x` and blend the results by `weight(fract(x))`.
///
/// When the weight saturates only one side is evaluated; the result is
/// identical to the full blend in that case.
pub fn blend_discrete_choice<C>(
    x: f64,
    choose: impl Fn(f64) -> C,
    eval: impl Fn(&C) -> f64,
    weight: impl Fn(f64) -> f64,
) -> f64 {
    let lower = x.floor();
    let w = weight(x - lower);
    if w <= 0.0 {
        return eval(&choose(lower));
    }
    if w >= 1.0 {
        return eval(&choose(lower + 1.0));
    }
    mix(eval(&choose(lower)), eval(&choose(lower + 1.0)), w)
}

/// Seed and order chosen for one band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandChoice {
    pub seed: f64,
    pub order: SymmetryOrder,
}

impl BandChoice {
    pub fn for_band(band: f64, frequency: f64, shape: ContainerShape, mode_offset: f64) -> Self {
        let seed = band_seed(band, mode_offset);
        let order = select_mode(hash(seed), frequency, shape).offset(mode_offset);
        Self { seed, order }
    }
}

/// The pair of live modes at a given frequency and their blend weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeBlend {
    pub lower: BandChoice,
    pub upper: BandChoice,
    pub weight: f64,
}

impl ModeBlend {
    pub fn at(frequency: f64, shape: ContainerShape, mode_offset: f64) -> Self {
        let scaled = frequency * FREQUENCY_BAND_SCALE;
        let band = scaled.floor();
        Self {
            lower: BandChoice::for_band(band, frequency, shape, mode_offset),
            upper: BandChoice::for_band(band + 1.0, frequency, shape, mode_offset),
            weight: band_weight(fract(scaled)),
        }
    }

    /// Orders that actually contribute: one at band edges, two mid-transition.
    pub fn active_orders(&self) -> SmallVec<[SymmetryOrder; 2]> {
        let mut orders = SmallVec::new();
        if self.weight < 1.0 {
            orders.push(self.lower.order);
        }
        if self.weight > 0.0 {
            orders.push(self.upper.order);
        }
        orders
    }

    /// The order carrying most of the weight.
    pub fn dominant(&self) -> SymmetryOrder {
        if self.weight < 0.5 {
            self.lower.order
        } else {
            self.upper.order
        }
    }
}

/// Human-readable name for the dominant pattern at a frequency.
pub fn geometry_label(frequency: f64, shape: ContainerShape, mode_offset: f64) -> String {
    if frequency < 0.1 {
        return "FLAT (0 Hz)".to_string();
    }
    let order = ModeBlend::at(frequency, shape, mode_offset).dominant();
    let n = order.value();
    let is = |target: f64| (n - target).abs() < 1e-9;

    let label = match order.family() {
        WaveFamily::PhasedTripole => "TRIPOLE (3 LOBES)",
        WaveFamily::PhasedPentagon => "PENTAGONAL (5 LOBES)",
        WaveFamily::Lattice if is(1.0) => "DIPOLE (2 LOBES)",
        WaveFamily::Lattice if is(2.0) => "QUADRUPOLE (4 LOBES)",
        WaveFamily::Lattice if is(3.0) && frequency < 12.0 => "HEXAGONAL (6 LOBES)",
        WaveFamily::Lattice if is(3.0) => match shape {
            ContainerShape::Triangle | ContainerShape::Hexagon => "TRIANGULAR LATTICE",
            _ => "HEXAGONAL LATTICE",
        },
        WaveFamily::Lattice if is(4.0) => "SQUARE LATTICE",
        WaveFamily::Lattice if is(6.0) => "COMPLEX LATTICE",
        WaveFamily::Lattice if is(8.0) || is(12.0) => "HIGH ORDER CHAOS",
        WaveFamily::Lattice => return format!("CALIBRATED (N={n:.2})"),
    };
    label.to_string()
}
