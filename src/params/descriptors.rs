//! Parameter descriptors for the simulation inputs.
//!
//! Each descriptor names a parameter and its accepted range. Ingestion clamps
//! into these ranges so downstream math never sees a negative depth or a zero
//! divisor. The ranges track the control surface's sliders, widened where the
//! physics is still well defined.

/// Descriptor for a floating-point parameter with bounded range.
#[derive(Clone, Debug)]
pub struct FloatParamDescriptor {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    #[allow(dead_code)]
    pub description: &'static str,
}

/// Descriptor for an integer parameter with bounded range.
#[derive(Clone, Debug)]
pub struct IntParamDescriptor {
    pub name: &'static str,
    pub min: u32,
    pub max: u32,
    pub default: u32,
    #[allow(dead_code)]
    pub description: &'static str,
}

impl FloatParamDescriptor {
    /// Clamp into range; non-finite input falls back to the default.
    #[inline]
    pub fn resolve(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }

    /// Like [`resolve`](Self::resolve), but zero also means "unset".
    #[inline]
    pub fn resolve_nonzero(&self, value: f64) -> f64 {
        if value == 0.0 {
            self.default
        } else {
            self.resolve(value)
        }
    }
}

impl IntParamDescriptor {
    #[inline]
    pub fn resolve(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

// ==================== EXCITATION ====================

pub const FREQUENCY: FloatParamDescriptor = FloatParamDescriptor {
    name: "frequency",
    min: 0.0,
    max: 200.0,
    default: 10.0,
    description: "Excitation frequency in Hz; below 0.1 the surface is calm",
};

pub const AMPLITUDE: FloatParamDescriptor = FloatParamDescriptor {
    name: "amplitude",
    min: 0.0,
    max: 1.0,
    default: 0.01,
    description: "Wave height scale",
};

pub const FREQUENCY_AMPLIFICATION: FloatParamDescriptor = FloatParamDescriptor {
    name: "frequencyAmplification",
    min: 1.0,
    max: 20.0,
    default: 1.0,
    description: "Extra gain applied on top of amplitude",
};

pub const DAMPING: FloatParamDescriptor = FloatParamDescriptor {
    name: "damping",
    min: 0.0,
    max: 1.0,
    default: 0.15,
    description: "Wall friction coefficient",
};

pub const SIMULATION_SPEED: FloatParamDescriptor = FloatParamDescriptor {
    name: "simulationSpeed",
    min: 0.0,
    max: 2.0,
    default: 1.0,
    description: "Time scale multiplier for the animation clock",
};

// ==================== LIQUID & CONTAINER ====================

pub const LIQUID_DENSITY: FloatParamDescriptor = FloatParamDescriptor {
    name: "liquidDensity",
    min: 1.0,
    max: 10.0,
    default: 1.0,
    description: "Viscosity; above 6 the surface switches to organic ridges",
};

pub const DEPTH: FloatParamDescriptor = FloatParamDescriptor {
    name: "depth",
    min: 0.5,
    max: 30.0,
    default: 5.0,
    description: "Liquid depth in cm",
};

pub const DIAMETER: FloatParamDescriptor = FloatParamDescriptor {
    name: "diameter",
    min: 1.0,
    max: 50.0,
    default: 9.0,
    description: "Container diameter in cm",
};

pub const CAMERA_HEIGHT: FloatParamDescriptor = FloatParamDescriptor {
    name: "cameraHeight",
    min: 2.0,
    max: 30.0,
    default: 17.0,
    description: "Camera height above the surface, shading units",
};

// ==================== CALIBRATION ====================

pub const CALIBRATION_K_FACTOR: FloatParamDescriptor = FloatParamDescriptor {
    name: "calibrationKFactor",
    min: 0.05,
    max: 10.0,
    default: 1.0,
    description: "Wavenumber scale",
};

pub const CALIBRATION_MODE_OFFSET: FloatParamDescriptor = FloatParamDescriptor {
    name: "calibrationModeOffset",
    min: -12.0,
    max: 12.0,
    default: 0.0,
    description: "Bias added to mode seeds and symmetry orders",
};

// ==================== LIGHT RINGS ====================

pub const RING_DOT_SIZE: FloatParamDescriptor = FloatParamDescriptor {
    name: "dotSize",
    min: 0.05,
    max: 2.0,
    default: 0.30,
    description: "LED dot size as a fraction of dot spacing",
};

pub const RING_HEIGHT: FloatParamDescriptor = FloatParamDescriptor {
    name: "height",
    min: 0.2,
    max: 10.0,
    default: 5.0,
    description: "Ring height above the liquid",
};

pub const RING_RADIUS: FloatParamDescriptor = FloatParamDescriptor {
    name: "radius",
    min: 1.0,
    max: 30.0,
    default: 4.5,
    description: "Ring radius in cm",
};

pub const RING_SPREAD: FloatParamDescriptor = FloatParamDescriptor {
    name: "spread",
    min: 0.2,
    max: 4.0,
    default: 1.0,
    description: "Reflection width factor",
};

pub const RING_INTENSITY: FloatParamDescriptor = FloatParamDescriptor {
    name: "intensity",
    min: 0.0,
    max: 10.0,
    default: 4.0,
    description: "Brightness multiplier",
};

pub const RING_COUNT: IntParamDescriptor = IntParamDescriptor {
    name: "count",
    min: 10,
    max: 144,
    default: 85,
    description: "LED count around the ring; dense rings read as continuous",
};

// ==================== EXPORT ====================

pub const EXPORT_FRAME_STACK: IntParamDescriptor = IntParamDescriptor {
    name: "exportFrameStack",
    min: 1,
    max: 120,
    default: 1,
    description: "Frames accumulated for long-exposure stacking",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_clamps() {
        assert_eq!(DEPTH.resolve(-3.0), 0.5);
        assert_eq!(DEPTH.resolve(100.0), 30.0);
        assert_eq!(DEPTH.resolve(7.5), 7.5);
    }

    #[test]
    fn test_non_finite_falls_back() {
        assert_eq!(DIAMETER.resolve(f64::NAN), 9.0);
        assert_eq!(FREQUENCY.resolve(f64::INFINITY), FREQUENCY.default);
    }

    #[test]
    fn test_zero_means_unset() {
        assert_eq!(LIQUID_DENSITY.resolve_nonzero(0.0), 1.0);
        assert_eq!(CALIBRATION_K_FACTOR.resolve_nonzero(0.0), 1.0);
        assert_eq!(FREQUENCY_AMPLIFICATION.resolve_nonzero(0.0), 1.0);
        assert_eq!(LIQUID_DENSITY.resolve_nonzero(8.0), 8.0);
    }

    #[test]
    fn test_defaults_within_range() {
        let floats = [
            &FREQUENCY, &AMPLITUDE, &FREQUENCY_AMPLIFICATION, &DAMPING, &SIMULATION_SPEED,
            &LIQUID_DENSITY, &DEPTH, &DIAMETER, &CAMERA_HEIGHT, &CALIBRATION_K_FACTOR,
            &CALIBRATION_MODE_OFFSET, &RING_DOT_SIZE, &RING_HEIGHT, &RING_RADIUS,
            &RING_SPREAD, &RING_INTENSITY,
        ];
        for d in floats {
            assert!(d.min <= d.default && d.default <= d.max, "{} default out of range", d.name);
        }
        for d in [&RING_COUNT, &EXPORT_FRAME_STACK] {
            assert!(d.min <= d.default && d.default <= d.max, "{} default out of range", d.name);
        }
    }
}
