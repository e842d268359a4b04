//! Shading and compositing constants

/// Scale from centred pixel coordinates to shading units. The container
/// wall sits at boundary metric 1.0 in shading units.
pub const UV_SCALE: f64 = 2.3;

/// Height-to-geometry scale for the reflecting surface point.
pub const SURFACE_HEIGHT_SCALE: f64 = 0.15;

/// Horizontal offset applied to the R and B reflection rays.
pub const CHROMATIC_OFFSET: f64 = 0.004;

/// Reflections fade out between these boundary metrics approaching the wall.
pub const REFLECTION_FADE_START: f64 = 0.98;
pub const REFLECTION_FADE_END: f64 = 0.92;

/// Weight of the liquid colour in the final pixel.
pub const LIQUID_BASE_WEIGHT: f64 = 0.02;

/// Per-exposure time step for stacked frames, in seconds.
pub const STACK_FRAME_DT: f64 = 0.016;

/// Largest wall-clock step the live clock accepts in one tick, in seconds.
pub const MAX_TICK_DT: f64 = 0.1;

/// Export raster edge length in pixels.
pub const EXPORT_RESOLUTION: u32 = 3840;

/// Largest edge length a render context accepts.
pub const MAX_DIMENSION: u32 = 16_384;
