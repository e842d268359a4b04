//! Exposure stacking
//!
//! Long-exposure frames are built by rendering several instants a fixed step
//! apart and screen-blending them over black.

use super::constants::STACK_FRAME_DT;
use super::context::RenderContext;
use super::shading::ShadingParams;
use super::types::{Frame, Zoom};
use rayon::prelude::*;
use tracing::debug;

/// Screen blend `a + b - a·b`. Exact for `a == 0`.
#[inline]
pub fn screen(a: f64, b: f64) -> f64 {
    a + b - a * b
}

/// Blend `layer` into `acc` in place. Both frames must share dimensions.
pub fn screen_into(acc: &mut Frame, layer: &Frame) {
    debug_assert_eq!((acc.width, acc.height), (layer.width, layer.height));
    acc.pixels
        .par_iter_mut()
        .zip(layer.pixels.par_iter())
        .for_each(|(a, &(r, g, b))| {
            *a = (screen(a.0, r), screen(a.1, g), screen(a.2, b));
        });
}

/// Render `count` exposures at `time + i·dt·speed` and screen-blend them over
/// a black base. `count` below 1 is treated as 1.
pub fn stack_exposures(
    ctx: &RenderContext,
    params: &ShadingParams,
    time: f64,
    count: u32,
    speed: f64,
    zoom: Zoom,
) -> Frame {
    let count = count.max(1);
    let step = STACK_FRAME_DT * speed;
    debug!("Stacking {count} exposures from t={time:.3}s");

    let mut acc = Frame::black(ctx.width, ctx.height);
    for i in 0..count {
        let layer = ctx.render(params, time + i as f64 * step, zoom);
        ctx.install(|| screen_into(&mut acc, &layer));
    }
    acc
}
