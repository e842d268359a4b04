//! Live view: the interactive frame loop's clock and render surface.

use crate::params::SimulationParameters;
use crate::render::constants::MAX_TICK_DT;
use crate::render::error::Result;
use crate::render::{Frame, RenderContext, ShadingParams, Zoom};
use tracing::debug;

/// Simulation clock. Advances only while playing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playback {
    pub time: f64,
    pub playing: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Self { time: 0.0, playing: true }
    }
}

impl Playback {
    /// Advance by a wall-clock delta scaled by `speed`.
    ///
    /// Deltas are clamped to `[0, 0.1]` s so a stalled tick does not make the
    /// pattern jump.
    pub fn advance(&mut self, real_dt: f64, speed: f64) {
        if !self.playing {
            return;
        }
        let dt = if real_dt.is_finite() { real_dt.clamp(0.0, MAX_TICK_DT) } else { 0.0 };
        self.time += dt * speed.max(0.0);
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

/// The interactive surface: a live render context, clock and zoom.
pub struct LiveView {
    context: RenderContext,
    pub playback: Playback,
    pub zoom: Zoom,
}

impl LiveView {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            context: RenderContext::new(width, height)?,
            playback: Playback::default(),
            zoom: Zoom::default(),
        })
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.context.resize(width, height)
    }

    /// One scheduling tick: advance the clock, then render.
    ///
    /// While paused with a frame stack above 1, the stacked long-exposure
    /// preview is rendered instead of a single frame.
    pub fn tick(&mut self, real_dt: f64, params: &SimulationParameters) -> Frame {
        let resolved = params.resolved();
        self.playback.advance(real_dt, resolved.simulation_speed);
        let shading = ShadingParams::prepare(&resolved);

        if !self.playback.playing && resolved.export_frame_stack > 1 {
            debug!("Paused preview with {}x stack", resolved.export_frame_stack);
            return self.context.render_stacked(
                &shading,
                self.playback.time,
                resolved.export_frame_stack,
                resolved.simulation_speed,
                self.zoom,
            );
        }
        self.context.render(&shading, self.playback.time, self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_clamps_large_steps() {
        let mut pb = Playback::default();
        pb.advance(5.0, 1.0);
        assert!((pb.time - 0.1).abs() < 1e-12);
        pb.advance(5.0, 2.0);
        assert!((pb.time - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_advance_ignores_bad_deltas() {
        let mut pb = Playback::default();
        pb.advance(-1.0, 1.0);
        pb.advance(f64::NAN, 1.0);
        pb.advance(0.05, -3.0);
        assert_eq!(pb.time, 0.0);
    }

    #[test]
    fn test_paused_clock_stands_still() {
        let mut pb = Playback { time: 2.0, playing: false };
        pb.advance(0.05, 1.0);
        assert_eq!(pb.time, 2.0);
        pb.toggle();
        pb.advance(0.05, 1.0);
        assert!((pb.time - 2.05).abs() < 1e-12);
        pb.reset();
        assert_eq!(pb.time, 0.0);
    }

    #[test]
    fn test_tick_matches_direct_render() {
        let params = SimulationParameters::default();
        let mut live = LiveView::new(32, 24).unwrap();
        let frame = live.tick(0.05, &params);
        assert!((live.playback.time - 0.05).abs() < 1e-12);
        let direct = live
            .context()
            .render(&ShadingParams::prepare(&params), live.playback.time, Zoom::identity());
        assert_eq!(frame, direct);
    }

    #[test]
    fn test_paused_tick_renders_stack() {
        let params = SimulationParameters { export_frame_stack: 4, ..SimulationParameters::default() };
        let mut live = LiveView::new(24, 24).unwrap();
        live.playback = Playback { time: 1.0, playing: false };
        let frame = live.tick(0.05, &params);
        let shading = ShadingParams::prepare(&params);
        let stacked = live.context().render_stacked(&shading, 1.0, 4, 1.0, Zoom::identity());
        assert_eq!(live.playback.time, 1.0);
        assert_eq!(frame, stacked);
    }
}
