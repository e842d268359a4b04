//! Two-tone text watermark for exported stills
//!
//! Glyphs are 5×7 cell bitmaps rasterized procedurally with box-filtered
//! coverage, so the mark scales to any export size without a font file.
//! Bold text is emboldened by widening each horizontal run.

use super::types::Frame;
use crate::params::HexColor;
use nalgebra::Vector3;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Layout reference edge; sizes below are in pixels at this resolution.
const REFERENCE_EDGE: f64 = 3840.0;
const FONT_SIZE: f64 = 90.0;
const WORD_GAP: f64 = 25.0;
const BASELINE_FROM_BOTTOM: f64 = 130.0;
/// Cap height as a fraction of the font size.
const CAP_HEIGHT: f64 = 0.72;
const LETTER_SPACING_CELLS: f64 = 1.0;
const SPACE_ADVANCE_CELLS: f64 = 3.0;
const BOLD_EXTRA_CELLS: f64 = 0.45;

// 5-bit rows, most significant bit on the left.
const GLYPH_BITS: [[u8; GLYPH_ROWS]; 26] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

/// Horizontal run of lit cells within one glyph row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    row: u8,
    start: u8,
    len: u8,
}

type GlyphRuns = SmallVec<[Run; 12]>;

/// Per-letter run lists, merged once from the bitmaps.
static GLYPH_RUNS: Lazy<Vec<GlyphRuns>> = Lazy::new(|| GLYPH_BITS.iter().map(glyph_runs).collect());

fn glyph_runs(bits: &[u8; GLYPH_ROWS]) -> GlyphRuns {
    let mut runs = GlyphRuns::new();
    for (row, &mask) in bits.iter().enumerate() {
        let mut col = 0;
        while col < GLYPH_COLS {
            if mask & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                col += 1;
                continue;
            }
            let start = col;
            while col < GLYPH_COLS && mask & (1 << (GLYPH_COLS - 1 - col)) != 0 {
                col += 1;
            }
            runs.push(Run { row: row as u8, start: start as u8, len: (col - start) as u8 });
        }
    }
    runs
}

fn runs_for(ch: char) -> Option<&'static GlyphRuns> {
    let upper = ch.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| &GLYPH_RUNS[(upper as u8 - b'A') as usize])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weight {
    Light,
    Bold,
}

impl Weight {
    fn extra_cells(self) -> f64 {
        match self {
            Weight::Light => 0.0,
            Weight::Bold => BOLD_EXTRA_CELLS,
        }
    }
}

/// A run of text drawn in one colour and weight.
#[derive(Clone, Debug)]
pub struct TextSpan {
    pub text: String,
    pub weight: Weight,
    pub color: Vector3<f64>,
    pub alpha: f64,
}

impl TextSpan {
    /// Advance width in cells.
    fn width_cells(&self) -> f64 {
        let mut width = 0.0;
        let mut glyphs = 0usize;
        for ch in self.text.chars() {
            if runs_for(ch).is_some() {
                width += GLYPH_COLS as f64 + self.weight.extra_cells();
                glyphs += 1;
            } else {
                width += SPACE_ADVANCE_CELLS;
            }
        }
        // Spacing sits between glyphs, not after the last one.
        width + LETTER_SPACING_CELLS * glyphs.saturating_sub(1) as f64
    }
}

/// The export watermark: "CYMATICS" light, then "STUDIO LAB" bold.
pub fn studio_watermark() -> [TextSpan; 2] {
    [
        TextSpan {
            text: "CYMATICS".to_string(),
            weight: Weight::Light,
            color: Vector3::new(1.0, 1.0, 1.0),
            alpha: 0.85,
        },
        TextSpan {
            text: "STUDIO LAB".to_string(),
            weight: Weight::Bold,
            color: HexColor([0x3b, 0x82, 0xf6]).to_unit_rgb(),
            alpha: 1.0,
        },
    ]
}

/// Draw `spans` on one baseline, centred horizontally, scaled to the frame.
pub fn draw_watermark(frame: &mut Frame, spans: &[TextSpan]) {
    let scale = frame.width.min(frame.height) as f64 / REFERENCE_EDGE;
    let cell = FONT_SIZE * CAP_HEIGHT * scale / GLYPH_ROWS as f64;
    let gap = WORD_GAP * scale;
    let baseline = frame.height as f64 - BASELINE_FROM_BOTTOM * scale;
    let top = baseline - cell * GLYPH_ROWS as f64;

    let total: f64 = spans.iter().map(|s| s.width_cells() * cell).sum::<f64>()
        + gap * spans.len().saturating_sub(1) as f64;
    let mut pen_x = (frame.width as f64 - total) * 0.5;

    for span in spans {
        let span_width = span.width_cells() * cell;
        let mut coverage = Coverage::new(frame, pen_x, top, pen_x + span_width, baseline);
        let mut x = pen_x;
        for ch in span.text.chars() {
            match runs_for(ch) {
                Some(runs) => {
                    for run in runs {
                        let x0 = x + run.start as f64 * cell;
                        let x1 = x0 + (run.len as f64 + span.weight.extra_cells()) * cell;
                        let y0 = top + run.row as f64 * cell;
                        coverage.fill_rect(x0, y0, x1, y0 + cell);
                    }
                    x += (GLYPH_COLS as f64 + span.weight.extra_cells() + LETTER_SPACING_CELLS) * cell;
                }
                None => x += SPACE_ADVANCE_CELLS * cell,
            }
        }
        coverage.composite(frame, span.color, span.alpha);
        pen_x += span_width + gap;
    }
}

/// Coverage for one span, limited to its pixel bounding box.
struct Coverage {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl Coverage {
    fn new(frame: &Frame, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let left = (x0.floor().max(0.0) as u32).min(frame.width);
        let top = (y0.floor().max(0.0) as u32).min(frame.height);
        let right = (x1.ceil().max(0.0) as u32).clamp(left, frame.width);
        let bottom = (y1.ceil().max(0.0) as u32).clamp(top, frame.height);
        let (width, height) = (right - left, bottom - top);
        Self { left, top, width, height, values: vec![0.0; width as usize * height as usize] }
    }

    /// Accumulate box-filtered coverage of an axis-aligned rectangle, clipped
    /// to the box.
    fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let px0 = (x0.floor().max(self.left as f64) as u32).max(self.left);
        let py0 = (y0.floor().max(self.top as f64) as u32).max(self.top);
        let px1 = (x1.ceil().max(0.0) as u32).min(self.left + self.width);
        let py1 = (y1.ceil().max(0.0) as u32).min(self.top + self.height);
        for py in py0..py1 {
            let cy = (y1.min(py as f64 + 1.0) - y0.max(py as f64)).max(0.0);
            if cy <= 0.0 {
                continue;
            }
            let row = (py - self.top) as usize * self.width as usize;
            for px in px0..px1 {
                let cx = (x1.min(px as f64 + 1.0) - x0.max(px as f64)).max(0.0);
                let idx = row + (px - self.left) as usize;
                self.values[idx] = (self.values[idx] + cx * cy).min(1.0);
            }
        }
    }

    fn composite(&self, frame: &mut Frame, color: Vector3<f64>, alpha: f64) {
        if self.width == 0 {
            return;
        }
        for (dy, row) in self.values.chunks(self.width as usize).enumerate() {
            let start = (self.top as usize + dy) * frame.width as usize + self.left as usize;
            let pixels = &mut frame.pixels[start..start + self.width as usize];
            for (px, &cov) in pixels.iter_mut().zip(row) {
                if cov <= 0.0 {
                    continue;
                }
                let a = cov * alpha;
                px.0 = px.0 * (1.0 - a) + color.x * a;
                px.1 = px.1 * (1.0 - a) + color.y * a;
                px.2 = px.2 * (1.0 - a) + color.z * a;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_runs_merge_cells() {
        // T: full top bar then a single centre column.
        let runs = runs_for('T').unwrap();
        assert_eq!(runs[0], Run { row: 0, start: 0, len: 5 });
        assert!(runs[1..].iter().all(|r| r.start == 2 && r.len == 1));
        assert_eq!(runs.len(), 7);
    }

    #[test]
    fn test_lowercase_and_space() {
        assert_eq!(runs_for('c'), runs_for('C'));
        assert!(runs_for(' ').is_none());
    }

    #[test]
    fn test_bold_is_wider() {
        let light = TextSpan { text: "LAB".into(), weight: Weight::Light, color: Vector3::zeros(), alpha: 1.0 };
        let bold = TextSpan { weight: Weight::Bold, ..light.clone() };
        assert!(bold.width_cells() > light.width_cells());
        assert_eq!(light.width_cells(), 17.0);
    }

    #[test]
    fn test_watermark_stays_in_bottom_band() {
        let mut frame = Frame::black(384, 384);
        draw_watermark(&mut frame, &studio_watermark());
        let mut lit_rows = Vec::new();
        for y in 0..frame.height {
            if (0..frame.width).any(|x| frame.pixel(x, y) != (0.0, 0.0, 0.0)) {
                lit_rows.push(y);
            }
        }
        assert!(!lit_rows.is_empty());
        let baseline = 384.0 - 13.0;
        assert!(lit_rows.iter().all(|&y| (y as f64) < baseline + 1.0));
        assert!(lit_rows.iter().all(|&y| (y as f64) > baseline - 9.0));
    }

    #[test]
    fn test_watermark_colours() {
        let mut frame = Frame::black(3840 / 4, 3840 / 4);
        draw_watermark(&mut frame, &studio_watermark());
        let lit: Vec<_> = frame.pixels.iter().filter(|p| p.0 + p.1 + p.2 > 0.0).collect();
        // White text never exceeds 0.85; blue text has more blue than red.
        assert!(lit.iter().all(|p| p.0 <= 0.85 + 1e-12));
        assert!(lit.iter().any(|p| p.2 > p.0 + 0.3));
    }

    #[test]
    fn test_centred_horizontally() {
        let mut frame = Frame::black(960, 960);
        draw_watermark(&mut frame, &studio_watermark());
        let cols: Vec<u32> = (0..frame.width)
            .filter(|&x| (0..frame.height).any(|y| frame.pixel(x, y) != (0.0, 0.0, 0.0)))
            .collect();
        let (first, last) = (cols[0] as f64, *cols.last().unwrap() as f64 + 1.0);
        assert!((first - (960.0 - last)).abs() <= 2.0);
    }

    #[test]
    fn test_coverage_limited_to_text_box() {
        let frame = Frame::black(3840, 3840);
        let spans = studio_watermark();
        let span = &spans[1];
        let cell = FONT_SIZE * CAP_HEIGHT / GLYPH_ROWS as f64;
        let x0 = 1000.25;
        let top = 3840.0 - BASELINE_FROM_BOTTOM - cell * GLYPH_ROWS as f64;
        let coverage = Coverage::new(&frame, x0, top, x0 + span.width_cells() * cell, 3840.0 - BASELINE_FROM_BOTTOM);
        assert!(coverage.values.len() < frame.pixels.len() / 100);
        assert_eq!(coverage.left, 1000);
        assert!((65..=66).contains(&coverage.height));
    }

    #[test]
    fn test_coverage_clips_at_frame_edge() {
        let mut frame = Frame::black(20, 10);
        let mut coverage = Coverage::new(&frame, 15.5, 6.0, 40.0, 14.0);
        assert_eq!((coverage.left, coverage.top, coverage.width, coverage.height), (15, 6, 5, 4));
        coverage.fill_rect(15.5, 0.0, 30.0, 30.0);
        coverage.composite(&mut frame, Vector3::new(1.0, 1.0, 1.0), 1.0);
        assert_eq!(frame.pixel(15, 6), (0.5, 0.5, 0.5));
        assert_eq!(frame.pixel(19, 9), (1.0, 1.0, 1.0));
        assert_eq!(frame.pixel(14, 9), (0.0, 0.0, 0.0));
        assert_eq!(frame.pixel(19, 5), (0.0, 0.0, 0.0));
    }
}
