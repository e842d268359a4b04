//! Shared render types: view zoom and linear frame buffers.

use image::{ImageBuffer, Rgb, RgbImage};
use nalgebra::Vector2;

/// Type alias for pixel buffer - linear RGB in `[0, 1]`, rows top to bottom
pub type PixelBuffer = Vec<(f64, f64, f64)>;

/// Interactive zoom: scale about a centre given in centred screen units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    pub level: f64,
    pub center: Vector2<f64>,
}

impl Zoom {
    /// Zoom 1 about the origin; the only view export uses.
    pub fn identity() -> Self {
        Self { level: 1.0, center: Vector2::zeros() }
    }

    pub fn new(level: f64, center_x: f64, center_y: f64) -> Self {
        Self { level, center: Vector2::new(center_x, center_y) }
    }

    /// Zoom level made safe to divide by.
    #[inline]
    pub fn effective_level(&self) -> f64 {
        if self.level.is_finite() && self.level > 0.0 {
            self.level
        } else {
            1.0
        }
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::identity()
    }
}

/// A rendered frame before quantization.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: PixelBuffer,
}

impl Frame {
    /// All-black frame.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![(0.0, 0.0, 0.0); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> (f64, f64, f64) {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Quantize to 8-bit sRGB-assumed RGB.
    pub fn to_rgb8(&self) -> RgbImage {
        let mut buf = Vec::with_capacity(self.pixels.len() * 3);
        for &(r, g, b) in &self.pixels {
            buf.push(quantize(r));
            buf.push(quantize(g));
            buf.push(quantize(b));
        }
        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(self.width, self.height, buf)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

#[inline]
fn quantize(c: f64) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}
