//! Owned pixel buffer holding the finished, gamma-corrected image.

use crate::error::{RenderError, RenderResult};
use crate::Color;
use glint_math::Interval;

/// Row-major image of display-ready colors.
///
/// Channels are expected in [0, 1]; byte conversion clamps. `Clone` is a
/// deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, row: u32, col: u32) -> RenderResult<usize> {
        if row >= self.height || col >= self.width {
            return Err(RenderError::PixelOutOfBounds {
                row,
                col,
                width: self.width,
                height: self.height,
            });
        }
        Ok(row as usize * self.width as usize + col as usize)
    }

    /// Get the pixel at (row, col).
    pub fn get_pixel(&self, row: u32, col: u32) -> RenderResult<Color> {
        let index = self.index(row, col)?;
        Ok(self.pixels[index])
    }

    /// Set the pixel at (row, col).
    pub fn set_pixel(&mut self, row: u32, col: u32, color: Color) -> RenderResult<()> {
        let index = self.index(row, col)?;
        self.pixels[index] = color;
        Ok(())
    }

    /// Copy a row-major block of pixels with its top-left corner at (row, col).
    pub fn write_block(&mut self, row: u32, col: u32, block_width: u32, pixels: &[Color]) -> RenderResult<()> {
        if block_width == 0 {
            return Ok(());
        }
        for (i, line) in pixels.chunks(block_width as usize).enumerate() {
            let start = self.index(row + i as u32, col)?;
            // Checks the last pixel of the line too
            self.index(row + i as u32, col + line.len() as u32 - 1)?;
            self.pixels[start..start + line.len()].copy_from_slice(line);
        }
        Ok(())
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Convert to RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color)[..3]);
        }
        bytes
    }
}

/// Quantize a display color to 8-bit RGBA, truncating `c * 255`.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * Interval::UNIT.clamp(c)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}
