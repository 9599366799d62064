//! Source pixel buffer
//!
//! Decoding is left to the caller; this type only holds the decoded colors in
//! the layout the relaxation loop reads them.

use glam::Vec3;

use crate::error::{Result, VCellsError};
use crate::pixel::Pixel;

/// A decoded RGB image, one `Vec3` per pixel in 0-255 channel units
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    colors: Vec<Vec3>,
}

impl SourceImage {
    /// Wrap a packed RGB8 buffer (3 bytes per pixel, row-major)
    ///
    /// # Errors
    ///
    /// Returns `InvalidGeometry` for a zero dimension and `InvalidImage` if
    /// the buffer length is not `width * height * 3`.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        Self::from_packed(width, height, 3, data)
    }

    /// Wrap a packed RGBA8 buffer, dropping the alpha channel
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        Self::from_packed(width, height, 4, data)
    }

    /// Wrap a packed 8-bit grayscale buffer; each value fills all three channels
    pub fn from_gray8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        Self::from_packed(width, height, 1, data)
    }

    /// Build an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> Vec3,
    {
        check_dimensions(width, height)?;
        let mut colors = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                colors.push(f(x, y));
            }
        }
        Ok(Self { width, height, colors })
    }

    fn from_packed(width: u32, height: u32, channels: usize, data: &[u8]) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(VCellsError::InvalidImage(format!(
                "expected {} bytes for {}x{} with {} channel(s), got {}",
                expected,
                width,
                height,
                channels,
                data.len()
            )));
        }

        let colors = data
            .chunks_exact(channels)
            .map(|px| match channels {
                1 => Vec3::splat(px[0] as f32),
                _ => Vec3::new(px[0] as f32, px[1] as f32, px[2] as f32),
            })
            .collect();

        Ok(Self { width, height, colors })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.x >= 0
            && pixel.y >= 0
            && (pixel.x as u32) < self.width
            && (pixel.y as u32) < self.height
    }

    /// Color at `pixel`, or `None` outside the image
    #[inline]
    pub fn color(&self, pixel: Pixel) -> Option<Vec3> {
        if !self.contains(pixel) {
            return None;
        }
        Some(self.colors[pixel.y as usize * self.width as usize + pixel.x as usize])
    }

    /// All colors in row-major order
    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(VCellsError::InvalidGeometry(format!(
            "image dimensions must be positive (got {}x{})",
            width, height
        )));
    }
    Ok(())
}
