//! Pixel grids.
//!
//! A [`PixelBuffer`] stores each pixel as one `u32` laid out as
//! `R | G << 8 | B << 16 | A << 24`, so writing the integers out in
//! little-endian order yields plain RGBA8 bytes.

use crate::codec::CodecError;

/// Pack four 8-bit channels into a pixel integer.
#[inline]
pub fn pixel_from_rgba(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

/// Split a pixel integer into its four 8-bit channels.
#[inline]
pub fn pixel_to_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// Read access to the alpha channel of an image.
pub trait AlphaSource {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Alpha at the given coordinates.
    fn alpha(&self, x: u32, y: u32) -> u8;

    /// `(width, height)`.
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

impl<T: AlphaSource + ?Sized> AlphaSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn alpha(&self, x: u32, y: u32) -> u8 {
        (**self).alpha(x, y)
    }
}

/// A 2D RGBA pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel integers, row-major.
    pub data: Vec<u32>,
}

impl PixelBuffer {
    /// Create a fully transparent black buffer (every bit zero).
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// Create a buffer with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![pixel; size],
        }
    }

    /// Build a buffer from interleaved RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, CodecError> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(CodecError::InvalidDimensions(format!(
                "Expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                bytes.len()
            )));
        }

        let data = bytes
            .chunks_exact(4)
            .map(|px| pixel_from_rgba([px[0], px[1], px[2], px[3]]))
            .collect();

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert to interleaved RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for &pixel in &self.data {
            bytes.extend_from_slice(&pixel_to_rgba(pixel));
        }
        bytes
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a pixel integer at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.data[self.index(x, y)]
    }

    /// Set a pixel integer at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: u32) {
        let idx = self.index(x, y);
        self.data[idx] = pixel;
    }

    /// Get a pixel as RGBA channels.
    #[inline]
    pub fn get_rgba(&self, x: u32, y: u32) -> [u8; 4] {
        pixel_to_rgba(self.get(x, y))
    }

    /// Set a pixel from RGBA channels.
    #[inline]
    pub fn set_rgba(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        self.set(x, y, pixel_from_rgba(rgba));
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl AlphaSource for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn alpha(&self, x: u32, y: u32) -> u8 {
        self.get_rgba(x, y)[3]
    }
}
