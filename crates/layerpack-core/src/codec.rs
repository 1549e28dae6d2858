//! Image codec capability.
//!
//! The packer reads and writes image files only through [`ImageCodec`], so it
//! never depends on a particular decoding library.

use std::path::Path;

use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::png::{self, PngConfig, PngError};

/// Errors from decoding or encoding image files.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("PNG error: {0}")]
    Png(#[from] PngError),
}

/// Decodes image files into pixel grids and encodes pixel grids to files.
pub trait ImageCodec {
    /// Decode the file at `path` into an RGBA pixel grid.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError>;

    /// Encode `image` to a file at `path`.
    fn encode(&self, image: &PixelBuffer, path: &Path) -> Result<(), CodecError>;
}

/// Codec that reads and writes 8-bit RGBA PNG files with the `png` crate.
#[derive(Debug, Clone, Default)]
pub struct PngCodec {
    pub config: PngConfig,
}

impl ImageCodec for PngCodec {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        png::read_rgba(path).map_err(|e| CodecError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn encode(&self, image: &PixelBuffer, path: &Path) -> Result<(), CodecError> {
        png::write_rgba(image, path, &self.config)?;
        Ok(())
    }
}
