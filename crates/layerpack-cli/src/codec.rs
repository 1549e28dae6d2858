//! Image file codec backed by the `image` crate.
//!
//! Decoding accepts every format the discovery step picks up; encoding always
//! goes through the deterministic PNG writer.

use std::path::Path;

use layerpack_core::codec::{CodecError, ImageCodec};
use layerpack_core::png::{write_rgba, PngConfig};
use layerpack_core::PixelBuffer;

/// Codec that decodes common image formats and writes deterministic PNGs.
#[derive(Debug, Clone, Default)]
pub struct ImageFileCodec {
    pub png: PngConfig,
}

impl ImageCodec for ImageFileCodec {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        let img = image::open(path).map_err(|e| CodecError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        PixelBuffer::from_rgba8(width, height, rgba.as_raw())
    }

    fn encode(&self, image: &PixelBuffer, path: &Path) -> Result<(), CodecError> {
        write_rgba(image, path, &self.png)?;
        Ok(())
    }
}
