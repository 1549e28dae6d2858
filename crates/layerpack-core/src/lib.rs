//! Layerpack Core
//!
//! Packs the alpha channels of a sequence of equally sized images into the
//! bits of RGBA32 images. With `B` bits per layer every output pixel holds
//! `floor(32 / B)` layers, so an animation of cutouts collapses into a handful
//! of textures that a shader unpacks at draw time.
//!
//! # Bit layout
//!
//! - A pixel integer is `R | G << 8 | B << 16 | A << 24`.
//! - Source `i` lands in output `i / L` at bit offset `(i % L) * B`.
//! - Layer values are `round(alpha / 255 * (2^B - 1))`.
//! - Unused layer slots are left zero.
//!
//! # Example
//!
//! ```no_run
//! use layerpack_core::codec::PngCodec;
//! use layerpack_core::layout::LayerLayout;
//! use layerpack_core::packer::{pack_files, PackOptions};
//! use std::path::{Path, PathBuf};
//!
//! let sources = vec![PathBuf::from("frames/a.png"), PathBuf::from("frames/b.png")];
//! let layout = LayerLayout::new(16).unwrap();
//! let summary = pack_files(
//!     &PngCodec::default(),
//!     &sources,
//!     layout,
//!     Path::new("Output"),
//!     &PackOptions::default(),
//!     |_| {},
//! )
//! .unwrap();
//! assert_eq!(summary.outputs.len(), 1);
//! ```
//!
//! # Determinism
//!
//! PNG encoding uses fixed compression settings, so the same sources and bit
//! width always produce byte-identical outputs.

pub mod buffer;
pub mod codec;
pub mod error;
pub mod layout;
pub mod packer;
pub mod png;
pub mod unpack;

pub use buffer::{AlphaSource, PixelBuffer};
pub use codec::{CodecError, ImageCodec, PngCodec};
pub use error::PackError;
pub use layout::{quantize_alpha, LayerLayout, LayerSlot};
pub use packer::{
    apply_layer, apply_layer_parallel, pack_files, pack_images, OutputRecord, PackOptions,
    PackSummary, PackedImage,
};
pub use crate::png::{PngConfig, PngError};
pub use unpack::{dequantize_alpha, extract_layer, extract_quantized, frame_slot};
