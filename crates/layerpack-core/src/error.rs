//! Errors raised while packing layers.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;

/// Errors that abort a packing run.
#[derive(Debug, Error)]
pub enum PackError {
    /// The run was started with no source images.
    #[error("No source images to pack")]
    NoSources,

    /// Bits per layer outside `[1, 32]`.
    #[error("Bits per layer must be in 1..=32, got {0}")]
    InvalidBitsPerLayer(i64),

    /// A source image does not match the run's dimensions.
    #[error("Source {source_index} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        source_index: usize,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// A layer's size differs from the image it is applied to.
    #[error("Layer is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// A layer would extend past bit 31.
    #[error("Layer at offset {offset} with {bits} bits does not fit in a 32-bit pixel")]
    SlotOutOfRange { offset: u32, bits: u32 },

    /// A layer would write into bits already claimed by another layer.
    #[error("Layer bits {mask:#010x} overlap bits already written ({occupied:#010x})")]
    LayerOverlap { mask: u32, occupied: u32 },

    /// A written output does not decode back to the packed buffer.
    #[error("Output {} does not match the packed buffer after re-decoding", .path.display())]
    VerifyMismatch { path: PathBuf },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackError {
    /// Attribute a size mismatch to source `source_index` of a run.
    pub(crate) fn for_source(self, source_index: usize) -> Self {
        match self {
            Self::SizeMismatch {
                expected_width,
                expected_height,
                actual_width,
                actual_height,
            } => Self::DimensionMismatch {
                source_index,
                expected_width,
                expected_height,
                actual_width,
                actual_height,
            },
            other => other,
        }
    }
}
