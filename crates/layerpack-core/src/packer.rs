//! Layer packing.
//!
//! Each source image contributes its alpha channel as one layer: the alpha is
//! quantized to the layout's bit width and ORed into its bit range of every
//! pixel of the destination. A run groups sources into output images in order,
//! `layers_per_image` at a time.
//!
//! # Example
//!
//! ```
//! use layerpack_core::buffer::{pixel_from_rgba, PixelBuffer};
//! use layerpack_core::layout::LayerLayout;
//! use layerpack_core::packer::{pack_images, PackOptions};
//!
//! let frames: Vec<PixelBuffer> = [255u8, 0, 128]
//!     .iter()
//!     .map(|&a| PixelBuffer::filled(4, 4, pixel_from_rgba([0, 0, 0, a])))
//!     .collect();
//!
//! let layout = LayerLayout::new(8).unwrap();
//! let outputs = pack_images(&frames, layout, &PackOptions::default()).unwrap();
//!
//! assert_eq!(outputs.len(), 1);
//! assert_eq!(outputs[0].get(0, 0), 0x0080_00FF);
//! ```

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::buffer::{AlphaSource, PixelBuffer};
use crate::codec::ImageCodec;
use crate::error::PackError;
use crate::layout::{quantize_alpha, range_mask, LayerLayout, LayerSlot, PIXEL_BITS};

/// File name of output image `index`.
pub fn output_file_name(index: usize) -> String {
    format!("output_{index}.png")
}

/// Run options.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Build distinct output images concurrently.
    pub parallel: bool,
    /// Re-decode every written file and compare it to the packed buffer.
    pub verify: bool,
}

/// An output image under construction.
///
/// Tracks which bits have been written so overlapping layers are rejected
/// instead of being merged.
#[derive(Debug, Clone)]
pub struct PackedImage {
    buffer: PixelBuffer,
    occupied: u32,
}

impl PackedImage {
    /// Create a zeroed image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height),
            occupied: 0,
        }
    }

    /// Bits already claimed by applied layers.
    pub fn occupied(&self) -> u32 {
        self.occupied
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    /// Validate a layer against this image and claim its bit range.
    fn claim<S: AlphaSource + ?Sized>(
        &mut self,
        src: &S,
        offset: u32,
        bits_per_layer: u32,
    ) -> Result<(), PackError> {
        if (src.width(), src.height()) != self.buffer.dimensions() {
            return Err(PackError::SizeMismatch {
                expected_width: self.buffer.width,
                expected_height: self.buffer.height,
                actual_width: src.width(),
                actual_height: src.height(),
            });
        }

        if bits_per_layer == 0 || bits_per_layer > PIXEL_BITS {
            return Err(PackError::InvalidBitsPerLayer(bits_per_layer as i64));
        }
        if offset >= PIXEL_BITS || offset + bits_per_layer > PIXEL_BITS {
            return Err(PackError::SlotOutOfRange {
                offset,
                bits: bits_per_layer,
            });
        }

        let mask = range_mask(offset, bits_per_layer);
        if self.occupied & mask != 0 {
            return Err(PackError::LayerOverlap {
                mask,
                occupied: self.occupied,
            });
        }
        self.occupied |= mask;
        Ok(())
    }
}

/// OR one quantized alpha row into one destination row.
#[inline]
fn apply_row<S: AlphaSource + ?Sized>(
    row: &mut [u32],
    src: &S,
    y: u32,
    offset: u32,
    bits_per_layer: u32,
) {
    for (x, pixel) in row.iter_mut().enumerate() {
        let quantized = quantize_alpha(src.alpha(x as u32, y), bits_per_layer);
        *pixel |= quantized << offset;
    }
}

/// Apply `src`'s alpha as the layer at `offset` of `dest`.
///
/// Fails without touching `dest` if the dimensions differ, if the layer does
/// not fit below bit 32, or if its bits were already written.
pub fn apply_layer<S: AlphaSource + ?Sized>(
    dest: &mut PackedImage,
    src: &S,
    offset: u32,
    bits_per_layer: u32,
) -> Result<(), PackError> {
    dest.claim(src, offset, bits_per_layer)?;

    let width = dest.buffer.width as usize;
    if width == 0 {
        return Ok(());
    }
    for (y, row) in dest.buffer.data.chunks_mut(width).enumerate() {
        apply_row(row, src, y as u32, offset, bits_per_layer);
    }
    Ok(())
}

/// Like [`apply_layer`], with rows processed on the rayon pool.
pub fn apply_layer_parallel<S: AlphaSource + Sync + ?Sized>(
    dest: &mut PackedImage,
    src: &S,
    offset: u32,
    bits_per_layer: u32,
) -> Result<(), PackError> {
    dest.claim(src, offset, bits_per_layer)?;

    let width = dest.buffer.width as usize;
    if width == 0 {
        return Ok(());
    }
    dest.buffer
        .data
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| apply_row(row, src, y as u32, offset, bits_per_layer));
    Ok(())
}

/// Build output image `output` by loading and applying each of its layers.
fn build_output<S, F>(
    output: usize,
    source_count: usize,
    layout: LayerLayout,
    (width, height): (u32, u32),
    mut load: F,
) -> Result<PixelBuffer, PackError>
where
    S: AlphaSource,
    F: FnMut(&LayerSlot) -> Result<S, PackError>,
{
    let bits = layout.bits_per_layer();
    let mut image = PackedImage::new(width, height);

    for slot in layout.slots_for_output(output, source_count) {
        let src = load(&slot)?;
        image
            .claim(&src, slot.offset, bits)
            .map_err(|e| e.for_source(slot.source))?;

        let row_width = width as usize;
        if row_width > 0 {
            for (y, row) in image.buffer.data.chunks_mut(row_width).enumerate() {
                apply_row(row, &src, y as u32, slot.offset, bits);
            }
        }
    }

    Ok(image.into_buffer())
}

/// Pack in-memory sources into output images.
///
/// The first source fixes the run's dimensions.
pub fn pack_images<S: AlphaSource + Sync>(
    sources: &[S],
    layout: LayerLayout,
    options: &PackOptions,
) -> Result<Vec<PixelBuffer>, PackError> {
    let first = sources.first().ok_or(PackError::NoSources)?;
    let dimensions = first.dimensions();
    let count = layout.output_count(sources.len());

    let build = |output: usize| {
        build_output(output, sources.len(), layout, dimensions, |slot| {
            Ok(&sources[slot.source])
        })
    };

    if options.parallel {
        (0..count).into_par_iter().map(build).collect()
    } else {
        (0..count).map(build).collect()
    }
}

/// Record of one written output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Output index.
    pub index: usize,
    /// Path of the written file.
    pub path: PathBuf,
    /// Layers packed into this output, in layer order.
    pub slots: Vec<LayerSlot>,
}

/// Summary of a completed file-based run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub layout: LayerLayout,
    pub width: u32,
    pub height: u32,
    pub source_count: usize,
    pub outputs: Vec<OutputRecord>,
}

/// Pack image files into `output_{n}.png` files inside `out_dir`.
///
/// Sources are decoded through `codec` only while their output is being
/// built. The first source fixes the run's dimensions. Outputs already written
/// when an error occurs are left in place.
pub fn pack_files<C, F>(
    codec: &C,
    sources: &[PathBuf],
    layout: LayerLayout,
    out_dir: &Path,
    options: &PackOptions,
    on_output: F,
) -> Result<PackSummary, PackError>
where
    C: ImageCodec + Sync,
    F: Fn(&OutputRecord) + Sync,
{
    let first_path = sources.first().ok_or(PackError::NoSources)?;
    let first = codec.decode(first_path)?;
    let (width, height) = first.dimensions();
    std::fs::create_dir_all(out_dir)?;

    let count = layout.output_count(sources.len());

    let write_output = |index: usize| -> Result<OutputRecord, PackError> {
        let image = build_output(index, sources.len(), layout, (width, height), |slot| {
            if slot.source == 0 {
                Ok(first.clone())
            } else {
                Ok(codec.decode(&sources[slot.source])?)
            }
        })?;

        let path = out_dir.join(output_file_name(index));
        codec.encode(&image, &path)?;

        if options.verify {
            let decoded = codec.decode(&path)?;
            if decoded != image {
                return Err(PackError::VerifyMismatch { path });
            }
        }

        let record = OutputRecord {
            index,
            path,
            slots: layout.slots_for_output(index, sources.len()).collect(),
        };
        on_output(&record);
        Ok(record)
    };

    let outputs: Vec<OutputRecord> = if options.parallel {
        (0..count).into_par_iter().map(write_output).collect::<Result<_, _>>()?
    } else {
        (0..count).map(write_output).collect::<Result<_, _>>()?
    };

    Ok(PackSummary {
        layout,
        width,
        height,
        source_count: sources.len(),
        outputs,
    })
}
