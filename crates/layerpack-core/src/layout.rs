//! Bit layout of packed layers.
//!
//! A packed pixel is a single `u32`. With `B` bits per layer it holds
//! `L = floor(32 / B)` layers; layer `l` occupies bits `[l * B, l * B + B)`.
//! Source image `i` of a run lands in output image `i / L` as layer `i % L`.
//!
//! # Example
//!
//! ```
//! use layerpack_core::layout::LayerLayout;
//!
//! let layout = LayerLayout::new(8).unwrap();
//! assert_eq!(layout.layers_per_image(), 4);
//! assert_eq!(layout.output_count(5), 2);
//!
//! let slot = layout.slot(5);
//! assert_eq!((slot.output, slot.layer, slot.offset), (1, 1, 8));
//! ```

use crate::error::PackError;

/// Number of bits in a packed pixel.
pub const PIXEL_BITS: u32 = 32;

/// Smallest accepted bits-per-layer value.
pub const MIN_BITS_PER_LAYER: u32 = 1;

/// Largest accepted bits-per-layer value.
pub const MAX_BITS_PER_LAYER: u32 = PIXEL_BITS;

/// Validated bits-per-layer setting and everything derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerLayout {
    bits_per_layer: u32,
}

/// Where one source image lives inside the packed outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerSlot {
    /// Index of the source image in packing order.
    pub source: usize,
    /// Index of the output image holding this layer.
    pub output: usize,
    /// Layer index within the output pixel.
    pub layer: u32,
    /// Bit offset of the layer within the output pixel.
    pub offset: u32,
}

impl LayerLayout {
    /// Create a layout, rejecting values outside `[1, 32]`.
    pub fn new(bits_per_layer: u32) -> Result<Self, PackError> {
        if !(MIN_BITS_PER_LAYER..=MAX_BITS_PER_LAYER).contains(&bits_per_layer) {
            return Err(PackError::InvalidBitsPerLayer(bits_per_layer as i64));
        }
        Ok(Self { bits_per_layer })
    }

    /// Create a layout from an arbitrary integer, clamping it into `[1, 32]`.
    pub fn clamped(bits_per_layer: i64) -> Self {
        let bits = bits_per_layer.clamp(MIN_BITS_PER_LAYER as i64, MAX_BITS_PER_LAYER as i64);
        Self {
            bits_per_layer: bits as u32,
        }
    }

    /// Bits allotted to each layer.
    #[inline]
    pub fn bits_per_layer(&self) -> u32 {
        self.bits_per_layer
    }

    /// Number of layers one packed pixel holds.
    #[inline]
    pub fn layers_per_image(&self) -> u32 {
        PIXEL_BITS / self.bits_per_layer
    }

    /// Largest quantized value a layer can hold. Doubles as the layer bit mask.
    #[inline]
    pub fn alpha_max(&self) -> u32 {
        alpha_max(self.bits_per_layer)
    }

    /// Number of output images needed for `source_count` sources.
    pub fn output_count(&self, source_count: usize) -> usize {
        source_count.div_ceil(self.layers_per_image() as usize)
    }

    /// Bit offset of layer `layer` within a packed pixel.
    #[inline]
    pub fn offset(&self, layer: u32) -> u32 {
        layer * self.bits_per_layer
    }

    /// Slot assigned to source image `source`.
    pub fn slot(&self, source: usize) -> LayerSlot {
        let per_image = self.layers_per_image() as usize;
        let layer = (source % per_image) as u32;
        LayerSlot {
            source,
            output: source / per_image,
            layer,
            offset: self.offset(layer),
        }
    }

    /// Slots packed into output image `output` when the run has
    /// `source_count` sources. Unused trailing layers are not yielded.
    pub fn slots_for_output(
        &self,
        output: usize,
        source_count: usize,
    ) -> impl Iterator<Item = LayerSlot> + '_ {
        let per_image = self.layers_per_image() as usize;
        let start = output.saturating_mul(per_image).min(source_count);
        let end = start.saturating_add(per_image).min(source_count);
        (start..end).map(move |source| self.slot(source))
    }

    /// Mask covering the bits of layer `layer`.
    #[inline]
    pub fn layer_mask(&self, layer: u32) -> u32 {
        range_mask(self.offset(layer), self.bits_per_layer)
    }
}

/// `(1 << bits) - 1` without overflowing at `bits == 32`.
#[inline]
pub fn alpha_max(bits_per_layer: u32) -> u32 {
    debug_assert!(bits_per_layer <= PIXEL_BITS, "bits per layer {bits_per_layer} exceeds 32");
    ((1u64 << bits_per_layer) - 1) as u32
}

/// Mask with `bits` set bits starting at `offset`.
#[inline]
pub(crate) fn range_mask(offset: u32, bits: u32) -> u32 {
    (((1u64 << bits) - 1) << offset) as u32
}

/// Quantize an 8-bit alpha to `bits_per_layer` bits.
///
/// Computes `round(alpha / 255 * alpha_max)` with round-half-away-from-zero in
/// exact integer arithmetic. `alpha * alpha_max / 255` never lands exactly on a
/// half for integer inputs, so every round-to-nearest mode gives the same result.
#[inline]
pub fn quantize_alpha(alpha: u8, bits_per_layer: u32) -> u32 {
    let max = alpha_max(bits_per_layer) as u64;
    ((2 * alpha as u64 * max + 255) / 510) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_per_image_for_all_bit_widths() {
        for bits in 1..=32 {
            let layout = LayerLayout::new(bits).unwrap();
            assert!(layout.layers_per_image() >= 1);
            assert_eq!(layout.layers_per_image(), 32 / bits);
        }
        assert_eq!(LayerLayout::new(32).unwrap().layers_per_image(), 1);
        assert_eq!(LayerLayout::new(17).unwrap().layers_per_image(), 1);
        assert_eq!(LayerLayout::new(1).unwrap().layers_per_image(), 32);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            LayerLayout::new(0),
            Err(PackError::InvalidBitsPerLayer(0))
        ));
        assert!(matches!(
            LayerLayout::new(33),
            Err(PackError::InvalidBitsPerLayer(33))
        ));
    }

    #[test]
    fn test_clamped() {
        assert_eq!(LayerLayout::clamped(-4).bits_per_layer(), 1);
        assert_eq!(LayerLayout::clamped(0).bits_per_layer(), 1);
        assert_eq!(LayerLayout::clamped(12).bits_per_layer(), 12);
        assert_eq!(LayerLayout::clamped(100).bits_per_layer(), 32);
    }

    #[test]
    fn test_output_count() {
        for bits in 1..=32 {
            let layout = LayerLayout::new(bits).unwrap();
            let per_image = layout.layers_per_image() as usize;
            for n in 0..100usize {
                assert_eq!(layout.output_count(n), (n + per_image - 1) / per_image);
            }
        }
    }

    #[test]
    fn test_every_source_gets_one_slot() {
        for bits in 1..=32 {
            let layout = LayerLayout::new(bits).unwrap();
            for n in [1usize, 2, 3, 7, 32, 33, 65] {
                let mut seen = std::collections::HashSet::new();
                let mut total = 0;
                for output in 0..layout.output_count(n) {
                    let mut used = 0u32;
                    for slot in layout.slots_for_output(output, n) {
                        assert_eq!(slot.output, output);
                        assert!(slot.offset + bits <= 32);
                        let mask = layout.layer_mask(slot.layer);
                        assert_eq!(used & mask, 0, "layer ranges must not overlap");
                        used |= mask;
                        assert!(seen.insert(slot.source));
                        total += 1;
                    }
                }
                assert_eq!(total, n);
                assert_eq!(seen.len(), n);
            }
        }
    }

    #[test]
    fn test_slots_past_end_are_empty() {
        let layout = LayerLayout::new(8).unwrap();
        assert_eq!(layout.slots_for_output(3, 5).count(), 0);
        assert_eq!(layout.slots_for_output(usize::MAX, 5).count(), 0);
    }

    #[test]
    fn test_alpha_max() {
        assert_eq!(alpha_max(1), 1);
        assert_eq!(alpha_max(8), 255);
        assert_eq!(alpha_max(16), 0xFFFF);
        assert_eq!(alpha_max(31), 0x7FFF_FFFF);
        assert_eq!(alpha_max(32), 0xFFFF_FFFF);
    }

    #[test]
    fn test_layer_mask() {
        let layout = LayerLayout::new(8).unwrap();
        assert_eq!(layout.layer_mask(0), 0x0000_00FF);
        assert_eq!(layout.layer_mask(3), 0xFF00_0000);
        assert_eq!(LayerLayout::new(32).unwrap().layer_mask(0), u32::MAX);
    }

    #[test]
    fn test_quantize_extremes() {
        for bits in 1..=32 {
            assert_eq!(quantize_alpha(0, bits), 0);
            assert_eq!(quantize_alpha(255, bits), alpha_max(bits));
        }
    }

    #[test]
    fn test_quantize_half_alpha_one_bit() {
        // 128 / 255 = 0.502
        assert_eq!(quantize_alpha(128, 1), 1);
        // 127 / 255 = 0.498
        assert_eq!(quantize_alpha(127, 1), 0);
    }

    #[test]
    fn test_quantize_identity_at_eight_bits() {
        for alpha in 0..=255u8 {
            assert_eq!(quantize_alpha(alpha, 8), alpha as u32);
        }
    }

    #[test]
    fn test_quantize_never_hits_exact_half() {
        for bits in 1..=32 {
            let max = alpha_max(bits) as u64;
            for alpha in 0..=255u64 {
                assert_ne!((2 * alpha * max) % 510, 255);

                // Half-to-even agrees with the implemented half-away-from-zero
                let scaled = alpha as f64 / 255.0 * max as f64;
                let even = {
                    let floor = scaled.floor();
                    let frac = scaled - floor;
                    if frac > 0.5 || (frac == 0.5 && floor as u64 % 2 == 1) {
                        floor + 1.0
                    } else {
                        floor
                    }
                };
                assert_eq!(quantize_alpha(alpha as u8, bits) as f64, even);
            }
        }
    }

    #[test]
    fn test_quantize_matches_float_reference() {
        for bits in [1, 2, 3, 4, 5, 7, 8, 10, 16, 24, 32] {
            let max = alpha_max(bits) as f64;
            for alpha in 0..=255u8 {
                let expected = (alpha as f64 / 255.0 * max).round() as u32;
                assert_eq!(quantize_alpha(alpha, bits), expected, "alpha={alpha} bits={bits}");
            }
        }
    }
}
