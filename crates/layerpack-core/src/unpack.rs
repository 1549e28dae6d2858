//! Decoding packed layers.
//!
//! This is the arithmetic a playback shader performs: shift the pixel integer
//! down to the layer's offset, mask it, and rescale the quantized value back
//! to an 8-bit alpha. The round trip is lossless only for 8 or more bits per
//! layer.

use crate::buffer::{pixel_from_rgba, PixelBuffer};
use crate::layout::{LayerLayout, LayerSlot};

/// Quantized value of layer `layer` in a packed pixel.
#[inline]
pub fn extract_quantized(pixel: u32, layer: u32, layout: LayerLayout) -> u32 {
    let shifted = (pixel as u64) >> layout.offset(layer);
    (shifted as u32) & layout.alpha_max()
}

/// Rescale a quantized layer value to an 8-bit alpha.
///
/// Computes `round(quantized / alpha_max * 255)` in exact integer arithmetic.
/// Values above the layout's maximum saturate to 255.
#[inline]
pub fn dequantize_alpha(quantized: u32, layout: LayerLayout) -> u8 {
    let max = layout.alpha_max() as u64;
    let quantized = (quantized as u64).min(max);
    ((2 * quantized * 255 + max) / (2 * max)) as u8
}

/// Recover one layer as a white image whose alpha is the layer's value.
pub fn extract_layer(packed: &PixelBuffer, layer: u32, layout: LayerLayout) -> PixelBuffer {
    let data = packed
        .data
        .iter()
        .map(|&pixel| {
            let alpha = dequantize_alpha(extract_quantized(pixel, layer, layout), layout);
            pixel_from_rgba([255, 255, 255, alpha])
        })
        .collect();

    PixelBuffer {
        width: packed.width,
        height: packed.height,
        data,
    }
}

/// Output image and layer shown at animation frame `frame`.
///
/// Frames map one-to-one onto source images, so this is the packing slot of
/// source `frame`.
pub fn frame_slot(frame: usize, layout: LayerLayout) -> LayerSlot {
    layout.slot(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{alpha_max, quantize_alpha};

    fn layout(bits: u32) -> LayerLayout {
        LayerLayout::new(bits).unwrap()
    }

    #[test]
    fn test_extract_quantized() {
        let layout = LayerLayout::new(8).unwrap();
        let pixel = 0x4433_2211;
        assert_eq!(extract_quantized(pixel, 0, layout), 0x11);
        assert_eq!(extract_quantized(pixel, 1, layout), 0x22);
        assert_eq!(extract_quantized(pixel, 3, layout), 0x44);

        let full = LayerLayout::new(32).unwrap();
        assert_eq!(extract_quantized(0xDEAD_BEEF, 0, full), 0xDEAD_BEEF);
    }

    #[test]
    fn test_dequantize_extremes() {
        for bits in 1..=32 {
            assert_eq!(dequantize_alpha(0, layout(bits)), 0);
            assert_eq!(dequantize_alpha(alpha_max(bits), layout(bits)), 255);
        }
        assert_eq!(dequantize_alpha(1, layout(2)), 85);
        assert_eq!(dequantize_alpha(2, layout(2)), 170);
    }

    #[test]
    fn test_dequantize_saturates_above_max() {
        assert_eq!(dequantize_alpha(7, layout(2)), 255);
        assert_eq!(dequantize_alpha(u32::MAX, layout(1)), 255);
    }

    #[test]
    fn test_roundtrip_lossless_at_eight_bits_and_above() {
        for bits in 8..=32 {
            for alpha in 0..=255u8 {
                assert_eq!(dequantize_alpha(quantize_alpha(alpha, bits), layout(bits)), alpha);
            }
        }
    }

    #[test]
    fn test_roundtrip_error_bounded_below_eight_bits() {
        for bits in 1..8 {
            let step = 255.0 / alpha_max(bits) as f64;
            for alpha in 0..=255u8 {
                let back = dequantize_alpha(quantize_alpha(alpha, bits), layout(bits));
                let error = (back as f64 - alpha as f64).abs();
                assert!(error <= step / 2.0 + 0.5, "bits={bits} alpha={alpha} back={back}");
            }
        }
    }

    #[test]
    fn test_extract_layer() {
        let layout = LayerLayout::new(4).unwrap();
        let mut packed = PixelBuffer::new(2, 1);
        packed.set(0, 0, 0x0000_00F0);
        packed.set(1, 0, 0x0000_0050);

        let layer = extract_layer(&packed, 1, layout);
        assert_eq!(layer.get_rgba(0, 0), [255, 255, 255, 255]);
        assert_eq!(layer.get_rgba(1, 0), [255, 255, 255, 85]);
    }

    #[test]
    fn test_frame_slot_matches_playback() {
        // Two bits per layer: sixteen frames per texture
        let layout = LayerLayout::new(2).unwrap();
        for frame in 0..90 {
            let slot = frame_slot(frame, layout);
            assert_eq!(slot.output, frame / 16);
            assert_eq!(slot.layer as usize, frame % 16);
        }
    }
}
