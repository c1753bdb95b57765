//! Fixed-point resampling of packed 5-6-5 images.
//!
//! Both routines take explicit source slices and dimensions and return fresh
//! buffers; nothing here holds on to a caller's pixels between calls.

use super::color::Rgb565;
use super::image::Image565;

/// Widest fixed-point fraction the 16-bit channel math can carry
pub const MAX_SUBPIXEL_BITS: u32 = 15;

/// Fractional horizontal offset `k0 / 2^bits`, with `k1 = 2^bits - k0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPixel {
    k0: u32,
    bits: u32,
}

impl SubPixel {
    /// `position` is wrapped into `0..2^bits`
    pub fn new(position: u32, bits: u32) -> Self {
        debug_assert!(bits <= MAX_SUBPIXEL_BITS, "sub-pixel bits {} too wide", bits);
        let bits = bits.min(MAX_SUBPIXEL_BITS);
        Self {
            k0: position & ((1 << bits) - 1),
            bits,
        }
    }

    /// Explicit weights: `k0` in `0..=2^bits`, clamped. `k0 == 2^bits`
    /// leaves `k1 == 0`, which takes the neighbour unchanged.
    pub fn from_weights(k0: u32, bits: u32) -> Self {
        debug_assert!(bits <= MAX_SUBPIXEL_BITS, "sub-pixel bits {} too wide", bits);
        let bits = bits.min(MAX_SUBPIXEL_BITS);
        Self {
            k0: k0.min(1 << bits),
            bits,
        }
    }

    #[inline]
    pub fn modulus(self) -> u32 {
        1 << self.bits
    }

    /// Weight of the right-hand neighbour
    #[inline]
    pub fn k0(self) -> u32 {
        self.k0
    }

    /// Weight of the pixel itself
    #[inline]
    pub fn k1(self) -> u32 {
        self.modulus() - self.k0
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.bits
    }
}

/// Blend every pixel with its right-hand neighbour for smooth sub-pixel
/// scrolling.
///
/// Output (x + 1, y) = src(x, y) * k1 + src(x + 1, y) * k0, shifted down by
/// `bits`, per channel, for x in 0..width-1 and y in 0..height-1. Column 0
/// and the last row stay black; the scroller relies on that border.
pub fn blend_horizontal(
    src: &[Rgb565],
    width: usize,
    height: usize,
    shift: SubPixel,
) -> Vec<Rgb565> {
    let mut out = vec![Rgb565::BLACK; width * height];
    if src.len() < width * height {
        debug_assert!(
            src.len() >= width * height,
            "source has {} pixels, expected {}",
            src.len(),
            width * height
        );
        return out;
    }
    if width < 2 || height < 2 {
        return out;
    }

    let (k0, k1, bits) = (shift.k0(), shift.k1(), shift.bits());
    let mix = |a: u8, b: u8| ((a as u32 * k1 + b as u32 * k0) >> bits) as u8;

    for y in 0..height - 1 {
        let row = &src[y * width..(y + 1) * width];
        let dst = &mut out[y * width..(y + 1) * width];
        for (x, pair) in row.windows(2).enumerate() {
            let (r0, g0, b0) = pair[0].channels();
            let (r1, g1, b1) = pair[1].channels();
            dst[x + 1] = Rgb565::from_channels(mix(r0, r1), mix(g0, g1), mix(b0, b1));
        }
    }
    out
}

/// Shrink by an integer factor, each output pixel the plain mean of a
/// `scale` x `scale` block. Trailing rows and columns that do not fill a
/// whole block are dropped.
pub fn downscale_box(src: &[Rgb565], width: usize, height: usize, scale: usize) -> Image565 {
    if scale == 0 || src.len() < width * height {
        debug_assert!(scale > 0, "box filter scale must be non-zero");
        debug_assert!(src.len() >= width * height, "source shorter than {}x{}", width, height);
        return Image565::default();
    }

    let out_w = width / scale;
    let out_h = height / scale;
    let area = (scale * scale) as u32;
    let mut pixels = Vec::with_capacity(out_w * out_h);

    for oy in 0..out_h {
        for ox in 0..out_w {
            let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
            for sy in oy * scale..(oy + 1) * scale {
                let row = &src[sy * width + ox * scale..sy * width + (ox + 1) * scale];
                for px in row {
                    let (pr, pg, pb) = px.channels();
                    r += pr as u32;
                    g += pg as u32;
                    b += pb as u32;
                }
            }
            pixels.push(Rgb565::from_channels(
                (r / area) as u8,
                (g / area) as u8,
                (b / area) as u8,
            ));
        }
    }

    Image565::from_pixels(out_w as u32, out_h as u32, pixels).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::image::ImageSource;

    fn ramp(width: usize, height: usize) -> Vec<Rgb565> {
        (0..width * height)
            .map(|i| {
                Rgb565::from_channels((i % 32) as u8, (i * 3 % 64) as u8, (31 - i % 32) as u8)
            })
            .collect()
    }

    #[test]
    fn test_subpixel_weights_sum_to_modulus() {
        for pos in [0u32, 1, 63, 127, 128, 1000] {
            let s = SubPixel::new(pos, 7);
            assert_eq!(s.k0() + s.k1(), 128);
            assert_eq!(s.k0(), pos % 128);
        }
    }

    #[test]
    fn test_blend_zero_offset_copies_source() {
        let (w, h) = (6, 4);
        let src = ramp(w, h);
        let out = blend_horizontal(&src, w, h, SubPixel::new(0, 7));
        for y in 0..h - 1 {
            assert_eq!(out[y * w], Rgb565::BLACK);
            for x in 0..w - 1 {
                assert_eq!(out[y * w + x + 1], src[y * w + x]);
            }
        }
        assert!(out[(h - 1) * w..].iter().all(|&c| c == Rgb565::BLACK));
    }

    #[test]
    fn test_blend_k1_zero_copies_neighbour() {
        let shift = SubPixel::from_weights(128, 7);
        assert_eq!((shift.k0(), shift.k1()), (128, 0));

        let (w, h) = (6, 4);
        let src = ramp(w, h);
        let out = blend_horizontal(&src, w, h, shift);
        for y in 0..h - 1 {
            for x in 0..w - 1 {
                assert_eq!(out[y * w + x + 1], src[y * w + x + 1]);
            }
        }
    }

    #[test]
    fn test_from_weights_clamps_to_modulus() {
        assert_eq!(SubPixel::from_weights(500, 7).k0(), 128);
        assert_eq!(SubPixel::from_weights(0, 7), SubPixel::new(0, 7));
        assert_eq!(SubPixel::from_weights(37, 7), SubPixel::new(37, 7));
    }

    #[test]
    fn test_blend_leans_toward_neighbour() {
        let src = vec![Rgb565::BLACK, Rgb565::WHITE, Rgb565::BLACK, Rgb565::WHITE];
        let out = blend_horizontal(&src, 2, 2, SubPixel::new(127, 7));
        assert_eq!(out[1], Rgb565::from_channels(30, 62, 30));
    }

    #[test]
    fn test_blend_half_step_averages() {
        let src = vec![
            Rgb565::from_channels(10, 20, 30),
            Rgb565::from_channels(20, 40, 10),
            Rgb565::BLACK,
            Rgb565::BLACK,
        ];
        let out = blend_horizontal(&src, 2, 2, SubPixel::new(64, 7));
        assert_eq!(out[0], Rgb565::BLACK);
        assert_eq!(out[1], Rgb565::from_channels(15, 30, 20));
        assert_eq!(&out[2..], &[Rgb565::BLACK, Rgb565::BLACK]);
    }

    #[test]
    fn test_blend_degenerate_sizes() {
        let out = blend_horizontal(&[Rgb565::WHITE], 1, 1, SubPixel::new(5, 7));
        assert_eq!(out, vec![Rgb565::BLACK]);
        assert!(blend_horizontal(&[], 0, 0, SubPixel::new(5, 7)).is_empty());
    }

    #[test]
    fn test_downscale_uniform_source() {
        let color = Rgb565::from_channels(17, 43, 5);
        for (w, h, s) in [(8, 8, 2), (9, 7, 3), (32, 32, 4), (5, 5, 5), (4, 4, 1)] {
            let src = vec![color; w * h];
            let out = downscale_box(&src, w, h, s);
            assert_eq!(out.width() as usize, w / s);
            assert_eq!(out.height() as usize, h / s);
            assert!(out.pixels().iter().all(|&c| c == color));
        }
    }

    #[test]
    fn test_downscale_averages_blocks() {
        let a = Rgb565::from_channels(0, 0, 0);
        let b = Rgb565::from_channels(31, 63, 31);
        let src = vec![a, b, b, b, a, a, a, a];
        let out = downscale_box(&src, 4, 2, 2);
        assert_eq!(
            out.pixels(),
            &[Rgb565::from_channels(7, 15, 7), Rgb565::from_channels(15, 31, 15)]
        );
    }

    #[test]
    fn test_downscale_truncates_edges() {
        let src = ramp(7, 5);
        let out = downscale_box(&src, 7, 5, 2);
        assert_eq!((out.width(), out.height()), (3, 2));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_downscale_zero_scale_is_blank_in_release() {
        let out = downscale_box(&[Rgb565::WHITE; 4], 2, 2, 0);
        assert!(out.pixels().is_empty());
    }

    #[test]
    #[should_panic(expected = "scale must be non-zero")]
    #[cfg(debug_assertions)]
    fn test_downscale_zero_scale_fails_fast_in_debug() {
        let _ = downscale_box(&[Rgb565::WHITE; 4], 2, 2, 0);
    }
}
