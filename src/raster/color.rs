//! Color values and the storage formats a canvas can hold them in.

use std::fmt;

use super::brightness::Gain;

// ============================================================================
// Color values
// ============================================================================

/// Three independent 8-bit channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb24 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb24 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into 5-6-5, dropping the low bits of every channel
    pub const fn to_rgb565(self) -> Rgb565 {
        Rgb565(((self.r as u16 & 0xF8) << 8) | ((self.g as u16 & 0xFC) << 3) | (self.b as u16 >> 3))
    }

    /// Scale every channel by `gain`
    #[inline]
    pub fn scaled(self, gain: Gain) -> Self {
        Self {
            r: gain.scale(self.r),
            g: gain.scale(self.g),
            b: gain.scale(self.b),
        }
    }

    #[inline]
    pub fn is_gray(self) -> bool {
        self.r == self.g && self.g == self.b
    }
}

impl From<(u8, u8, u8)> for Rgb24 {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb565> for Rgb24 {
    fn from(color: Rgb565) -> Self {
        color.to_rgb24()
    }
}

/// Packed 16-bit color: bits 15..11 red, 10..5 green, 4..0 blue
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);

    /// Build from raw channel values (r and b in 0..32, g in 0..64).
    /// Out-of-range inputs are masked to their channel width.
    #[inline]
    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0x1F) << 11) | ((g as u16 & 0x3F) << 5) | (b as u16 & 0x1F))
    }

    /// Raw (5-bit, 6-bit, 5-bit) channel values
    #[inline]
    pub const fn channels(self) -> (u8, u8, u8) {
        (
            (self.0 >> 11) as u8,
            ((self.0 >> 5) & 0x3F) as u8,
            (self.0 & 0x1F) as u8,
        )
    }

    /// Expand to 8 bits per channel. The high bits are replicated into the
    /// low bits so full intensity maps to 255, not 248.
    #[inline]
    pub const fn to_rgb24(self) -> Rgb24 {
        let (r, g, b) = self.channels();
        Rgb24 {
            r: (r << 3) | (r >> 2),
            g: (g << 2) | (g >> 4),
            b: (b << 3) | (b >> 2),
        }
    }

    /// Scale each 5/6-bit channel by `gain`
    #[inline]
    pub fn scaled(self, gain: Gain) -> Self {
        let (r, g, b) = self.channels();
        Self::from_channels(gain.scale(r), gain.scale(g), gain.scale(b))
    }
}

impl fmt::Debug for Rgb565 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb565({:#06x})", self.0)
    }
}

impl From<Rgb24> for Rgb565 {
    fn from(color: Rgb24) -> Self {
        color.to_rgb565()
    }
}

// ============================================================================
// Storage formats
// ============================================================================

/// How a canvas stores one pixel in its byte buffer
pub trait PixelFormat {
    type Color: Copy + Default + PartialEq + fmt::Debug + From<Rgb565>;

    const BYTES_PER_PIXEL: usize;

    /// Write `color` into `out`, which is exactly `BYTES_PER_PIXEL` long
    fn encode(color: Self::Color, out: &mut [u8]);

    /// Read a color back from `bytes`, exactly `BYTES_PER_PIXEL` long
    fn decode(bytes: &[u8]) -> Self::Color;

    fn attenuate(color: Self::Color, gain: Gain) -> Self::Color;

    /// The byte value shared by every position of the encoded pixel, if the
    /// encoding happens to be uniform. Lets whole-buffer fills use `fill`.
    fn uniform_byte(color: Self::Color) -> Option<u8>;
}

/// 24 bits per pixel, stored R, G, B
#[derive(Debug, Clone, Copy)]
pub struct Bpp24;

impl PixelFormat for Bpp24 {
    type Color = Rgb24;

    const BYTES_PER_PIXEL: usize = 3;

    #[inline]
    fn encode(color: Rgb24, out: &mut [u8]) {
        out[0] = color.r;
        out[1] = color.g;
        out[2] = color.b;
    }

    #[inline]
    fn decode(bytes: &[u8]) -> Rgb24 {
        Rgb24::new(bytes[0], bytes[1], bytes[2])
    }

    #[inline]
    fn attenuate(color: Rgb24, gain: Gain) -> Rgb24 {
        color.scaled(gain)
    }

    #[inline]
    fn uniform_byte(color: Rgb24) -> Option<u8> {
        color.is_gray().then_some(color.r)
    }
}

/// 16 bits per pixel, 5-6-5 packed, little-endian
#[derive(Debug, Clone, Copy)]
pub struct Bpp16;

impl PixelFormat for Bpp16 {
    type Color = Rgb565;

    const BYTES_PER_PIXEL: usize = 2;

    #[inline]
    fn encode(color: Rgb565, out: &mut [u8]) {
        out.copy_from_slice(&color.0.to_le_bytes());
    }

    #[inline]
    fn decode(bytes: &[u8]) -> Rgb565 {
        Rgb565(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    #[inline]
    fn attenuate(color: Rgb565, gain: Gain) -> Rgb565 {
        color.scaled(gain)
    }

    #[inline]
    fn uniform_byte(color: Rgb565) -> Option<u8> {
        let [lo, hi] = color.0.to_le_bytes();
        (lo == hi).then_some(lo)
    }
}
