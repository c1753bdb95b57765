//! Brightness scaling applied to colors at write time.

use super::color::{Rgb24, Rgb565};

/// Multiplicative channel gain.
///
/// Stored one-based (`brightness + 1`, range 1..=256) and applied as
/// `(channel * gain) >> 8`, so brightness 255 is an exact identity while
/// brightness 0 maps every channel to 0. The same shift works for 5-, 6- and
/// 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gain(u16);

impl Gain {
    /// No attenuation
    pub const FULL: Self = Self(256);
    /// Everything black
    pub const OFF: Self = Self(1);

    pub const fn from_brightness(brightness: u8) -> Self {
        Self(brightness as u16 + 1)
    }

    pub const fn brightness(self) -> u8 {
        (self.0 - 1) as u8
    }

    #[inline]
    pub const fn is_identity(self) -> bool {
        self.0 == Self::FULL.0
    }

    #[inline]
    pub const fn scale(self, channel: u8) -> u8 {
        ((channel as u16 * self.0) >> 8) as u8
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::FULL
    }
}

/// Precomputed per-channel lookup for one [`Gain`]
#[derive(Clone)]
pub struct BrightnessTable {
    gain: Gain,
    lut: [u8; 256],
}

impl BrightnessTable {
    pub fn new(gain: Gain) -> Self {
        let mut lut = [0u8; 256];
        for (value, slot) in lut.iter_mut().enumerate() {
            *slot = gain.scale(value as u8);
        }
        Self { gain, lut }
    }

    pub fn from_brightness(brightness: u8) -> Self {
        Self::new(Gain::from_brightness(brightness))
    }

    #[inline]
    pub fn gain(&self) -> Gain {
        self.gain
    }

    #[inline]
    pub fn channel(&self, value: u8) -> u8 {
        self.lut[value as usize]
    }

    #[inline]
    pub fn apply24(&self, color: Rgb24) -> Rgb24 {
        Rgb24::new(self.channel(color.r), self.channel(color.g), self.channel(color.b))
    }

    #[inline]
    pub fn apply565(&self, color: Rgb565) -> Rgb565 {
        let (r, g, b) = color.channels();
        Rgb565::from_channels(self.channel(r), self.channel(g), self.channel(b))
    }
}
