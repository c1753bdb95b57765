//! Decoded images as seen by the raster core.
//!
//! Bitmap decoders live outside this crate; anything that can report a size
//! and hand out packed 5-6-5 pixels in row-major order can be blitted.

use log::warn;

use super::canvas::Canvas16;
use super::color::Rgb565;

/// A decoded image: width, height and a raw pixel accessor
pub trait ImageSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Row-major pixels, `width * height` long
    fn pixels(&self) -> &[Rgb565];
}

/// Owned 5-6-5 image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image565 {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl Image565 {
    /// Black image; empty if `width * height` pixels cannot be allocated
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = Vec::new();
        let len = (width as usize).checked_mul(height as usize);
        match len {
            Some(len) if pixels.try_reserve_exact(len).is_ok() => {
                pixels.resize(len, Rgb565::BLACK);
                Self {
                    width,
                    height,
                    pixels,
                }
            },
            _ => {
                warn!("cannot allocate a {width}x{height} image");
                Self::default()
            },
        }
    }

    /// Wrap existing pixels; `None` unless there are exactly `width * height`
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb565>) -> Option<Self> {
        (pixels.len() == (width as usize) * (height as usize)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Snapshot of a canvas in raw (unrotated) order. A canvas that failed
    /// to allocate gives an empty image.
    pub fn from_canvas(canvas: &Canvas16) -> Self {
        if !canvas.is_valid() {
            return Self::default();
        }
        Self {
            width: canvas.raw_width(),
            height: canvas.raw_height(),
            pixels: canvas.raw_pixels().collect(),
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    pub fn into_pixels(self) -> Vec<Rgb565> {
        self.pixels
    }
}

impl ImageSource for Image565 {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(Image565::from_pixels(2, 2, vec![Rgb565::WHITE; 4]).is_some());
        assert!(Image565::from_pixels(2, 2, vec![Rgb565::WHITE; 3]).is_none());
    }

    #[test]
    fn test_unallocatable_sizes_give_empty_images() {
        let image = Image565::from_canvas(&Canvas16::new(u32::MAX, u32::MAX));
        assert_eq!((image.width(), image.height()), (0, 0));
        assert!(image.pixels().is_empty());

        let image = Image565::new(u32::MAX, u32::MAX);
        assert!(image.pixels().is_empty());
        assert_eq!(image.get(0, 0), None);

        assert_eq!(Image565::new(3, 2).pixels(), &[Rgb565::BLACK; 6]);
    }

    #[test]
    fn test_from_canvas_is_raw_order() {
        let mut canvas = Canvas16::new(3, 2);
        canvas.set_rotation(2);
        canvas.draw_pixel(0, 0, Rgb565::WHITE);
        let image = Image565::from_canvas(&canvas);
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.get(2, 1), Some(Rgb565::WHITE));
        assert_eq!(image.get(0, 0), Some(Rgb565::BLACK));
        assert_eq!(image.get(3, 0), None);
    }
}
