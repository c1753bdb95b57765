//! Moving pixel blocks between buffers.
//!
//! A [`BlitTarget`] owns its own clipping. The helpers here hand x, y, the
//! pixel slice, width and height straight through, so a source block may sit
//! partly or wholly outside the destination.

use super::brightness::BrightnessTable;
use super::canvas::Canvas;
use super::color::{PixelFormat, Rgb565};
use super::image::ImageSource;

/// Anything that accepts a row-major block of 5-6-5 pixels at a position.
/// Usually a display driver's framebuffer or another canvas.
pub trait BlitTarget {
    fn draw_rgb_bitmap(&mut self, x: i32, y: i32, pixels: &[Rgb565], width: u32, height: u32);
}

impl<F: PixelFormat> BlitTarget for Canvas<F> {
    /// Per-pixel draw in logical space, so rotation, gain and clipping all apply
    fn draw_rgb_bitmap(&mut self, x: i32, y: i32, pixels: &[Rgb565], width: u32, height: u32) {
        if width == 0 {
            return;
        }
        for (row, line) in pixels
            .chunks_exact(width as usize)
            .take(height as usize)
            .enumerate()
        {
            let dy = y.saturating_add(row as i32);
            for (col, &px) in line.iter().enumerate() {
                self.draw_pixel(x.saturating_add(col as i32), dy, px);
            }
        }
    }
}

/// Hand an image to `target` at (x, y) unmodified
pub fn blit<T, I>(target: &mut T, x: i32, y: i32, image: &I)
where
    T: BlitTarget + ?Sized,
    I: ImageSource + ?Sized,
{
    target.draw_rgb_bitmap(x, y, image.pixels(), image.width(), image.height());
}

/// Run every pixel through `table`, then hand the result to `target`
pub fn blit_attenuated<T: BlitTarget + ?Sized>(
    target: &mut T,
    x: i32,
    y: i32,
    pixels: &[Rgb565],
    width: u32,
    height: u32,
    table: &BrightnessTable,
) {
    let dimmed: Vec<Rgb565> = pixels.iter().map(|&px| table.apply565(px)).collect();
    target.draw_rgb_bitmap(x, y, &dimmed, width, height);
}

/// Raw-space source rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole raw area of a canvas
    pub fn of<F: PixelFormat>(canvas: &Canvas<F>) -> Self {
        Self::new(0, 0, canvas.raw_width(), canvas.raw_height())
    }
}

/// Copy `region` of `src` (raw coordinates) into `dst` at logical (x, y),
/// converting colors as needed. Source pixels outside `src` read as black;
/// destination clipping is `dst`'s business.
pub fn copy_region<F, G>(src: &Canvas<F>, region: Region, dst: &mut Canvas<G>, x: i32, y: i32)
where
    F: PixelFormat,
    G: PixelFormat,
    G::Color: From<F::Color>,
{
    for row in 0..region.height as i32 {
        for col in 0..region.width as i32 {
            let (sx, sy) = (region.x.saturating_add(col), region.y.saturating_add(row));
            let px = src.get_raw_pixel(sx, sy);
            dst.draw_pixel(x.saturating_add(col), y.saturating_add(row), G::Color::from(px));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::canvas::{Canvas16, Canvas24};
    use crate::raster::color::Rgb24;
    use crate::raster::image::Image565;

    /// Records what it was handed
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(i32, i32, Vec<Rgb565>, u32, u32)>,
    }

    impl BlitTarget for Recorder {
        fn draw_rgb_bitmap(&mut self, x: i32, y: i32, pixels: &[Rgb565], width: u32, height: u32) {
            self.calls.push((x, y, pixels.to_vec(), width, height));
        }
    }

    fn checker() -> Image565 {
        let pixels = vec![Rgb565::WHITE, Rgb565::BLACK, Rgb565::BLACK, Rgb565::WHITE];
        Image565::from_pixels(2, 2, pixels).unwrap()
    }

    #[test]
    fn test_blit_passes_arguments_through() {
        let mut rec = Recorder::default();
        let image = checker();
        blit(&mut rec, -7, 300, &image);
        assert_eq!(rec.calls.len(), 1);
        let (x, y, pixels, w, h) = &rec.calls[0];
        assert_eq!((*x, *y, *w, *h), (-7, 300, 2, 2));
        assert_eq!(pixels.as_slice(), image.pixels());
    }

    #[test]
    fn test_blit_attenuated_dims_before_handing_off() {
        let mut rec = Recorder::default();
        let table = BrightnessTable::from_brightness(0);
        blit_attenuated(&mut rec, 1, 2, checker().pixels(), 2, 2, &table);
        let (x, y, pixels, _, _) = &rec.calls[0];
        assert_eq!((*x, *y), (1, 2));
        assert!(pixels.iter().all(|&c| c == Rgb565::BLACK));
    }

    #[test]
    fn test_canvas_target_clips_partial_blit() {
        let mut canvas = Canvas24::new(3, 3);
        blit(&mut canvas, -1, -1, &checker());
        // Only the bottom-right source pixel lands on (0, 0)
        assert_eq!(canvas.get_pixel(0, 0), Rgb24::WHITE);
        assert_eq!(canvas.raw_pixels().filter(|&c| c != Rgb24::BLACK).count(), 1);

        let before = canvas.as_bytes().to_vec();
        blit(&mut canvas, 10, -20, &checker());
        assert_eq!(canvas.as_bytes(), &before[..]);
    }

    #[test]
    fn test_canvas_target_honours_rotation() {
        let mut canvas = Canvas16::new(4, 2);
        canvas.set_rotation(1);
        let image = Image565::from_pixels(1, 1, vec![Rgb565::WHITE]).unwrap();
        blit(&mut canvas, 0, 0, &image);
        assert_eq!(canvas.get_raw_pixel(3, 0), Rgb565::WHITE);
    }

    #[test]
    fn test_copy_region_between_formats() {
        let mut src = Canvas16::new(4, 4);
        src.fill_rect(1, 1, 2, 2, Rgb565(0xF800));
        let mut dst = Canvas24::new(4, 4);
        copy_region(&src, Region::new(1, 1, 2, 2), &mut dst, 2, 2);
        assert_eq!(dst.get_pixel(2, 2), Rgb24::new(255, 0, 0));
        assert_eq!(dst.get_pixel(3, 3), Rgb24::new(255, 0, 0));
        assert_eq!(dst.get_pixel(1, 1), Rgb24::BLACK);
    }

    #[test]
    fn test_copy_region_offsets_near_limits() {
        let mut src = Canvas24::new(3, 2);
        src.fill_screen(Rgb24::new(1, 2, 3));
        let mut dst = Canvas24::new(3, 2);
        dst.fill_screen(Rgb24::WHITE);

        copy_region(&src, Region::of(&src), &mut dst, i32::MAX - 1, i32::MAX - 1);
        assert_eq!(dst.get_pixel(0, 0), Rgb24::WHITE);

        // Source pixels past i32::MAX read as black
        copy_region(&src, Region::new(i32::MAX - 1, 0, 3, 1), &mut dst, 0, 0);
        assert_eq!(dst.get_pixel(0, 0), Rgb24::BLACK);
        assert_eq!(dst.get_pixel(2, 0), Rgb24::BLACK);
        assert_eq!(dst.get_pixel(0, 1), Rgb24::WHITE);
    }

    #[test]
    fn test_copy_region_whole_canvas() {
        let mut src = Canvas24::new(3, 2);
        src.fill_screen(Rgb24::new(1, 2, 3));
        let mut dst = Canvas24::new(3, 2);
        copy_region(&src, Region::of(&src), &mut dst, 0, 0);
        assert_eq!(src.as_bytes(), dst.as_bytes());
    }
}
