use std::marker::PhantomData;

use log::warn;
use thiserror::Error;

use super::brightness::Gain;
use super::color::{Bpp16, Bpp24, PixelFormat};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("cannot allocate a {width}x{height} canvas ({bytes} bytes)")]
    Allocation { width: u32, height: u32, bytes: usize },
}

// ============================================================================
// Rotation
// ============================================================================

/// Quarter-turn applied between logical (caller) and raw (buffer) coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Any index is accepted; only the low two bits count
    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Odd rotations swap logical width and height
    #[inline]
    pub const fn is_transposed(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

impl From<u8> for Rotation {
    fn from(index: u8) -> Self {
        Self::from_index(index)
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// Offscreen framebuffer with rotation-aware, brightness-adjusted drawing.
///
/// The byte buffer is row-major in raw (unrotated) order and never changes
/// size. Every public drawing call takes logical coordinates; the private
/// `raw_*` helpers take raw coordinates and never rotate again.
///
/// If the buffer could not be allocated the canvas stays usable but every
/// operation is a no-op and every read returns the default color. Check
/// [`Canvas::is_valid`] when that matters.
pub struct Canvas<F: PixelFormat> {
    buffer: Vec<u8>,
    raw_width: u32,
    raw_height: u32,
    rotation: Rotation,
    gain: Gain,
    format: PhantomData<F>,
}

/// 24-bit RGB canvas
pub type Canvas24 = Canvas<Bpp24>;
/// 16-bit 5-6-5 canvas
pub type Canvas16 = Canvas<Bpp16>;

impl<F: PixelFormat> Canvas<F> {
    /// Allocate a zeroed canvas, reporting allocation failure
    pub fn try_new(width: u32, height: u32) -> Result<Self, CanvasError> {
        let failure = |bytes| CanvasError::Allocation {
            width,
            height,
            bytes,
        };
        let bytes = Self::byte_len(width, height).ok_or_else(|| failure(usize::MAX))?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(bytes)
            .map_err(|_| failure(bytes))?;
        buffer.resize(bytes, 0);

        Ok(Self::with_buffer(buffer, width, height))
    }

    /// Allocate a zeroed canvas. On allocation failure the canvas degrades
    /// to a no-op canvas instead of aborting.
    pub fn new(width: u32, height: u32) -> Self {
        Self::try_new(width, height).unwrap_or_else(|err| {
            warn!("{err}; drawing to this canvas is disabled");
            Self::with_buffer(Vec::new(), width, height)
        })
    }

    fn with_buffer(buffer: Vec<u8>, raw_width: u32, raw_height: u32) -> Self {
        Self {
            buffer,
            raw_width,
            raw_height,
            rotation: Rotation::Deg0,
            gain: Gain::FULL,
            format: PhantomData,
        }
    }

    fn byte_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(F::BYTES_PER_PIXEL)
    }

    /// False when the pixel buffer could not be allocated
    pub fn is_valid(&self) -> bool {
        Self::byte_len(self.raw_width, self.raw_height) == Some(self.buffer.len())
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Logical width under the current rotation
    #[inline]
    pub fn width(&self) -> u32 {
        if self.rotation.is_transposed() {
            self.raw_height
        } else {
            self.raw_width
        }
    }

    /// Logical height under the current rotation
    #[inline]
    pub fn height(&self) -> u32 {
        if self.rotation.is_transposed() {
            self.raw_width
        } else {
            self.raw_height
        }
    }

    #[inline]
    pub fn raw_width(&self) -> u32 {
        self.raw_width
    }

    #[inline]
    pub fn raw_height(&self) -> u32 {
        self.raw_height
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Affects every later draw call; pixels already drawn stay put
    pub fn set_rotation(&mut self, rotation: impl Into<Rotation>) {
        self.rotation = rotation.into();
    }

    #[inline]
    pub fn gain(&self) -> Gain {
        self.gain
    }

    pub fn set_gain(&mut self, gain: Gain) {
        self.gain = gain;
    }

    /// 255 leaves colors untouched, 0 turns everything black
    pub fn set_brightness(&mut self, brightness: u8) {
        self.gain = Gain::from_brightness(brightness);
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i32 && y < self.height() as i32
    }

    #[inline]
    fn in_raw_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.raw_width as i32 && y < self.raw_height as i32
    }

    /// Logical to raw coordinates for the current rotation
    #[inline]
    fn to_raw(&self, x: i32, y: i32) -> (i32, i32) {
        let w = self.raw_width as i32;
        let h = self.raw_height as i32;
        match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (w - 1 - y, x),
            Rotation::Deg180 => (w - 1 - x, h - 1 - y),
            Rotation::Deg270 => (y, h - 1 - x),
        }
    }

    /// Byte offset of raw pixel (x, y)
    #[inline]
    fn raw_index(&self, x: usize, y: usize) -> usize {
        (y * self.raw_width as usize + x) * F::BYTES_PER_PIXEL
    }

    // ========================================================================
    // Pixels
    // ========================================================================

    /// Write one pixel; off-canvas coordinates are silently ignored
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: impl Into<F::Color>) {
        if self.buffer.is_empty() || !self.in_bounds(x, y) {
            return;
        }
        let (rx, ry) = self.to_raw(x, y);
        let color = F::attenuate(color.into(), self.gain);
        self.raw_write(rx as usize, ry as usize, color);
    }

    /// Read a pixel in logical coordinates
    pub fn get_pixel(&self, x: i32, y: i32) -> F::Color {
        if !self.in_bounds(x, y) {
            return F::Color::default();
        }
        let (rx, ry) = self.to_raw(x, y);
        self.get_raw_pixel(rx, ry)
    }

    /// Read a pixel in raw coordinates, exactly as stored. Meant for display
    /// drivers walking the physical layout.
    pub fn get_raw_pixel(&self, x: i32, y: i32) -> F::Color {
        if self.buffer.is_empty() || !self.in_raw_bounds(x, y) {
            return F::Color::default();
        }
        let idx = self.raw_index(x as usize, y as usize);
        F::decode(&self.buffer[idx..idx + F::BYTES_PER_PIXEL])
    }

    #[inline]
    fn raw_write(&mut self, x: usize, y: usize, color: F::Color) {
        let idx = self.raw_index(x, y);
        F::encode(color, &mut self.buffer[idx..idx + F::BYTES_PER_PIXEL]);
    }

    /// Fill the whole buffer with one color.
    /// Colors whose encoding is a single repeated byte go through `fill`.
    pub fn fill_screen(&mut self, color: impl Into<F::Color>) {
        if self.buffer.is_empty() {
            return;
        }
        let color = F::attenuate(color.into(), self.gain);
        if let Some(byte) = F::uniform_byte(color) {
            self.buffer.fill(byte);
        } else {
            for px in self.buffer.chunks_exact_mut(F::BYTES_PER_PIXEL) {
                F::encode(color, px);
            }
        }
    }

    // ========================================================================
    // Fast lines
    // ========================================================================

    /// Horizontal run of `w` pixels starting at (x, y).
    /// A negative `w` extends leftward from x.
    pub fn draw_fast_hline(&mut self, mut x: i32, y: i32, mut w: i32, color: impl Into<F::Color>) {
        if self.buffer.is_empty() || w == 0 {
            return;
        }
        if w < 0 {
            w = w.saturating_neg();
            x = x.saturating_sub(w - 1);
        }

        let width = self.width() as i32;
        let height = self.height() as i32;

        // Edge rejection
        if y < 0 || y >= height || x >= width || x.saturating_add(w - 1) < 0 {
            return;
        }

        if x < 0 {
            w += x;
            x = 0;
        }
        if x.saturating_add(w) > width {
            w = width - x;
        }

        let color = F::attenuate(color.into(), self.gain);
        let raw_w = self.raw_width as i32;
        let raw_h = self.raw_height as i32;

        match self.rotation {
            Rotation::Deg0 => self.raw_hline(x as usize, y as usize, w as usize, color),
            Rotation::Deg90 => {
                self.raw_vline((raw_w - 1 - y) as usize, x as usize, w as usize, color);
            },
            Rotation::Deg180 => {
                let rx = raw_w - 1 - x - (w - 1);
                self.raw_hline(rx as usize, (raw_h - 1 - y) as usize, w as usize, color);
            },
            Rotation::Deg270 => {
                let ry = raw_h - 1 - x - (w - 1);
                self.raw_vline(y as usize, ry as usize, w as usize, color);
            },
        }
    }

    /// Vertical run of `h` pixels starting at (x, y).
    /// A negative `h` extends upward from y.
    pub fn draw_fast_vline(&mut self, x: i32, mut y: i32, mut h: i32, color: impl Into<F::Color>) {
        if self.buffer.is_empty() || h == 0 {
            return;
        }
        if h < 0 {
            h = h.saturating_neg();
            y = y.saturating_sub(h - 1);
        }

        let width = self.width() as i32;
        let height = self.height() as i32;

        // Edge rejection
        if x < 0 || x >= width || y >= height || y.saturating_add(h - 1) < 0 {
            return;
        }

        if y < 0 {
            h += y;
            y = 0;
        }
        if y.saturating_add(h) > height {
            h = height - y;
        }

        let color = F::attenuate(color.into(), self.gain);
        let raw_w = self.raw_width as i32;
        let raw_h = self.raw_height as i32;

        match self.rotation {
            Rotation::Deg0 => self.raw_vline(x as usize, y as usize, h as usize, color),
            Rotation::Deg90 => {
                let rx = raw_w - 1 - y - (h - 1);
                self.raw_hline(rx as usize, x as usize, h as usize, color);
            },
            Rotation::Deg180 => {
                let ry = raw_h - 1 - y - (h - 1);
                self.raw_vline((raw_w - 1 - x) as usize, ry as usize, h as usize, color);
            },
            Rotation::Deg270 => {
                self.raw_hline(y as usize, (raw_h - 1 - x) as usize, h as usize, color);
            },
        }
    }

    /// Raw-space horizontal run, already clipped and attenuated
    fn raw_hline(&mut self, x: usize, y: usize, len: usize, color: F::Color) {
        let start = self.raw_index(x, y);
        let run = &mut self.buffer[start..start + len * F::BYTES_PER_PIXEL];
        if let Some(byte) = F::uniform_byte(color) {
            run.fill(byte);
        } else {
            for px in run.chunks_exact_mut(F::BYTES_PER_PIXEL) {
                F::encode(color, px);
            }
        }
    }

    /// Raw-space vertical run, already clipped and attenuated
    fn raw_vline(&mut self, x: usize, y: usize, len: usize, color: F::Color) {
        let stride = self.raw_width as usize * F::BYTES_PER_PIXEL;
        let mut idx = self.raw_index(x, y);
        for _ in 0..len {
            F::encode(color, &mut self.buffer[idx..idx + F::BYTES_PER_PIXEL]);
            idx += stride;
        }
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    /// Filled rectangle; negative sizes extend left/up from (x, y)
    pub fn fill_rect(
        &mut self,
        mut x: i32,
        mut y: i32,
        mut w: i32,
        mut h: i32,
        color: impl Into<F::Color>,
    ) {
        if w < 0 {
            w = w.saturating_neg();
            x = x.saturating_sub(w - 1);
        }
        if h < 0 {
            h = h.saturating_neg();
            y = y.saturating_sub(h - 1);
        }
        let color: F::Color = color.into();
        let top = y.max(0);
        let bottom = y.saturating_add(h).min(self.height() as i32);
        for row in top..bottom {
            self.draw_fast_hline(x, row, w, color);
        }
    }

    /// One pixel thick rectangle outline
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: impl Into<F::Color>) {
        if w <= 0 || h <= 0 {
            return;
        }
        let color: F::Color = color.into();
        self.draw_fast_hline(x, y, w, color);
        self.draw_fast_hline(x, y + h - 1, w, color);
        self.draw_fast_vline(x, y, h, color);
        self.draw_fast_vline(x + w - 1, y, h, color);
    }

    /// Line between two points, both included.
    /// Axis-aligned lines take the fast paths, the rest use Bresenham.
    /// Endpoints far off the canvas are clipped first so only the visible
    /// stretch is walked.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: impl Into<F::Color>) {
        if self.buffer.is_empty() {
            return;
        }
        let color: F::Color = color.into();
        let bounds = (i64::from(self.width()), i64::from(self.height()));
        let Some((x0, y0, x1, y1)) = clip_segment(
            (i64::from(x0), i64::from(y0)),
            (i64::from(x1), i64::from(y1)),
            bounds,
        ) else {
            return;
        };

        if x0 == x1 {
            self.draw_fast_vline(x0 as i32, y0.min(y1) as i32, (y1 - y0).abs() as i32 + 1, color);
            return;
        }
        if y0 == y1 {
            self.draw_fast_hline(x0.min(x1) as i32, y0 as i32, (x1 - x0).abs() as i32 + 1, color);
            return;
        }

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.draw_pixel(x as i32, y as i32, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Circle outline (midpoint algorithm)
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: impl Into<F::Color>) {
        let color: F::Color = color.into();
        if radius <= 0 {
            if radius == 0 {
                self.draw_pixel(cx, cy, color);
            }
            return;
        }

        let mut x = radius;
        let mut y = 0;
        let mut err = 0;

        while x >= y {
            self.draw_pixel(cx + x, cy + y, color);
            self.draw_pixel(cx + y, cy + x, color);
            self.draw_pixel(cx - y, cy + x, color);
            self.draw_pixel(cx - x, cy + y, color);
            self.draw_pixel(cx - x, cy - y, color);
            self.draw_pixel(cx - y, cy - x, color);
            self.draw_pixel(cx + y, cy - x, color);
            self.draw_pixel(cx + x, cy - y, color);

            y += 1;
            err += 1 + 2 * y;
            if 2 * (err - x) + 1 > 0 {
                x -= 1;
                err += 1 - 2 * x;
            }
        }
    }

    /// Filled circle from horizontal spans
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: impl Into<F::Color>) {
        let color: F::Color = color.into();
        if radius <= 0 {
            if radius == 0 {
                self.draw_pixel(cx, cy, color);
            }
            return;
        }

        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            // Spans for the four octant pairs, skipping rows already filled
            self.draw_fast_hline(cx - x, cy + y, 2 * x + 1, color);
            if y != 0 {
                self.draw_fast_hline(cx - x, cy - y, 2 * x + 1, color);
            }
            if x != y {
                self.draw_fast_hline(cx - y, cy + x, 2 * y + 1, color);
                self.draw_fast_hline(cx - y, cy - x, 2 * y + 1, color);
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    // ========================================================================
    // Buffer access
    // ========================================================================

    /// Reverse the byte order of every stored pixel (RGB <-> BGR for 24-bit,
    /// endianness for 16-bit)
    pub fn byte_swap(&mut self) {
        for px in self.buffer.chunks_exact_mut(F::BYTES_PER_PIXEL) {
            px.reverse();
        }
    }

    /// Raw buffer in physical order, for handing to a display driver
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Every stored pixel in raw row-major order
    pub fn raw_pixels(&self) -> impl Iterator<Item = F::Color> + '_ {
        self.buffer.chunks_exact(F::BYTES_PER_PIXEL).map(F::decode)
    }
}

/// Clip a segment to one pixel beyond a `width` x `height` area
/// (Liang-Barsky). Segments already inside come back untouched; `None` when
/// nothing of it is visible.
fn clip_segment(
    (x0, y0): (i64, i64),
    (x1, y1): (i64, i64),
    (width, height): (i64, i64),
) -> Option<(i64, i64, i64, i64)> {
    let inside = |x: i64, y: i64| (-1..=width).contains(&x) && (-1..=height).contains(&y);
    if inside(x0, y0) && inside(x1, y1) {
        return Some((x0, y0, x1, y1));
    }

    let (dx, dy) = (x1 - x0, y1 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x0 + 1), (dx, width - x0), (-dy, y0 + 1), (dy, height - y0)] {
        if p == 0 {
            if q < 0 {
                return None;
            }
            continue;
        }
        let r = q as f64 / p as f64;
        if p < 0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        let x = (x0 as f64 + t * dx as f64).round() as i64;
        let y = (y0 as f64 + t * dy as f64).round() as i64;
        (x.clamp(-1, width), y.clamp(-1, height))
    };
    let (ax, ay) = at(t0);
    let (bx, by) = at(t1);
    Some((ax, ay, bx, by))
}
