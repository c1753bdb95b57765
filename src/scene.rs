//! The weather/clock frame: everything drawn onto the panel each frame.
//!
//! Background threads only ever hand in an [`Observation`] value; all canvas
//! writes happen here, on the frame thread.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::warn;

use crate::config::SceneConfig;
use crate::icons::draw_icon;
use crate::raster::resample::MAX_SUBPIXEL_BITS;
use crate::raster::{
    blend_horizontal, blit, downscale_box, text_width, Canvas16, Canvas24, Image565, ImageSource,
    Rgb24, SubPixel, TinyFont,
};
use crate::weather::Observation;

const TEXT: Rgb24 = Rgb24::WHITE;
const HUMIDITY_TEXT: Rgb24 = Rgb24::new(120, 180, 255);
const LOADING_DOT: Rgb24 = Rgb24::new(117, 7, 135);

/// Seconds for one full icon animation cycle
const ICON_PERIOD_SECS: f32 = 4.0;

// ============================================================================
// Icon scroller
// ============================================================================

/// Ping-pong horizontal position in fixed point with `bits` fractional bits.
///
/// Moves one sub-step per frame, turns around on reaching
/// `travel * 2^bits - 1` and again on returning to 0.
#[derive(Debug, Clone)]
pub struct IconScroller {
    position: i32,
    bits: u32,
    travel: i32,
    forward: bool,
}

impl IconScroller {
    /// `travel` is how many whole columns the icon may move:
    /// `panel_width - 1 - icon_width`
    pub fn new(travel: i32, bits: u32) -> Self {
        Self {
            position: 0,
            bits,
            travel,
            forward: true,
        }
    }

    /// Span for an icon of `icon_width` on a panel of `panel_width`
    pub fn for_panel(panel_width: u32, icon_width: u32, bits: u32) -> Self {
        Self::new(panel_width as i32 - 1 - icon_width as i32, bits)
    }

    #[inline]
    pub fn position(&self) -> i32 {
        self.position
    }

    fn limit(&self) -> i32 {
        (self.travel << self.bits) - 1
    }

    /// Change the span, pulling the position back inside it
    pub fn set_travel(&mut self, travel: i32) {
        self.travel = travel;
        self.position = self.position.clamp(0, self.limit().max(0));
    }

    pub fn advance(&mut self) {
        let limit = self.limit();
        if limit <= 0 {
            self.position = 0;
            return;
        }
        if self.forward {
            self.position += 1;
            if self.position >= limit {
                self.forward = false;
            }
        } else {
            self.position -= 1;
            if self.position <= 0 {
                self.forward = true;
            }
        }
    }

    /// Whole-pixel column
    #[inline]
    pub fn column(&self) -> i32 {
        self.position >> self.bits
    }

    /// Fractional part of the position
    pub fn subpixel(&self) -> SubPixel {
        SubPixel::new(self.position as u32, self.bits)
    }

    /// Blit column and blend offset that put the icon's left edge exactly at
    /// `position / 2^bits`. The blend writes every source column one to the
    /// right and leans toward the right-hand neighbour by `k0`, so content
    /// lands at `column + 1 - k0 / 2^bits`.
    pub fn placement(&self) -> (i32, SubPixel) {
        let modulus = 1i32 << self.bits;
        let k0 = (modulus - (self.position & (modulus - 1))) & (modulus - 1);
        let column = ((self.position + k0) >> self.bits) - 1;
        (column, SubPixel::new(k0 as u32, self.bits))
    }
}

// ============================================================================
// Loading animation
// ============================================================================

/// Dot travelling along the bottom band until the first observation arrives
#[derive(Debug, Clone)]
pub struct LoadingAnimation {
    x: i32,
    radius: i32,
}

impl Default for LoadingAnimation {
    fn default() -> Self {
        Self { x: 8, radius: 5 }
    }
}

impl LoadingAnimation {
    /// Height of the band the dot runs in
    pub const BAND: i32 = 16;

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn draw(&self, canvas: &mut Canvas24) {
        let (w, h) = (canvas.width() as i32, canvas.height() as i32);
        canvas.fill_rect(0, h - Self::BAND, w, Self::BAND, Rgb24::BLACK);
        canvas.fill_circle(self.x, h - Self::BAND / 2, self.radius, LOADING_DOT);
    }

    /// Step one pixel right, wrapping once the dot has fully left the panel
    pub fn advance(&mut self, panel_width: u32) {
        self.x += 1;
        if self.x > panel_width as i32 - 1 + self.radius {
            self.x = -self.radius;
        }
    }
}

// ============================================================================
// Scene
// ============================================================================

pub struct WeatherScene {
    icon: Canvas16,
    scroller: IconScroller,
    loading: LoadingAnimation,
    thumbnail_scale: u32,
    offset: FixedOffset,
    phase: f32,
}

impl WeatherScene {
    pub fn new(panel_width: u32, config: &SceneConfig, utc_offset_secs: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| {
            warn!("UTC offset {}s out of range, using UTC", utc_offset_secs);
            Utc.fix()
        });
        let bits = config.subpixel_bits.min(MAX_SUBPIXEL_BITS);
        Self {
            icon: Canvas16::new(config.icon_size, config.icon_size),
            scroller: IconScroller::for_panel(panel_width, config.icon_size, bits),
            loading: LoadingAnimation::default(),
            thumbnail_scale: config.thumbnail_scale,
            offset,
            phase: 0.0,
        }
    }

    pub fn scroller(&self) -> &IconScroller {
        &self.scroller
    }

    /// Draw one frame. `dt` is the time since the previous frame in seconds.
    pub fn render(
        &mut self,
        panel: &mut Canvas24,
        observation: Option<&Observation>,
        now: DateTime<Utc>,
        dt: f32,
    ) {
        panel.fill_screen(Rgb24::BLACK);
        let (panel_w, panel_h) = (panel.width() as i32, panel.height() as i32);

        match observation {
            None => {
                self.loading.draw(panel);
                self.loading.advance(panel.width());
            },
            Some(obs) => {
                self.phase = (self.phase + dt / ICON_PERIOD_SECS).rem_euclid(1.0);
                draw_icon(&mut self.icon, obs.icon, self.phase);
                let icon = Image565::from_canvas(&self.icon);
                self.draw_scrolling_icon(panel, &icon);
                self.draw_thumbnail(panel, &icon);

                panel.draw_text(&TinyFont, 0, 0, &format_temperature(obs.temperature), TEXT);
                panel.draw_text(
                    &TinyFont,
                    0,
                    panel_h - TinyFont::HEIGHT as i32,
                    &format_humidity(obs.humidity),
                    HUMIDITY_TEXT,
                );
            },
        }

        let clock = self.clock_text(now);
        let x = panel_w - text_width(&TinyFont, &clock) as i32;
        panel.draw_text(&TinyFont, x, panel_h - TinyFont::HEIGHT as i32, &clock, TEXT);
    }

    fn draw_scrolling_icon(&mut self, panel: &mut Canvas24, icon: &Image565) {
        let (w, h) = (icon.width(), icon.height());
        self.scroller.set_travel(panel.width() as i32 - 1 - w as i32);

        let (column, shift) = self.scroller.placement();
        let blended = blend_horizontal(icon.pixels(), w as usize, h as usize, shift);
        if let Some(blended) = Image565::from_pixels(w, h, blended) {
            let y = panel.height() as i32 / 2 - h as i32 / 2;
            blit(panel, column, y, &blended);
        }
        self.scroller.advance();
    }

    /// Box-filtered copy of the icon in the top-right corner
    fn draw_thumbnail(&self, panel: &mut Canvas24, icon: &Image565) {
        if self.thumbnail_scale == 0 {
            return;
        }
        let thumb = downscale_box(
            icon.pixels(),
            icon.width() as usize,
            icon.height() as usize,
            self.thumbnail_scale as usize,
        );
        blit(panel, panel.width() as i32 - thumb.width() as i32, 0, &thumb);
    }

    /// Local `HH:MM`
    pub fn clock_text(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.offset).format("%H:%M").to_string()
    }
}

pub fn format_temperature(celsius: f32) -> String {
    format!("{:.1}", celsius)
}

pub fn format_humidity(percent: f32) -> String {
    format!("{:.0}%", percent)
}
