//! Bitmap text for small panels.

use super::canvas::Canvas;
use super::color::PixelFormat;

/// A fixed-cell bitmap font.
///
/// Each glyph is `glyph_height` rows; within a row bit `glyph_width - 1` is
/// the leftmost column.
pub trait GlyphSource {
    fn glyph_width(&self) -> u32;
    fn glyph_height(&self) -> u32;

    /// Horizontal distance between glyph origins
    fn advance(&self) -> u32 {
        self.glyph_width() + 1
    }

    /// Rows for `ch`, or `None` when the font has no such glyph
    fn glyph(&self, ch: char) -> Option<&[u16]>;
}

/// 3x5 font covering what a weather readout needs: digits, sign, decimal
/// point, colon, percent, degree and `C`
#[derive(Debug, Clone, Copy, Default)]
pub struct TinyFont;

impl TinyFont {
    pub const WIDTH: u32 = 3;
    pub const HEIGHT: u32 = 5;
}

#[rustfmt::skip]
const TINY_GLYPHS: &[(char, [u16; 5])] = &[
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('%', [0b101, 0b001, 0b010, 0b100, 0b101]),
    ('C', [0b111, 0b100, 0b100, 0b100, 0b111]),
    ('°', [0b010, 0b101, 0b010, 0b000, 0b000]),
    (' ', [0b000, 0b000, 0b000, 0b000, 0b000]),
];

impl GlyphSource for TinyFont {
    fn glyph_width(&self) -> u32 {
        Self::WIDTH
    }

    fn glyph_height(&self) -> u32 {
        Self::HEIGHT
    }

    fn glyph(&self, ch: char) -> Option<&[u16]> {
        TINY_GLYPHS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, rows)| rows.as_slice())
    }
}

/// Pixel width of `text`, not counting the gap after the last glyph
pub fn text_width(font: &impl GlyphSource, text: &str) -> u32 {
    let count = text.chars().count() as u32;
    (count * font.advance()).saturating_sub(font.advance() - font.glyph_width())
}

impl<F: PixelFormat> Canvas<F> {
    /// Draw `text` with its top-left corner at (x, y). Characters the font
    /// lacks leave a blank cell. Returns the x where the next glyph would go.
    pub fn draw_text(
        &mut self,
        font: &impl GlyphSource,
        x: i32,
        y: i32,
        text: &str,
        color: impl Into<F::Color>,
    ) -> i32 {
        let color: F::Color = color.into();
        let width = font.glyph_width();
        let mut cursor = x;

        for ch in text.chars() {
            if let Some(rows) = font.glyph(ch) {
                for (dy, bits) in rows.iter().enumerate() {
                    for col in 0..width {
                        if (bits >> (width - 1 - col)) & 1 == 1 {
                            self.draw_pixel(
                                cursor.saturating_add(col as i32),
                                y.saturating_add(dy as i32),
                                color,
                            );
                        }
                    }
                }
            }
            cursor = cursor.saturating_add(font.advance() as i32);
        }
        cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::canvas::Canvas24;
    use crate::raster::color::Rgb24;

    fn lit(canvas: &Canvas24) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..canvas.height() as i32 {
            for x in 0..canvas.width() as i32 {
                if canvas.get_pixel(x, y) != Rgb24::BLACK {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_every_glyph_fits_its_cell() {
        for (ch, rows) in TINY_GLYPHS {
            assert!(rows.iter().all(|&r| r < 1 << TinyFont::WIDTH), "{:?}", ch);
        }
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(&TinyFont, ""), 0);
        assert_eq!(text_width(&TinyFont, "1"), 3);
        assert_eq!(text_width(&TinyFont, "12.5"), 15);
    }

    #[test]
    fn test_draw_single_glyph() {
        let mut canvas = Canvas24::new(8, 8);
        let next = canvas.draw_text(&TinyFont, 1, 1, "-", Rgb24::WHITE);
        assert_eq!(next, 5);
        assert_eq!(lit(&canvas), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_leftmost_bit_is_leftmost_column() {
        let mut canvas = Canvas24::new(4, 5);
        canvas.draw_text(&TinyFont, 0, 0, "4", Rgb24::WHITE);
        // Bottom rows of '4' only light the right column
        assert_eq!(canvas.get_pixel(2, 4), Rgb24::WHITE);
        assert_eq!(canvas.get_pixel(0, 4), Rgb24::BLACK);
    }

    #[test]
    fn test_unknown_glyph_advances_blank() {
        let mut canvas = Canvas24::new(12, 6);
        let next = canvas.draw_text(&TinyFont, 0, 0, "?.", Rgb24::WHITE);
        assert_eq!(next, 8);
        assert_eq!(lit(&canvas), vec![(5, 4)]);
    }

    #[test]
    fn test_cursor_saturates_near_limit() {
        let mut canvas = Canvas24::new(4, 4);
        let next = canvas.draw_text(&TinyFont, i32::MAX - 2, i32::MAX, "88", Rgb24::WHITE);
        assert_eq!(next, i32::MAX);
        assert!(lit(&canvas).is_empty());
    }

    #[test]
    fn test_text_clips_at_edges() {
        let mut canvas = Canvas24::new(4, 4);
        canvas.draw_text(&TinyFont, -2, -2, "88", Rgb24::WHITE);
        assert!(!lit(&canvas).is_empty());
    }
}
