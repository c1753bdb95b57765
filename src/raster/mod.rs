mod brightness;
mod canvas;
mod color;
pub mod compositor;
mod font;
mod image;
pub mod resample;

pub use brightness::{BrightnessTable, Gain};
pub use canvas::{Canvas, Canvas16, Canvas24, CanvasError, Rotation};
pub use color::{Bpp16, Bpp24, PixelFormat, Rgb24, Rgb565};
pub use compositor::{blit, blit_attenuated, copy_region, BlitTarget, Region};
pub use font::{text_width, GlyphSource, TinyFont};
pub use image::{Image565, ImageSource};
pub use resample::{blend_horizontal, downscale_box, SubPixel};
