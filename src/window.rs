//! Desktop preview of the LED panel.
//!
//! The panel buffer is shown in its physical (raw) layout, each LED drawn as
//! a `scale` x `scale` block.

use anyhow::{anyhow, Context, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use skyframe::raster::Canvas24;

pub struct PanelWindow {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

/// Streaming texture the panel bytes are uploaded into
pub struct PanelTexture<'a> {
    texture: Texture<'a>,
    width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Quit,
    BrightnessUp,
    BrightnessDown,
    Rotate,
}

impl PanelWindow {
    pub fn open(
        title: &str,
        panel_width: u32,
        panel_height: u32,
        scale: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let scale = scale.max(1);
        let sdl_context = sdl2::init().map_err(|e| anyhow!(e)).context("SDL init")?;
        let video_subsystem = sdl_context
            .video()
            .map_err(|e| anyhow!(e))
            .context("SDL video subsystem")?;

        let window = video_subsystem
            .window(title, panel_width * scale, panel_height * scale)
            .position_centered()
            .build()
            .context("creating window")?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().context("creating renderer")?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context
            .event_pump()
            .map_err(|e| anyhow!(e))
            .context("SDL event pump")?;

        Ok((
            Self {
                canvas,
                event_pump,
            },
            texture_creator,
        ))
    }

    /// Upload the panel's raw buffer and show it
    pub fn present(&mut self, target: &mut PanelTexture, panel: &Canvas24) -> Result<()> {
        if !panel.is_valid() {
            return Ok(());
        }
        target
            .texture
            .update(None, panel.as_bytes(), (target.width * 3) as usize)
            .context("uploading panel texture")?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(|e| anyhow!(e))?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => events.push(WindowEvent::Quit),
                Event::KeyDown {
                    keycode: Some(Keycode::Up),
                    ..
                } => events.push(WindowEvent::BrightnessUp),
                Event::KeyDown {
                    keycode: Some(Keycode::Down),
                    ..
                } => events.push(WindowEvent::BrightnessDown),
                Event::KeyDown {
                    keycode: Some(Keycode::R),
                    ..
                } => events.push(WindowEvent::Rotate),
                _ => {},
            }
        }

        events
    }
}

impl<'a> PanelTexture<'a> {
    /// Texture matching the panel's raw dimensions
    pub fn new(
        texture_creator: &'a TextureCreator<WindowContext>,
        panel_width: u32,
        panel_height: u32,
    ) -> Result<Self> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, panel_width, panel_height)
            .context("creating panel texture")?;
        Ok(Self {
            texture,
            width: panel_width,
        })
    }
}
