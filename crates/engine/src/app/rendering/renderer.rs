use std::path::Path;
use std::sync::Arc;

use image::ImageError;
use pixels::{Pixels, SurfaceTexture, TextureError};
use thiserror::Error;
use winit::window::Window;

use crate::app::scene::SceneHost;
use crate::app::Vec2;

use super::Canvas;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pixels backend failed: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("surface resize failed: {0}")]
    Texture(#[from] TextureError),
}

/// Fixed-size canvas scaled onto the window surface by `pixels`.
pub struct Renderer {
    pixels: Pixels<'static>,
    canvas_width: u32,
    canvas_height: u32,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(canvas_width, canvas_height, surface)?;
        Ok(Self {
            pixels,
            canvas_width,
            canvas_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    /// Maps a physical window position to canvas pixels; `None` outside the scaled canvas.
    pub fn window_pos_to_canvas(&self, x: f64, y: f64) -> Option<Vec2> {
        self.pixels
            .window_pos_to_pixel((x as f32, y as f32))
            .ok()
            .map(|(px, py)| Vec2 {
                x: px as f32,
                y: py as f32,
            })
    }

    pub(crate) fn render_scene(&mut self, host: &SceneHost) -> Result<(), RenderError> {
        {
            let mut canvas =
                Canvas::new(self.pixels.frame_mut(), self.canvas_width, self.canvas_height);
            host.render(&mut canvas);
        }
        self.pixels.render()?;
        Ok(())
    }

    pub fn save_last_frame_png(&mut self, path: &Path) -> Result<(), ImageError> {
        let canvas = Canvas::new(self.pixels.frame_mut(), self.canvas_width, self.canvas_height);
        canvas.save_png(path)
    }
}
