mod canvas;
mod font;
mod renderer;
mod transform;

pub use canvas::{glyph_advance, line_advance, text_width, Canvas, Rgba};
pub use renderer::{RenderError, Renderer};
pub use transform::{screen_to_world, world_to_screen, Viewport};
