use std::path::Path;

use image::{ColorType, ImageError};

use super::font::{glyph_for, Glyph, GLYPH_HEIGHT, GLYPH_WIDTH, SPACE_GLYPH};

pub type Rgba = [u8; 4];

/// Borrowed RGBA8 framebuffer with clipped drawing primitives.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// Wraps `frame`; a frame shorter than `width * height * 4` is clipped.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame(&self) -> &[u8] {
        self.frame
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let offset = self.byte_offset(x, y)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(color)
    }

    /// Writes one pixel, alpha-blending when `color[3] < 255`.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let dst = &mut self.frame[offset..offset + 4];
        match color[3] {
            0 => {}
            255 => dst.copy_from_slice(&color),
            alpha => {
                let a = alpha as u32;
                for channel in 0..3 {
                    let blended =
                        (color[channel] as u32 * a + dst[channel] as u32 * (255 - a)) / 255;
                    dst[channel] = blended as u8;
                }
                dst[3] = 255;
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, rect_width: i32, rect_height: i32, color: Rgba) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(rect_width).min(self.width as i32);
        let end_y = y.saturating_add(rect_height).min(self.height as i32);
        if end_x <= start_x || end_y <= start_y {
            return;
        }
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.put_pixel(px, py, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: i32, y: i32, rect_width: i32, rect_height: i32, color: Rgba) {
        if rect_width <= 1 || rect_height <= 1 {
            return;
        }
        self.fill_rect(x, y, rect_width, 1, color);
        self.fill_rect(x, y + rect_height - 1, rect_width, 1, color);
        self.fill_rect(x, y, 1, rect_height, color);
        self.fill_rect(x + rect_width - 1, y, 1, rect_height, color);
    }

    pub fn fill_square_centered(&mut self, cx: i32, cy: i32, half_size: i32, color: Rgba) {
        let side = half_size * 2 + 1;
        self.fill_rect(cx - half_size, cy - half_size, side, side, color);
    }

    pub fn draw_cross(&mut self, cx: i32, cy: i32, half_size: i32, color: Rgba) {
        for x in (cx - half_size)..=(cx + half_size) {
            self.put_pixel(x, cy, color);
        }
        for y in (cy - half_size)..=(cy + half_size) {
            self.put_pixel(cx, y, color);
        }
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let step_x = if x0 < x1 { 1 } else { -1 };
        let step_y = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.put_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    /// Horizontal gauge; `fraction` is clamped to `[0, 1]`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_bar(
        &mut self,
        x: i32,
        y: i32,
        bar_width: i32,
        bar_height: i32,
        fraction: f32,
        fill: Rgba,
        background: Rgba,
    ) {
        self.fill_rect(x, y, bar_width, bar_height, background);
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (bar_width as f32 * fraction).round() as i32;
        self.fill_rect(x, y, filled, bar_height, fill);
    }

    /// Draws `text` with the built-in 3x5 font; returns the advance in pixels.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: Rgba) -> i32 {
        let scale = scale.max(1);
        let mut cursor_x = x;
        for ch in text.chars() {
            let glyph = glyph_for(ch).unwrap_or(SPACE_GLYPH);
            self.draw_glyph(cursor_x, y, glyph, scale, color);
            cursor_x += glyph_advance(scale);
        }
        cursor_x - x
    }

    pub fn draw_text_centered(
        &mut self,
        center_x: i32,
        y: i32,
        text: &str,
        scale: i32,
        color: Rgba,
    ) {
        let width = text_width(text, scale);
        self.draw_text(center_x - width / 2, y, text, scale, color);
    }

    pub fn save_png(&self, path: &Path) -> Result<(), ImageError> {
        let expected = self.width as usize * self.height as usize * 4;
        let mut bytes = self.frame[..expected.min(self.frame.len())].to_vec();
        bytes.resize(expected, 0);
        image::save_buffer(path, &bytes, self.width, self.height, ColorType::Rgba8)
    }

    fn draw_glyph(&mut self, x: i32, y: i32, glyph: Glyph, scale: i32, color: Rgba) {
        for (row_index, row_bits) in glyph.rows.iter().enumerate() {
            let glyph_y = y + row_index as i32 * scale;
            for col in 0..GLYPH_WIDTH {
                if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                    continue;
                }
                self.fill_rect(x + col * scale, glyph_y, scale, scale, color);
            }
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel_offset = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        let byte_offset = pixel_offset.checked_mul(4)?;
        if byte_offset.checked_add(4)? > self.frame.len() {
            return None;
        }
        Some(byte_offset)
    }
}

pub fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale.max(1)
}

pub fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale.max(1)
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    let chars = text.chars().count() as i32;
    if chars == 0 {
        return 0;
    }
    chars * glyph_advance(scale) - scale.max(1)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const RED: Rgba = [255, 0, 0, 255];

    fn buffer(width: u32, height: u32) -> Vec<u8> {
        vec![0; width as usize * height as usize * 4]
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut frame = buffer(4, 4);
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.put_pixel(-1, 0, RED);
        canvas.put_pixel(4, 0, RED);
        canvas.fill_rect(-10, -10, 5, 5, RED);
        canvas.fill_rect(3, 3, 100, 100, RED);
        assert_eq!(canvas.pixel(3, 3), Some(RED));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(4, 4), None);
    }

    #[test]
    fn short_frame_never_panics() {
        let mut frame = vec![0u8; 10];
        let mut canvas = Canvas::new(&mut frame, 8, 8);
        canvas.clear(RED);
        canvas.fill_rect(0, 0, 8, 8, RED);
        canvas.draw_text(0, 0, "HP 100", 1, RED);
        assert_eq!(canvas.pixel(7, 7), None);
    }

    #[test]
    fn translucent_fill_blends_with_background() {
        let mut frame = buffer(2, 1);
        let mut canvas = Canvas::new(&mut frame, 2, 1);
        canvas.clear([0, 0, 0, 255]);
        canvas.fill_rect(0, 0, 1, 1, [255, 255, 255, 128]);
        let blended = canvas.pixel(0, 0).expect("pixel");
        assert!(blended[0] > 100 && blended[0] < 160);
        assert_eq!(blended[3], 255);
        assert_eq!(canvas.pixel(1, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn bar_fill_is_proportional_and_clamped() {
        let mut frame = buffer(10, 1);
        let mut canvas = Canvas::new(&mut frame, 10, 1);
        canvas.draw_bar(0, 0, 10, 1, 0.3, RED, [0, 0, 255, 255]);
        assert_eq!(canvas.pixel(2, 0), Some(RED));
        assert_eq!(canvas.pixel(3, 0), Some([0, 0, 255, 255]));

        canvas.draw_bar(0, 0, 10, 1, 7.0, RED, [0, 0, 255, 255]);
        assert_eq!(canvas.pixel(9, 0), Some(RED));
        canvas.draw_bar(0, 0, 10, 1, f32::NAN, RED, [0, 0, 255, 255]);
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn line_reaches_both_endpoints() {
        let mut frame = buffer(8, 8);
        let mut canvas = Canvas::new(&mut frame, 8, 8);
        canvas.draw_line(1, 6, 6, 2, RED);
        assert_eq!(canvas.pixel(1, 6), Some(RED));
        assert_eq!(canvas.pixel(6, 2), Some(RED));
    }

    #[test]
    fn text_layout_follows_scale() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("AB", 1), 7);
        assert_eq!(text_width("AB", 2), 14);
        assert_eq!(glyph_advance(3), 12);
        assert_eq!(line_advance(1), 7);

        let mut frame = buffer(16, 8);
        let mut canvas = Canvas::new(&mut frame, 16, 8);
        let advance = canvas.draw_text(0, 0, "1", 1, RED);
        assert_eq!(advance, 4);
        // Top row of the glyph for '1' is 010.
        assert_eq!(canvas.pixel(1, 0), Some(RED));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn save_png_writes_a_decodable_image() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("frame.png");
        let mut frame = buffer(3, 2);
        let mut canvas = Canvas::new(&mut frame, 3, 2);
        canvas.clear([10, 20, 30, 255]);
        canvas.save_png(&path).expect("save");

        let decoded = image::open(&path).expect("open").to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }
}
