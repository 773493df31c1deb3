//! RGBA8 raster buffer with simple 2D painting
//!
//! Painting uses straight-alpha source-over compositing. Coordinates are in
//! pixels with the origin at the top-left corner and y growing downward.

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba as Pixel, RgbaImage};

use crate::color::Rgba;

/// Glyph cell size of the built-in 8x8 font
pub const GLYPH_SIZE: u32 = 8;

const ELLIPSIS: char = '\u{2026}';
const ELLIPSIS_GLYPH: [u8; 8] = [0, 0, 0, 0, 0, 0, 0x49, 0];

/// Owned RGBA8 pixel buffer, row-major, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl RasterBuffer {
    /// Fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Buffer painted with a single color
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, to_pixel(color)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn data(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.image.into_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Overwrite every pixel, ignoring what was there
    pub fn clear(&mut self, color: Rgba) {
        let px = to_pixel(color);
        for pixel in self.image.pixels_mut() {
            *pixel = px;
        }
    }

    /// Composite one color over a single pixel; out-of-bounds writes are ignored
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || color.a <= 0.0 {
            return;
        }
        let Some(dst) = self.image.get_pixel_mut_checked(x as u32, y as u32) else {
            return;
        };
        let src_a = color.a.clamp(0.0, 1.0);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let mix = |src: u8, dst: u8| -> u8 {
            let v = (src as f32 * src_a + dst as f32 * dst_a * (1.0 - src_a)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        *dst = Pixel([
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            alpha_to_u8(out_a),
        ]);
    }

    /// Fill the pixels whose centers fall inside the rectangle
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let x0 = (x - 0.5).ceil() as i32;
        let y0 = (y - 0.5).ceil() as i32;
        let x1 = (x + w - 0.5).ceil() as i32;
        let y1 = (y + h - 0.5).ceil() as i32;
        for py in y0.max(0)..y1.min(self.height() as i32) {
            for px in x0.max(0)..x1.min(self.width() as i32) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Anti-aliased line segment of the given stroke width
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        let half = width.max(0.0) / 2.0;
        let pad = half + 1.0;
        let min_x = (from.0.min(to.0) - pad).floor().max(0.0) as i32;
        let max_x = (from.0.max(to.0) + pad).ceil().min(self.width() as f32) as i32;
        let min_y = (from.1.min(to.1) - pad).floor().max(0.0) as i32;
        let max_y = (from.1.max(to.1) + pad).ceil().min(self.height() as f32) as i32;

        for py in min_y..max_y {
            for px in min_x..max_x {
                let d = distance_to_segment((px as f32 + 0.5, py as f32 + 0.5), from, to);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color.fade(coverage));
                }
            }
        }
    }

    /// Connected line segments through `points`
    pub fn draw_polyline(&mut self, points: &[(f32, f32)], width: f32, color: Rgba) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], width, color);
        }
    }

    /// One-pixel outline along the inside of the given pixel rectangle
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (right, bottom) = (x + w - 1, y + h - 1);
        for px in x..=right {
            self.blend_pixel(px, y, color);
            if bottom != y {
                self.blend_pixel(px, bottom, color);
            }
        }
        for py in (y + 1)..bottom {
            self.blend_pixel(x, py, color);
            if right != x {
                self.blend_pixel(right, py, color);
            }
        }
    }

    /// Radial falloff from `color` at the center to fully transparent at `radius`
    pub fn radial_gradient(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let min_x = (center.0 - radius).floor().max(0.0) as i32;
        let max_x = (center.0 + radius).ceil().min(self.width() as f32) as i32;
        let min_y = (center.1 - radius).floor().max(0.0) as i32;
        let max_y = (center.1 + radius).ceil().min(self.height() as f32) as i32;

        for py in min_y..max_y {
            for px in min_x..max_x {
                let dx = px as f32 + 0.5 - center.0;
                let dy = py as f32 + 0.5 - center.1;
                let t = (dx * dx + dy * dy).sqrt() / radius;
                if t < 1.0 {
                    self.blend_pixel(px, py, color.fade(1.0 - t));
                }
            }
        }
    }

    /// Horizontal text with its left edge at `x` and vertical center at `center_y`
    pub fn draw_text(&mut self, text: &str, x: i32, center_y: i32, scale: u32, color: Rgba) {
        let scale = scale.max(1) as i32;
        let top = center_y - (GLYPH_SIZE as i32 * scale) / 2;
        self.for_each_text_pixel(text, scale, |this, u, v| {
            this.fill_block(x + u, top + v, scale, color);
        });
    }

    /// Text rotated a quarter turn counter-clockwise (reading bottom to top),
    /// centered on `center`
    pub fn draw_text_vertical(&mut self, text: &str, center: (i32, i32), scale: u32, color: Rgba) {
        let scale_i = scale.max(1) as i32;
        let half_w = text_width(text, scale) as i32 / 2;
        let half_h = (GLYPH_SIZE as i32 * scale_i) / 2;
        self.for_each_text_pixel(text, scale_i, |this, u, v| {
            // (u, v) in text space maps to (v, -u) after the rotation
            let local_u = u - half_w;
            let local_v = v - half_h;
            let px = center.0 + local_v;
            let py = center.1 - local_u - scale_i;
            this.fill_block(px, py, scale_i, color);
        });
    }

    fn for_each_text_pixel(&mut self, text: &str, scale: i32, mut plot: impl FnMut(&mut Self, i32, i32)) {
        for (col, ch) in text.chars().enumerate() {
            let glyph = glyph_for_char(ch);
            let origin = col as i32 * GLYPH_SIZE as i32 * scale;
            for (row, bits) in glyph.iter().enumerate() {
                for x_bit in 0..GLYPH_SIZE {
                    if (bits >> x_bit) & 0x01 == 0 {
                        continue;
                    }
                    plot(self, origin + x_bit as i32 * scale, row as i32 * scale);
                }
            }
        }
    }

    fn fill_block(&mut self, x: i32, y: i32, size: i32, color: Rgba) {
        for dy in 0..size {
            for dx in 0..size {
                self.blend_pixel(x + dx, y + dy, color);
            }
        }
    }
}

fn to_pixel(color: Rgba) -> Pixel<u8> {
    Pixel([color.r, color.g, color.b, alpha_to_u8(color.a)])
}

fn alpha_to_u8(a: f32) -> u8 {
    (a.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + abx * t - p.0, a.1 + aby * t - p.1);
    (cx * cx + cy * cy).sqrt()
}

/// Bitmap for a character; anything outside ASCII renders as '?'
pub fn glyph_for_char(ch: char) -> [u8; 8] {
    if ch == ELLIPSIS {
        return ELLIPSIS_GLYPH;
    }
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// Rendered width of `text` in pixels
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale.max(1)
}

/// Shorten `text` until it fits `max_width`, marking the cut with an ellipsis
///
/// Each pass drops two characters and appends `…`; text of three characters
/// or fewer is returned as-is even when it still overflows.
pub fn fit_text(text: &str, max_width: u32, scale: u32) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    while text_width_chars(chars.len(), scale) > max_width && chars.len() > 3 {
        chars.truncate(chars.len() - 2);
        chars.push(ELLIPSIS);
    }
    chars.into_iter().collect()
}

fn text_width_chars(count: usize, scale: u32) -> u32 {
    count as u32 * GLYPH_SIZE * scale.max(1)
}
