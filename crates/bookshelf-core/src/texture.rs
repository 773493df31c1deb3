//! Procedural textures for shelves, books and fillers
//!
//! Every texture is painted into a [`RasterBuffer`] from scratch; there are no
//! image assets. The decorative noise (wood grain jitter, spine stipple) uses
//! an unseeded generator unless the caller supplies one.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::color::{Rgb, Rgba};
use crate::config::TextureConfig;
use crate::raster::{fit_text, RasterBuffer};

/// Logical description of a texture; equal requests yield interchangeable rasters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaterialRequest {
    Wood { base: Rgb },
    BookSpine { color: Rgb, title: String },
    Placeholder,
    Label { text: String },
}

const GRAIN_SPACING: usize = 3;
const KNOT_COLOR: Rgba = Rgba::new(60, 30, 15, 0.3);
const GOLD_RULE: Rgba = Rgba::new(218, 165, 32, 0.6);
const SPINE_TITLE: Rgba = Rgba::new(255, 255, 255, 0.9);
const LABEL_TEXT: Rgba = Rgba::new(232, 213, 183, 0.8);

/// Wood grain: base fill, wavy low-alpha grain strokes and one or two knots
pub fn wood(base: Rgb, width: u32, height: u32, rng: &mut fastrand::Rng) -> RasterBuffer {
    let mut buffer = RasterBuffer::filled(width, height, base.into());
    let w = width as f32;

    for i in (0..height as usize).step_by(GRAIN_SPACING) {
        let y = i as f32;
        let phase = (y * 0.05).sin() * 8.0 + rng.f32() * 4.0;
        let color = Rgba::new(0, 0, 0, grain_alpha(rng));
        let stroke = 0.5 + rng.f32();

        let mut points = vec![(0.0, y)];
        points.extend(
            (0..width as usize)
                .step_by(10)
                .map(|x| x as f32)
                .map(|x| (x, y + ((x + phase) * 0.02).sin() * 2.0)),
        );
        buffer.draw_polyline(&points, stroke, color);
    }

    for _ in 0..knot_count(rng) {
        let center = (rng.f32() * w, rng.f32() * height as f32);
        let radius = 4.0 + rng.f32() * 8.0;
        buffer.radial_gradient(center, radius, KNOT_COLOR);
    }

    buffer
}

/// Grain stroke opacity, 3% to 7%
fn grain_alpha(rng: &mut fastrand::Rng) -> f32 {
    0.03 + rng.f32() * 0.04
}

fn knot_count(rng: &mut fastrand::Rng) -> usize {
    1 + rng.usize(0..2)
}

/// Book spine: cloth stipple, gold rules top and bottom, vertical title
pub fn book_spine(
    color: Rgb,
    title: &str,
    width: u32,
    height: u32,
    glyph_scale: u32,
    rng: &mut fastrand::Rng,
) -> RasterBuffer {
    let mut buffer = RasterBuffer::filled(width, height, color.into());

    for y in (0..height as i32).step_by(2) {
        for x in (0..width as i32).step_by(2) {
            if rng.f32() > 0.7 {
                buffer.blend_pixel(x, y, Rgba::new(0, 0, 0, rng.f32() * 0.08));
            }
        }
    }

    let (w, h) = (width as f32, height as f32);
    let rules = [
        (8.0, 20.0, w - 8.0),
        (10.0, 24.0, w - 10.0),
        (8.0, h - 30.0, w - 8.0),
        (10.0, h - 26.0, w - 10.0),
    ];
    for (x0, y, x1) in rules {
        buffer.draw_line((x0, y), (x1, y), 1.5, GOLD_RULE);
    }

    let available = height.saturating_sub(60);
    let fitted = fit_text(title, available, glyph_scale);
    buffer.draw_text_vertical(
        &fitted,
        (width as i32 / 2, height as i32 / 2),
        glyph_scale,
        SPINE_TITLE,
    );

    buffer
}

/// Ghost book: near-transparent fill, faint border and two faint rules
pub fn placeholder(width: u32, height: u32) -> RasterBuffer {
    let mut buffer = RasterBuffer::filled(width, height, Rgb::WHITE.with_alpha(0.03));
    buffer.stroke_rect(1, 1, width as i32 - 2, height as i32 - 2, Rgb::WHITE.with_alpha(0.12));

    let faint = Rgb::WHITE.with_alpha(0.06);
    let (w, h) = (width as f32, height as f32);
    buffer.draw_line((6.0, 16.0), (w - 6.0, 16.0), 1.0, faint);
    buffer.draw_line((6.0, h - 20.0), (w - 6.0, h - 20.0), 1.0, faint);
    buffer
}

/// Category name on a transparent strip, left aligned
pub fn label(text: &str, width: u32, height: u32, glyph_scale: u32) -> RasterBuffer {
    let mut buffer = RasterBuffer::new(width, height);
    let fitted = fit_text(text, width.saturating_sub(16), glyph_scale);
    buffer.draw_text(&fitted, 8, height as i32 / 2, glyph_scale, LABEL_TEXT);
    buffer
}

/// Stateless front end that maps requests to rasters at configured sizes
#[derive(Debug, Clone, Default)]
pub struct TextureSynthesizer {
    pub config: TextureConfig,
}

impl TextureSynthesizer {
    pub fn new(config: TextureConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(&self, request: &MaterialRequest) -> RasterBuffer {
        self.synthesize_with(request, &mut fastrand::Rng::new())
    }

    /// Same as [`synthesize`](Self::synthesize) with caller-controlled noise
    pub fn synthesize_with(&self, request: &MaterialRequest, rng: &mut fastrand::Rng) -> RasterBuffer {
        let c = &self.config;
        match request {
            MaterialRequest::Wood { base } => wood(*base, c.wood_size[0], c.wood_size[1], rng),
            MaterialRequest::BookSpine { color, title } => book_spine(
                *color,
                title,
                c.spine_size[0],
                c.spine_size[1],
                c.glyph_scale,
                rng,
            ),
            MaterialRequest::Placeholder => placeholder(c.placeholder_size[0], c.placeholder_size[1]),
            MaterialRequest::Label { text } => label(text, c.label_size[0], c.label_size[1], c.glyph_scale),
        }
    }
}

/// Per-build memo of synthesized rasters, keyed by request
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<MaterialRequest, Arc<RasterBuffer>>,
    misses: usize,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_synthesize(
        &mut self,
        synthesizer: &TextureSynthesizer,
        request: &MaterialRequest,
    ) -> Arc<RasterBuffer> {
        if let Some(raster) = self.entries.get(request) {
            return raster.clone();
        }
        self.misses += 1;
        let raster = Arc::new(synthesizer.synthesize(request));
        self.entries.insert(request.clone(), raster.clone());
        raster
    }

    pub fn get(&self, request: &MaterialRequest) -> Option<Arc<RasterBuffer>> {
        self.entries.get(request).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of requests that required synthesis
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        debug!(textures = self.entries.len(), "Clearing texture cache");
        self.entries.clear();
        self.misses = 0;
    }
}
