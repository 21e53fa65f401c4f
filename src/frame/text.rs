use image::{Rgba, RgbaImage};
use rusttype::{Font, GlyphId, PositionedGlyph, Scale, point};
use std::path::Path;

use crate::error::{FrameError, Result};

const DEFAULT_REGULAR: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");
const DEFAULT_BOLD: &[u8] = include_bytes!("../../fonts/DejaVuSans-Bold.ttf");

/// CSS-style weights used by the frame layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    /// 400 — lens and date.
    Regular,
    /// 500 — exposure settings.
    Medium,
    /// 600 — camera name.
    SemiBold,
}

/// Where `x` sits relative to the drawn line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Center,
    End,
}

/// The two faces the frame is typeset with.
#[derive(Clone)]
pub struct Typeface {
    regular: Font<'static>,
    bold: Font<'static>,
}

impl Typeface {
    /// The embedded DejaVu Sans faces.
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            regular: parse_static(DEFAULT_REGULAR, "embedded regular")?,
            bold: parse_static(DEFAULT_BOLD, "embedded bold")?,
        })
    }

    /// Load faces from TTF/OTF files, using the embedded face for any
    /// path that is not given.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self> {
        let regular = match regular {
            Some(path) => load_font_file(path)?,
            None => parse_static(DEFAULT_REGULAR, "embedded regular")?,
        };
        let bold = match bold {
            Some(path) => load_font_file(path)?,
            None => parse_static(DEFAULT_BOLD, "embedded bold")?,
        };
        Ok(Self { regular, bold })
    }

    fn face(&self, weight: Weight) -> &Font<'static> {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Medium | Weight::SemiBold => &self.bold,
        }
    }

    /// Advance width of `text` at an em size of `px`.
    pub fn measure(&self, text: &str, px: f32, weight: Weight) -> f32 {
        let font = self.face(weight);
        let glyphs = layout_line(font, text, px, 0.0, 0.0);
        line_width(&glyphs, 0.0)
    }

    /// Draw one line whose top edge is at `top`.
    ///
    /// `x` is the left edge, centre or right edge depending on `anchor`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        px: f32,
        weight: Weight,
        color: Rgba<u8>,
        x: f32,
        top: f32,
        anchor: Anchor,
    ) {
        if text.trim().is_empty() {
            return;
        }

        let font = self.face(weight);
        let width = self.measure(text, px, weight);
        let start_x = match anchor {
            Anchor::Start => x,
            Anchor::Center => x - width / 2.0,
            Anchor::End => x - width,
        };

        for glyph in layout_line(font, text, px, start_x, top) {
            blend_glyph(canvas, &glyph, color);
        }
    }
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("regular_glyphs", &self.regular.glyph_count())
            .field("bold_glyphs", &self.bold.glyph_count())
            .finish()
    }
}

fn parse_static(bytes: &'static [u8], what: &str) -> Result<Font<'static>> {
    Font::try_from_bytes(bytes).ok_or_else(|| FrameError::Font(format!("{what} face is unreadable")))
}

fn load_font_file(path: &Path) -> Result<Font<'static>> {
    let data = std::fs::read(path)?;
    let font = Font::try_from_vec(data)
        .ok_or_else(|| FrameError::Font(format!("{} is not a TrueType/OpenType font", path.display())))?;
    log::debug!("Loaded font {}", path.display());
    Ok(font)
}

/// rusttype scales by ascent-to-descent height; convert an em size to that.
fn em_scale(font: &Font<'static>, px: f32) -> Scale {
    let vm = font.v_metrics_unscaled();
    let units = font.units_per_em().max(1) as f32;
    Scale::uniform(px * (vm.ascent - vm.descent) / units)
}

/// Lay out a single line with kerning, skipping glyphs the font lacks.
fn layout_line(
    font: &Font<'static>,
    text: &str,
    px: f32,
    x: f32,
    top: f32,
) -> Vec<PositionedGlyph<'static>> {
    let scale = em_scale(font, px);
    let baseline = top + font.v_metrics(scale).ascent;
    let mut caret = x;
    let mut previous: Option<GlyphId> = None;
    let mut glyphs = Vec::with_capacity(text.len());

    for ch in text.chars() {
        let glyph = font.glyph(ch);
        if glyph.id() == GlyphId(0) && !ch.is_whitespace() {
            continue;
        }
        if let Some(prev) = previous {
            caret += font.pair_kerning(scale, prev, glyph.id());
        }
        previous = Some(glyph.id());

        let scaled = glyph.scaled(scale);
        let advance = scaled.h_metrics().advance_width;
        glyphs.push(scaled.positioned(point(caret, baseline)));
        caret += advance;
    }

    glyphs
}

fn line_width(glyphs: &[PositionedGlyph<'static>], start_x: f32) -> f32 {
    glyphs
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width - start_x)
        .unwrap_or(0.0)
}

fn blend_glyph(canvas: &mut RgbaImage, glyph: &PositionedGlyph<'static>, color: Rgba<u8>) {
    let Some(bb) = glyph.pixel_bounding_box() else {
        return;
    };
    let (width, height) = canvas.dimensions();

    glyph.draw(|gx, gy, coverage| {
        let px = gx as i32 + bb.min.x;
        let py = gy as i32 + bb.min.y;
        if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
            return;
        }
        let alpha = coverage.clamp(0.0, 1.0) * (color.0[3] as f32 / 255.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = canvas.get_pixel_mut(px as u32, py as u32);
        for i in 0..3 {
            dst.0[i] = (color.0[i] as f32 * alpha + dst.0[i] as f32 * (1.0 - alpha)).round() as u8;
        }
        dst.0[3] = 255;
    });
}
