use image::imageops::overlay;
use image::{DynamicImage, RgbaImage};

use super::brand::mark_for;
use super::color::{BorderColor, Palette};
use super::layout::{Alignment, FrameGeometry};
use super::text::{Anchor, Typeface, Weight};
use crate::exif::ExifData;

/// Gap between the brand mark and the camera name, in primary font sizes.
const MARK_GAP_RATIO: f32 = 0.4;
/// The mark sits slightly above the text top so it centres on the cap height.
const MARK_RAISE_RATIO: f32 = 0.1;
/// Marks are never rasterized shorter than this, however small the photo.
const MIN_MARK_HEIGHT: f32 = 12.0;

/// Visual choices for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStyle {
    pub border_color: BorderColor,
    pub alignment: Alignment,
    /// Selects the brand mark instead of `make` when set.
    pub brand: Option<String>,
}

impl FrameStyle {
    fn brand_for<'a>(&'a self, exif: &'a ExifData) -> &'a str {
        self.brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(&exif.make)
    }
}

/// Render `photo` on a border with its metadata typeset underneath.
///
/// The canvas is `(W + 2·border) × (H + border + bottom padding)` with every
/// measure derived from `max(W, H)`, so previews and full-size exports
/// share proportions.
pub fn compose(
    photo: &DynamicImage,
    style: &FrameStyle,
    exif: &ExifData,
    typeface: &Typeface,
) -> RgbaImage {
    let geometry = FrameGeometry::new(photo.width(), photo.height());
    let mut canvas = RgbaImage::from_pixel(
        geometry.canvas_width(),
        geometry.canvas_height(),
        style.border_color.to_rgba(),
    );

    let (x, y) = geometry.image_offset();
    overlay(&mut canvas, &photo.to_rgba8(), x, y);

    let palette = Palette::for_background(style.border_color);
    let mark = brand_mark(style.brand_for(exif), geometry.base_font);
    let mut painter = Painter {
        canvas: &mut canvas,
        geometry: &geometry,
        palette,
        typeface,
        mark,
    };

    match style.alignment {
        Alignment::Left => painter.two_columns(exif),
        Alignment::Center => painter.stacked(exif, Anchor::Center),
        Alignment::Right => painter.stacked(exif, Anchor::End),
    }

    log::debug!(
        "Composed {}x{} frame ({} layout) around {}x{} photo",
        canvas.width(),
        canvas.height(),
        style.alignment,
        photo.width(),
        photo.height()
    );
    canvas
}

fn brand_mark(brand: &str, base_font: f32) -> Option<RgbaImage> {
    let mark = mark_for(brand)?;
    let height = base_font.max(MIN_MARK_HEIGHT).round() as u32;
    match mark.rasterize(height) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Skipping brand mark: {e}");
            None
        }
    }
}

struct Painter<'a> {
    canvas: &'a mut RgbaImage,
    geometry: &'a FrameGeometry,
    palette: Palette,
    typeface: &'a Typeface,
    mark: Option<RgbaImage>,
}

impl Painter<'_> {
    /// Camera and lens on the left, settings and date right-aligned.
    fn two_columns(&mut self, exif: &ExifData) {
        let g = *self.geometry;
        let second_line = g.text_top + g.line_pitch;

        self.camera_line(exif, g.left_edge(), g.text_top);
        self.line(&exif.lens, Weight::Regular, g.small_font, self.palette.muted, g.left_edge(), second_line, Anchor::Start);

        self.line(&exif.settings_line(), Weight::Medium, g.base_font, self.palette.text, g.right_edge(), g.text_top, Anchor::End);
        self.line(&exif.date_time, Weight::Regular, g.small_font, self.palette.tertiary, g.right_edge(), second_line, Anchor::End);
    }

    /// Camera, lens, settings and date on four lines sharing one anchor.
    fn stacked(&mut self, exif: &ExifData, anchor: Anchor) {
        let g = *self.geometry;
        let x = match anchor {
            Anchor::Center => g.center_x(),
            _ => g.right_edge(),
        };
        let top = |row: usize| g.text_top + row as f32 * g.line_pitch;

        let width = self.camera_line_width(exif);
        let start = match anchor {
            Anchor::Start => x,
            Anchor::Center => x - width / 2.0,
            Anchor::End => x - width,
        };
        self.camera_line(exif, start, top(0));

        self.line(&exif.lens, Weight::Regular, g.small_font, self.palette.muted, x, top(1), anchor);
        self.line(&exif.settings_line(), Weight::Medium, g.base_font, self.palette.text, x, top(2), anchor);
        self.line(&exif.date_time, Weight::Regular, g.small_font, self.palette.tertiary, x, top(3), anchor);
    }

    /// Width of the mark plus the camera name, as drawn by `camera_line`.
    fn camera_line_width(&self, exif: &ExifData) -> f32 {
        let g = self.geometry;
        let label = exif.camera_label();
        let text = self.typeface.measure(&label, g.base_font, Weight::SemiBold);
        match &self.mark {
            Some(mark) if label.is_empty() => mark.width() as f32,
            Some(mark) => mark.width() as f32 + g.base_font * MARK_GAP_RATIO + text,
            None => text,
        }
    }

    /// Brand mark followed by `"<make> <model>"`, starting at `x`.
    fn camera_line(&mut self, exif: &ExifData, x: f32, top: f32) {
        let g = *self.geometry;
        let mut text_x = x;

        if let Some(mark) = &self.mark {
            let mark_top = top - MARK_RAISE_RATIO * mark.height() as f32;
            overlay(
                &mut *self.canvas,
                mark,
                x.round() as i64,
                mark_top.round() as i64,
            );
            text_x += mark.width() as f32 + g.base_font * MARK_GAP_RATIO;
        }

        let label = exif.camera_label();
        self.line(&label, Weight::SemiBold, g.base_font, self.palette.text, text_x, top, Anchor::Start);
    }

    #[allow(clippy::too_many_arguments)]
    fn line(
        &mut self,
        text: &str,
        weight: Weight,
        px: f32,
        color: image::Rgba<u8>,
        x: f32,
        top: f32,
        anchor: Anchor,
    ) {
        self.typeface
            .draw(self.canvas, text, px, weight, color, x, top, anchor);
    }
}
