use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Border thickness as a fraction of the longest image side.
pub const BORDER_RATIO: f64 = 0.04;
/// Bottom band height relative to the side border.
pub const BOTTOM_PADDING_RATIO: f64 = 3.5;
/// Primary font size as a fraction of the longest image side.
pub const BASE_FONT_RATIO: f32 = 0.018;
/// Secondary lines relative to the primary font size.
pub const SMALL_FONT_RATIO: f32 = 0.85;
/// Distance between the first and second text line, in primary font sizes.
pub const LINE_PITCH: f32 = 1.4;
/// Where the text starts inside the bottom band.
pub const TEXT_OFFSET_RATIO: f32 = 0.15;

/// How the metadata block is aligned in the bottom band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Camera and lens on the left, settings and date on the right.
    #[default]
    Left,
    /// All four lines stacked and centred.
    Center,
    /// All four lines stacked against the right edge.
    Right,
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" | "centre" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(format!("unknown layout '{other}' (expected left, center or right)")),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        })
    }
}

/// Every measure of a frame, derived from the source dimensions alone.
///
/// Typography scales with `max(width, height)` so a 24 MP file and a
/// thumbnail produce the same proportions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    pub image_width: u32,
    pub image_height: u32,
    pub border: f32,
    pub bottom_padding: f32,
    pub base_font: f32,
    pub small_font: f32,
    pub text_top: f32,
    pub line_pitch: f32,
}

impl FrameGeometry {
    pub fn new(image_width: u32, image_height: u32) -> Self {
        let longest = image_width.max(image_height) as f32;
        let border = exact_border(image_width, image_height) as f32;
        let bottom_padding = border * BOTTOM_PADDING_RATIO as f32;
        let base_font = longest * BASE_FONT_RATIO;

        Self {
            image_width,
            image_height,
            border,
            bottom_padding,
            base_font,
            small_font: base_font * SMALL_FONT_RATIO,
            text_top: border + image_height as f32 + bottom_padding * TEXT_OFFSET_RATIO,
            line_pitch: base_font * LINE_PITCH,
        }
    }

    /// `W + 2·border`, truncated to whole pixels like a canvas size.
    pub fn canvas_width(&self) -> u32 {
        let border = exact_border(self.image_width, self.image_height);
        (self.image_width as f64 + 2.0 * border) as u32
    }

    /// `H + border + bottom padding`, truncated to whole pixels.
    pub fn canvas_height(&self) -> u32 {
        let border = exact_border(self.image_width, self.image_height);
        (self.image_height as f64 + border + border * BOTTOM_PADDING_RATIO) as u32
    }

    /// Top-left corner of the photo inside the canvas.
    pub fn image_offset(&self) -> (i64, i64) {
        let offset = exact_border(self.image_width, self.image_height) as i64;
        (offset, offset)
    }

    /// x of the left text column.
    pub fn left_edge(&self) -> f32 {
        self.border
    }

    /// x the right text column is aligned against.
    pub fn right_edge(&self) -> f32 {
        self.canvas_width() as f32 - self.border
    }

    pub fn center_x(&self) -> f32 {
        self.canvas_width() as f32 / 2.0
    }
}

/// Pixel sizes are truncated from double precision, as a canvas is.
fn exact_border(image_width: u32, image_height: u32) -> f64 {
    image_width.max(image_height) as f64 * BORDER_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn dimension_law_landscape() {
        let g = FrameGeometry::new(1000, 800);
        assert_close(g.border, 40.0);
        assert_close(g.bottom_padding, 140.0);
        assert_eq!(g.canvas_width(), 1080);
        assert_eq!(g.canvas_height(), 800 + 40 + 140);
        assert_eq!(g.image_offset(), (40, 40));
    }

    #[test]
    fn dimension_law_portrait_uses_longest_side() {
        let g = FrameGeometry::new(3000, 4000);
        assert_close(g.border, 160.0);
        assert_eq!(g.canvas_width(), 3000 + 320);
        assert_eq!(g.canvas_height(), 4000 + 160 + 560);
    }

    #[test]
    fn dimension_law_truncates_fractional_borders() {
        // border = 1.24, bottom = 4.34: 33.48 x 25.58
        let g = FrameGeometry::new(31, 20);
        assert_eq!(g.canvas_width(), 33);
        assert_eq!(g.canvas_height(), 25);
        assert_eq!(g.image_offset(), (1, 1));

        // border = 2.76, bottom = 9.66: 74.52 x 24.42
        let g = FrameGeometry::new(69, 12);
        assert_eq!(g.canvas_width(), 74);
        assert_eq!(g.canvas_height(), 24);
        assert_eq!(g.image_offset(), (2, 2));
    }

    #[test]
    fn typography_scales_with_resolution() {
        let g = FrameGeometry::new(1000, 500);
        assert_close(g.base_font, 18.0);
        assert_close(g.small_font, 15.3);
        assert_close(g.line_pitch, 25.2);
        assert_close(g.text_top, 40.0 + 500.0 + 140.0 * 0.15);
        assert_close(g.left_edge(), 40.0);
        assert_close(g.right_edge(), 1040.0);
        assert_close(g.center_x(), 540.0);
    }

    #[test]
    fn alignment_parsing() {
        assert_eq!("left".parse::<Alignment>(), Ok(Alignment::Left));
        assert_eq!("Centre".parse::<Alignment>(), Ok(Alignment::Center));
        assert_eq!(" RIGHT ".parse::<Alignment>(), Ok(Alignment::Right));
        assert!("justify".parse::<Alignment>().is_err());
        assert_eq!(Alignment::default(), Alignment::Left);
        assert_eq!(Alignment::Center.to_string(), "center");
    }
}
