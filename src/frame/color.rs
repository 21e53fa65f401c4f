use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::FrameError;

/// An opaque sRGB border colour, written as `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BorderColor {
    pub const WHITE: BorderColor = BorderColor { r: 255, g: 255, b: 255 };
    pub const BLACK: BorderColor = BorderColor { r: 0, g: 0, b: 0 };

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(&self) -> f64 {
        0.2126 * srgb_to_linear(self.r)
            + 0.7152 * srgb_to_linear(self.g)
            + 0.0722 * srgb_to_linear(self.b)
    }

    pub fn is_dark(&self) -> bool {
        self.relative_luminance() < 0.5
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for BorderColor {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(FrameError::Color(s.to_string())),
        };
        let bytes = hex::decode(&expanded).map_err(|_| FrameError::Color(s.to_string()))?;
        Ok(BorderColor {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
        })
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
    }
}

impl Serialize for BorderColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BorderColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Text colours for a given border, shared by preview and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Camera name and exposure settings.
    pub text: Rgba<u8>,
    /// Lens name.
    pub muted: Rgba<u8>,
    /// Capture date.
    pub tertiary: Rgba<u8>,
}

impl Palette {
    pub const ON_DARK: Palette = Palette {
        text: Rgba([0xff, 0xff, 0xff, 0xff]),
        muted: Rgba([0xd1, 0xd5, 0xdb, 0xff]),
        tertiary: Rgba([0xd1, 0xd5, 0xdb, 0xff]),
    };

    pub const ON_LIGHT: Palette = Palette {
        text: Rgba([0x11, 0x18, 0x27, 0xff]),
        muted: Rgba([0x6b, 0x72, 0x80, 0xff]),
        tertiary: Rgba([0x9c, 0xa3, 0xaf, 0xff]),
    };

    /// Light text on dark borders, dark text on light ones.
    pub fn for_background(border: BorderColor) -> Palette {
        if border.is_dark() {
            Self::ON_DARK
        } else {
            Self::ON_LIGHT
        }
    }
}
