use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::format::{format_date, format_f_number, format_focal_length, format_iso, format_shutter};
use super::reader::RawTags;

/// Canonical camera metadata for one photo.
///
/// Every field is a finished display string; an unknown value is the empty
/// string, never a missing field. Records are built by [`normalize`] and
/// edited through [`ExifData::set`], which applies the same per-field rule
/// as the initial parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifData {
    pub make: String,
    pub model: String,
    pub lens: String,
    pub focal_length: String,
    pub f_number: String,
    pub exposure_time: String,
    pub iso: String,
    pub date_time: String,
}

/// Names one of the eight [`ExifData`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExifField {
    Make,
    Model,
    Lens,
    FocalLength,
    FNumber,
    ExposureTime,
    Iso,
    DateTime,
}

impl ExifField {
    pub const ALL: [ExifField; 8] = [
        ExifField::Make,
        ExifField::Model,
        ExifField::Lens,
        ExifField::FocalLength,
        ExifField::FNumber,
        ExifField::ExposureTime,
        ExifField::Iso,
        ExifField::DateTime,
    ];

    /// The camelCase name used in JSON output and `--set`.
    pub fn name(&self) -> &'static str {
        match self {
            ExifField::Make => "make",
            ExifField::Model => "model",
            ExifField::Lens => "lens",
            ExifField::FocalLength => "focalLength",
            ExifField::FNumber => "fNumber",
            ExifField::ExposureTime => "exposureTime",
            ExifField::Iso => "iso",
            ExifField::DateTime => "dateTime",
        }
    }

    /// Apply this field's canonicalization rule.
    pub fn canonicalize(&self, raw: &str) -> String {
        match self {
            ExifField::Make | ExifField::Model | ExifField::Lens => raw.to_string(),
            ExifField::FocalLength => format_focal_length(raw),
            ExifField::FNumber => format_f_number(raw),
            ExifField::ExposureTime => format_shutter(raw),
            ExifField::Iso => format_iso(raw),
            ExifField::DateTime => format_date(raw),
        }
    }
}

impl fmt::Display for ExifField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExifField {
    type Err = String;

    /// Accepts camelCase, snake_case and kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "make" => Ok(ExifField::Make),
            "model" => Ok(ExifField::Model),
            "lens" | "lensmodel" => Ok(ExifField::Lens),
            "focallength" | "focal" => Ok(ExifField::FocalLength),
            "fnumber" | "aperture" => Ok(ExifField::FNumber),
            "exposuretime" | "shutter" => Ok(ExifField::ExposureTime),
            "iso" => Ok(ExifField::Iso),
            "datetime" | "date" => Ok(ExifField::DateTime),
            _ => Err(format!(
                "unknown field `{s}` (expected one of: {})",
                ExifField::ALL.map(|f| f.name()).join(", ")
            )),
        }
    }
}

impl ExifData {
    /// Read a field's display value.
    pub fn get(&self, field: ExifField) -> &str {
        match field {
            ExifField::Make => &self.make,
            ExifField::Model => &self.model,
            ExifField::Lens => &self.lens,
            ExifField::FocalLength => &self.focal_length,
            ExifField::FNumber => &self.f_number,
            ExifField::ExposureTime => &self.exposure_time,
            ExifField::Iso => &self.iso,
            ExifField::DateTime => &self.date_time,
        }
    }

    /// Replace a field, running the value through that field's formatter.
    pub fn set(&mut self, field: ExifField, raw: &str) {
        let value = field.canonicalize(raw);
        let slot = match field {
            ExifField::Make => &mut self.make,
            ExifField::Model => &mut self.model,
            ExifField::Lens => &mut self.lens,
            ExifField::FocalLength => &mut self.focal_length,
            ExifField::FNumber => &mut self.f_number,
            ExifField::ExposureTime => &mut self.exposure_time,
            ExifField::Iso => &mut self.iso,
            ExifField::DateTime => &mut self.date_time,
        };
        *slot = value;
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        ExifField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// The model name with a repeated brand prefix removed.
    ///
    /// `"Canon"` + `"Canon EOS R5"` displays as `"EOS R5"`.
    pub fn display_model(&self) -> &str {
        let make_len = self.make.len();
        let repeats_make = self.model.is_char_boundary(make_len)
            && self.model.len() >= make_len
            && self.model[..make_len].to_lowercase() == self.make.to_lowercase();
        if repeats_make {
            self.model[make_len..].trim()
        } else {
            &self.model
        }
    }

    /// `"<make> <display model>"`, skipping whichever half is empty.
    pub fn camera_label(&self) -> String {
        [self.make.trim(), self.display_model()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Focal length, aperture, shutter and ISO joined by two spaces.
    pub fn settings_line(&self) -> String {
        format!(
            "{}  {}  {}  {}",
            self.focal_length, self.f_number, self.exposure_time, self.iso
        )
    }
}

/// Build the canonical record from decoded tags.
///
/// Missing tags leave their field at the empty sentinel; `lens` prefers
/// `LensModel` and falls back to the generic `Lens` tag.
pub fn normalize(tags: &RawTags) -> ExifData {
    let text = |name: &str| tags.resolve(name).unwrap_or_default().to_string();

    ExifData {
        make: text("Make"),
        model: text("Model"),
        lens: tags
            .resolve("LensModel")
            .or_else(|| tags.resolve("Lens"))
            .unwrap_or_default()
            .to_string(),
        focal_length: format_focal_length(&text("FocalLength")),
        f_number: format_f_number(&text("FNumber")),
        exposure_time: format_shutter(&text("ExposureTime")),
        iso: format_iso(&text("ISOSpeedRatings")),
        date_time: format_date(&text("DateTimeOriginal")),
    }
}
