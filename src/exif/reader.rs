use anyhow::{Context, Result};
use exif::{In, Reader, Tag, Value};
use std::collections::BTreeMap;
use std::io::Cursor;

use super::record::{ExifData, normalize};

/// Generic `Lens` tag (Exif IFD). Older bodies write this instead of `LensModel`.
const TAG_LENS: Tag = Tag(exif::Context::Exif, 0xFDEA);

/// Tags the normalizer reads, keyed by the names it asks for.
const WANTED_TAGS: &[(&str, Tag)] = &[
    ("Make", Tag::Make),
    ("Model", Tag::Model),
    ("LensModel", Tag::LensModel),
    ("Lens", TAG_LENS),
    ("FocalLength", Tag::FocalLength),
    ("FNumber", Tag::FNumber),
    ("ExposureTime", Tag::ExposureTime),
    ("ISOSpeedRatings", Tag::PhotographicSensitivity),
    ("DateTimeOriginal", Tag::DateTimeOriginal),
];

/// One decoded tag: a human-readable rendering and/or the raw value as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTag {
    pub description: Option<String>,
    pub value: Option<String>,
}

impl RawTag {
    pub fn new(description: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            value: Some(value.into()),
        }
    }

    /// A tag that only carries a raw value.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            description: None,
            value: Some(value.into()),
        }
    }

    /// The description if present and non-empty, else the value.
    pub fn resolve(&self) -> Option<&str> {
        non_empty(self.description.as_deref()).or_else(|| non_empty(self.value.as_deref()))
    }
}

/// Tag name → decoded tag, as produced by [`read_tags`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTags {
    tags: BTreeMap<String, RawTag>,
}

impl RawTags {
    pub fn insert(&mut self, name: impl Into<String>, tag: RawTag) {
        self.tags.insert(name.into(), tag);
    }

    pub fn get(&self, name: &str) -> Option<&RawTag> {
        self.tags.get(name)
    }

    /// Resolved text for a tag, or `None` if the tag is absent or blank.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.tags.get(name).and_then(RawTag::resolve)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawTag)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Decode the tags the normalizer needs from an image file's bytes.
///
/// Works on JPEG, PNG, WebP, TIFF and HEIF containers. ASCII fields are
/// reported through `value` only, so dates keep their `YYYY:MM:DD` shape;
/// numeric fields carry the rendered value as `description` and the first
/// raw component as `value`.
pub fn read_tags(bytes: &[u8]) -> Result<RawTags> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .context("Failed to decode EXIF")?;

    let mut tags = RawTags::default();
    for (name, tag) in WANTED_TAGS {
        if let Some(field) = exif.get_field(*tag, In::PRIMARY) {
            let raw = field_to_raw(field);
            if raw.resolve().is_some() {
                tags.insert(*name, raw);
            }
        }
    }

    log::debug!("Decoded {} EXIF tag(s)", tags.len());
    Ok(tags)
}

/// Decode and normalize in one step.
///
/// Metadata is optional: files without EXIF, or with a damaged block,
/// produce an all-empty record rather than an error.
pub fn read_exif(bytes: &[u8]) -> ExifData {
    match read_tags(bytes) {
        Ok(tags) => normalize(&tags),
        Err(e) => {
            log::debug!("No usable EXIF data: {e:#}");
            ExifData::default()
        }
    }
}

fn field_to_raw(field: &exif::Field) -> RawTag {
    match field.value {
        Value::Ascii(ref parts) => {
            let text = parts
                .iter()
                .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').trim().to_string())
                .find(|s| !s.is_empty());
            RawTag {
                description: None,
                value: text,
            }
        }
        Value::Rational(ref v) => RawTag {
            description: Some(field.display_value().to_string()),
            value: v.first().map(|r| format!("{}/{}", r.num, r.denom)),
        },
        Value::SRational(ref v) => RawTag {
            description: Some(field.display_value().to_string()),
            value: v.first().map(|r| format!("{}/{}", r.num, r.denom)),
        },
        _ => RawTag {
            description: Some(field.display_value().to_string()),
            value: field.value.get_uint(0).map(|n| n.to_string()),
        },
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── RawTag::resolve ──────────────────────────────────────────────

    #[test]
    fn resolve_prefers_description() {
        let tag = RawTag::new("1/200", "5/1000");
        assert_eq!(tag.resolve(), Some("1/200"));
    }

    #[test]
    fn resolve_falls_back_to_value() {
        assert_eq!(RawTag::value("Canon").resolve(), Some("Canon"));

        let blank_description = RawTag::new("  ", "50/1");
        assert_eq!(blank_description.resolve(), Some("50/1"));
    }

    #[test]
    fn resolve_empty_tag_is_none() {
        assert_eq!(RawTag::default().resolve(), None);
        assert_eq!(RawTag::new("", "").resolve(), None);
    }

    #[test]
    fn raw_tags_lookup() {
        let mut tags = RawTags::default();
        assert!(tags.is_empty());
        tags.insert("Make", RawTag::value("FUJIFILM"));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.resolve("Make"), Some("FUJIFILM"));
        assert_eq!(tags.resolve("Model"), None);
        assert!(tags.get("Make").is_some());
        assert_eq!(tags.iter().count(), 1);
    }

    // ── decoding ─────────────────────────────────────────────────────

    #[test]
    fn read_tags_rejects_non_image_bytes() {
        assert!(read_tags(b"definitely not an image").is_err());
    }

    #[test]
    fn read_exif_without_metadata_is_empty() {
        // A PNG produced by the image crate carries no eXIf chunk.
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        assert!(read_exif(&png).is_empty());
        assert!(read_exif(&[]).is_empty());
    }

    fn ascii(tag: Tag, text: &str) -> exif::Field {
        exif::Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text.as_bytes().to_vec()]),
        }
    }

    fn rational(tag: Tag, num: u32, denom: u32) -> exif::Field {
        exif::Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![exif::Rational { num, denom }]),
        }
    }

    /// A bare TIFF carrying the tags a camera would write.
    fn camera_tiff(lens: exif::Field) -> Vec<u8> {
        let fields = [
            ascii(Tag::Make, "Canon"),
            ascii(Tag::Model, "Canon EOS R5"),
            lens,
            rational(Tag::FocalLength, 235, 10),
            rational(Tag::FNumber, 18, 10),
            rational(Tag::ExposureTime, 10, 2000),
            exif::Field {
                tag: Tag::PhotographicSensitivity,
                ifd_num: In::PRIMARY,
                value: Value::Short(vec![400]),
            },
            ascii(Tag::DateTimeOriginal, "2024:05:01 12:30:00"),
        ];

        let mut writer = exif::experimental::Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, false).unwrap();
        buf.into_inner()
    }

    #[test]
    fn read_tags_splits_text_and_numbers() {
        let tags = read_tags(&camera_tiff(ascii(Tag::LensModel, "RF24-70mm F2.8 L IS USM"))).unwrap();

        let date = tags.get("DateTimeOriginal").unwrap();
        assert_eq!(date.description, None);
        assert_eq!(date.value.as_deref(), Some("2024:05:01 12:30:00"));

        let exposure = tags.get("ExposureTime").unwrap();
        assert!(exposure.description.is_some());
        assert_eq!(exposure.value.as_deref(), Some("10/2000"));

        let iso = tags.get("ISOSpeedRatings").unwrap();
        assert_eq!(iso.value.as_deref(), Some("400"));
        assert!(tags.get("Lens").is_none());
    }

    #[test]
    fn read_exif_normalizes_camera_tags() {
        let data = read_exif(&camera_tiff(ascii(Tag::LensModel, "RF24-70mm F2.8 L IS USM")));
        assert_eq!(data.make, "Canon");
        assert_eq!(data.model, "Canon EOS R5");
        assert_eq!(data.lens, "RF24-70mm F2.8 L IS USM");
        assert_eq!(data.focal_length, "24mm");
        assert_eq!(data.f_number, "f/1.8");
        assert_eq!(data.exposure_time, "1/200s");
        assert_eq!(data.iso, "ISO 400");
        assert_eq!(data.date_time, "2024.05.01");
    }

    #[test]
    fn generic_lens_tag_fills_lens() {
        let data = read_exif(&camera_tiff(ascii(TAG_LENS, "XF23mmF1.4 R")));
        assert_eq!(data.lens, "XF23mmF1.4 R");
    }
}
