use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{FrameError, Result};
use crate::exif::{self, ExifData};
use crate::frame::{self, FrameStyle, Typeface};
use crate::transcode::Transcoder;

/// Default JPEG quality for exports.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// ISO-BMFF brands that mark a HEIC/HEIF still image.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// The input formats the loader accepts.
///
/// # Example
///
/// ```rust
/// use exif_frame::pipeline::ImageKind;
/// use std::path::Path;
///
/// assert_eq!(ImageKind::from_path(Path::new("IMG_0001.HEIC")), Some(ImageKind::Heic));
/// assert_eq!(ImageKind::sniff(b"\x89PNG\r\n\x1a\n"), Some(ImageKind::Png));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
    /// HEIC/HEIF: needs a [`Transcoder`] before it can be decoded.
    Heic,
}

impl ImageKind {
    /// Determine the image kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "heic" | "heif" => Some(Self::Heic),
            _ => None,
        }
    }

    /// Determine the image kind from the leading bytes of the file.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::WebP)
        } else if is_heif(bytes) {
            Some(Self::Heic)
        } else {
            None
        }
    }

    /// Extension first, falling back to the file contents.
    pub fn detect(path: &Path, bytes: &[u8]) -> Option<Self> {
        Self::from_path(path).or_else(|| Self::sniff(bytes))
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Heic => "image/heic",
        }
    }
}

/// An `ftyp` box whose major or compatible brands name a HEIF still image.
fn is_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 16 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    let size = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let end = size.clamp(16, bytes.len());
    let major = &bytes[8..12];
    let compatible = bytes[16..end].chunks_exact(4);

    std::iter::once(major)
        .chain(compatible)
        .any(|brand| HEIF_BRANDS.iter().any(|b| brand == b.as_slice()))
}

/// A decoded photo together with the metadata read from its original bytes.
#[derive(Debug, Clone)]
pub struct Photo {
    pub path: PathBuf,
    pub kind: Option<ImageKind>,
    pub image: DynamicImage,
    pub exif: ExifData,
}

/// Read, (optionally) transcode and decode one photo.
///
/// EXIF always comes from the file as stored on disk; a HEIC file is then
/// converted with `transcoder`, falling back to the original bytes if the
/// conversion fails. Decoding runs on a blocking worker.
pub async fn load_photo(path: &Path, transcoder: &dyn Transcoder) -> Result<Photo> {
    let bytes = tokio::fs::read(path).await?;
    let kind = ImageKind::detect(path, &bytes);
    let exif = exif::read_exif(&bytes);
    log::debug!(
        "Read {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        kind.map(|k| k.mime_type()).unwrap_or("unknown type")
    );

    let raster = if kind == Some(ImageKind::Heic) {
        match transcoder.transcode(&bytes).await {
            Ok(converted) => {
                log::info!("Converted HEIC with {}", transcoder.name());
                converted
            }
            Err(e) => {
                log::warn!("HEIC conversion with {} failed, using original bytes: {e:#}", transcoder.name());
                bytes
            }
        }
    } else {
        bytes
    };

    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&raster))
        .await
        .map_err(|e| FrameError::Decode(e.to_string()))?
        .map_err(|e| FrameError::Decode(e.to_string()))?;

    Ok(Photo {
        path: path.to_path_buf(),
        kind,
        image,
        exif,
    })
}

/// Encoded file format of the framed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Encode an RGBA canvas. JPEG drops the alpha channel.
    pub fn encode(&self, image: &RgbaImage, jpeg_quality: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Self::Png => image
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(|e| FrameError::Encode {
                    format: "PNG",
                    reason: e.to_string(),
                })?,
            Self::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, jpeg_quality.clamp(1, 100))
                    .encode_image(&rgb)
                    .map_err(|e| FrameError::Encode {
                        format: "JPEG",
                        reason: e.to_string(),
                    })?
            }
        }
        Ok(buf)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(format!("unknown output format '{other}' (expected png or jpeg)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        })
    }
}

/// Encoding choices for one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: OutputFormat,
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// `frame-<model>-<millis>.<ext>`, with the model lowercased and each run of
/// whitespace or other characters outside `[a-z0-9._-]` replaced by `-`.
/// An empty model gives `frame-<millis>.<ext>`.
///
/// The slug never contains a path separator, so the name stays inside the
/// directory it is joined to.
pub fn export_file_name(model: &str, format: OutputFormat, timestamp_millis: i64) -> String {
    let slug = model
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        format!("frame-{timestamp_millis}.{}", format.extension())
    } else {
        format!("frame-{slug}-{timestamp_millis}.{}", format.extension())
    }
}

/// Compose and encode on a blocking worker.
pub async fn render(
    image: &DynamicImage,
    exif: &ExifData,
    style: &FrameStyle,
    typeface: &Typeface,
    options: ExportOptions,
) -> Result<Vec<u8>> {
    let (image, exif, style, typeface) =
        (image.clone(), exif.clone(), style.clone(), typeface.clone());

    tokio::task::spawn_blocking(move || {
        let framed = frame::compose(&image, &style, &exif, &typeface);
        options.format.encode(&framed, options.jpeg_quality)
    })
    .await
    .map_err(|e| FrameError::Encode {
        format: "frame",
        reason: e.to_string(),
    })?
}

/// Write encoded bytes into `dir` under a fresh export name.
pub async fn write_export(
    dir: &Path,
    model: &str,
    format: OutputFormat,
    bytes: &[u8],
) -> Result<PathBuf> {
    let name = export_file_name(model, format, chrono::Utc::now().timestamp_millis());
    let path = dir.join(name);
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, bytes).await?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::NoTranscoder;
    use image::Rgba;
    use std::fs;
    use tempfile::TempDir;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]));
        OutputFormat::Png.encode(&img, DEFAULT_JPEG_QUALITY).unwrap()
    }

    fn ftyp(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
        let size = 16 + 4 * compatible.len() as u32;
        let mut out = size.to_be_bytes().to_vec();
        out.extend_from_slice(b"ftyp");
        out.extend_from_slice(major);
        out.extend_from_slice(&[0, 0, 0, 0]);
        for brand in compatible {
            out.extend_from_slice(*brand);
        }
        out.extend_from_slice(&[0; 8]);
        out
    }

    /// Hands back a fixed payload, standing in for a real converter.
    struct FixedTranscoder(Vec<u8>);

    #[async_trait::async_trait]
    impl Transcoder for FixedTranscoder {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn transcode(&self, _bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    // ── ImageKind ─────────────────────────────────────────────────────

    #[test]
    fn image_kind_from_extension() {
        assert_eq!(ImageKind::from_path(Path::new("photo.jpg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("PHOTO.JPEG")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("image.png")), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_path(Path::new("image.webp")), Some(ImageKind::WebP));
        assert_eq!(ImageKind::from_path(Path::new("photo.heic")), Some(ImageKind::Heic));
        assert_eq!(ImageKind::from_path(Path::new("photo.HEIF")), Some(ImageKind::Heic));
    }

    #[test]
    fn image_kind_unsupported() {
        assert_eq!(ImageKind::from_path(Path::new("doc.pdf")), None);
        assert_eq!(ImageKind::from_path(Path::new("noext")), None);
        assert_eq!(ImageKind::sniff(b"%PDF-1.7"), None);
        assert_eq!(ImageKind::sniff(b""), None);
    }

    #[test]
    fn sniff_common_signatures() {
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE1]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(&png_bytes(1, 1)), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageKind::WebP));
    }

    #[test]
    fn sniff_heif_brands() {
        assert_eq!(ImageKind::sniff(&ftyp(b"heic", &[])), Some(ImageKind::Heic));
        assert_eq!(ImageKind::sniff(&ftyp(b"mif1", &[b"heic"])), Some(ImageKind::Heic));
        assert_eq!(ImageKind::sniff(&ftyp(b"isom", &[b"mif1"])), Some(ImageKind::Heic));
        // MP4 video shares the box layout but not the brands.
        assert_eq!(ImageKind::sniff(&ftyp(b"isom", &[b"mp41", b"avc1"])), None);
    }

    #[test]
    fn detect_prefers_extension() {
        let png = png_bytes(1, 1);
        assert_eq!(ImageKind::detect(Path::new("a.heic"), &png), Some(ImageKind::Heic));
        assert_eq!(ImageKind::detect(Path::new("upload"), &png), Some(ImageKind::Png));
    }

    // ── load_photo ────────────────────────────────────────────────────

    #[tokio::test]
    async fn load_png_without_exif() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.png");
        fs::write(&path, png_bytes(8, 6)).unwrap();

        let photo = load_photo(&path, &NoTranscoder).await.unwrap();
        assert_eq!((photo.image.width(), photo.image.height()), (8, 6));
        assert_eq!(photo.kind, Some(ImageKind::Png));
        assert!(photo.exif.is_empty());
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_photo(&dir.path().join("gone.jpg"), &NoTranscoder).await.unwrap_err();
        assert!(matches!(err, FrameError::Io(_)));
    }

    #[tokio::test]
    async fn load_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = load_photo(&path, &NoTranscoder).await.unwrap_err();
        assert!(matches!(err, FrameError::Decode(_)));
        assert!(err.to_string().contains("re-saving"));
    }

    #[tokio::test]
    async fn heic_uses_transcoded_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("IMG_0001.HEIC");
        fs::write(&path, ftyp(b"heic", &[b"mif1"])).unwrap();

        let photo = load_photo(&path, &FixedTranscoder(png_bytes(4, 3))).await.unwrap();
        assert_eq!(photo.kind, Some(ImageKind::Heic));
        assert_eq!((photo.image.width(), photo.image.height()), (4, 3));
    }

    #[tokio::test]
    async fn failed_transcode_falls_back_to_original_bytes() {
        let dir = TempDir::new().unwrap();
        // A PNG with a .heic name: conversion fails, the original still decodes.
        let path = dir.path().join("mislabelled.heic");
        fs::write(&path, png_bytes(5, 5)).unwrap();

        let photo = load_photo(&path, &NoTranscoder).await.unwrap();
        assert_eq!(photo.image.width(), 5);
    }

    #[tokio::test]
    async fn non_heic_skips_transcoder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.png");
        fs::write(&path, png_bytes(2, 2)).unwrap();

        // Would produce a 9x9 image if it were consulted.
        let photo = load_photo(&path, &FixedTranscoder(png_bytes(9, 9))).await.unwrap();
        assert_eq!(photo.image.width(), 2);
    }

    // ── OutputFormat ──────────────────────────────────────────────────

    #[test]
    fn output_format_parsing() {
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("JPG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("jpeg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Jpeg.to_string(), "jpeg");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn encode_png_and_jpeg() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([200, 100, 50, 255]));

        let png = OutputFormat::Png.encode(&img, 95).unwrap();
        assert_eq!(ImageKind::sniff(&png), Some(ImageKind::Png));

        let jpeg = OutputFormat::Jpeg.encode(&img, 95).unwrap();
        assert_eq!(ImageKind::sniff(&jpeg), Some(ImageKind::Jpeg));
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    // ── export naming ─────────────────────────────────────────────────

    #[test]
    fn export_name_slugs_model() {
        assert_eq!(
            export_file_name("Canon EOS R5", OutputFormat::Png, 1700000000000),
            "frame-canon-eos-r5-1700000000000.png"
        );
        assert_eq!(
            export_file_name("  ILCE-7M4\t II ", OutputFormat::Jpeg, 42),
            "frame-ilce-7m4-ii-42.jpg"
        );
    }

    #[test]
    fn export_name_replaces_path_characters() {
        assert_eq!(
            export_file_name("EOS 5D/Mark IV", OutputFormat::Png, 1),
            "frame-eos-5d-mark-iv-1.png"
        );
        assert_eq!(
            export_file_name("../../escaped", OutputFormat::Png, 1),
            "frame-..-..-escaped-1.png"
        );
        assert_eq!(
            export_file_name("C:\\Cam\\X", OutputFormat::Jpeg, 1),
            "frame-c-cam-x-1.jpg"
        );
        assert_eq!(export_file_name("Å/", OutputFormat::Png, 1), "frame-1.png");
    }

    #[tokio::test]
    async fn write_export_stays_in_output_dir() {
        let dir = TempDir::new().unwrap();
        for model in ["EOS 5D/Mark IV", "../../escaped", "/etc/passwd"] {
            let path = write_export(dir.path(), model, OutputFormat::Png, b"x").await.unwrap();
            assert_eq!(path.parent(), Some(dir.path()), "{model} escaped");
            assert_eq!(fs::read(&path).unwrap(), b"x");
        }
    }

    #[test]
    fn export_name_without_model() {
        assert_eq!(export_file_name("", OutputFormat::Png, 7), "frame-7.png");
        assert_eq!(export_file_name("   ", OutputFormat::Jpeg, 7), "frame-7.jpg");
    }

    // ── render / write ────────────────────────────────────────────────

    #[tokio::test]
    async fn render_and_write_export() {
        let dir = TempDir::new().unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, Rgba([1, 2, 3, 255])));
        let exif = ExifData {
            model: "X100V".into(),
            ..ExifData::default()
        };
        let typeface = Typeface::embedded().unwrap();

        let bytes = render(&image, &exif, &FrameStyle::default(), &typeface, ExportOptions::default())
            .await
            .unwrap();
        let framed = image::load_from_memory(&bytes).unwrap();
        assert_eq!((framed.width(), framed.height()), (108, 50 + 4 + 14));

        let out_dir = dir.path().join("exports");
        let path = write_export(&out_dir, &exif.model, OutputFormat::Png, &bytes).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("frame-x100v-"));
        assert!(name.ends_with(".png"));
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
