//! Error type for loading, composing and exporting framed photos.
//!
//! Metadata problems never show up here: a missing or damaged EXIF block
//! becomes an empty [`ExifData`](crate::exif::ExifData). Only failures that
//! make an export impossible are reported.

use thiserror::Error;

/// Errors from the frame pipeline.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The source image could not be decoded.
    #[error("could not decode image: {0}. Try exporting again or re-saving the photo as JPEG/PNG.")]
    Decode(String),

    /// The composed image could not be encoded.
    #[error("could not encode {format} output: {reason}")]
    Encode { format: &'static str, reason: String },

    /// Reading the photo or writing the result failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A font file was unreadable or not a TrueType/OpenType font.
    #[error("invalid font: {0}")]
    Font(String),

    /// A border colour that is not `#rgb` or `#rrggbb`.
    #[error("invalid colour '{0}': expected #rgb or #rrggbb")]
    Color(String),

    /// The export finished after a different photo was loaded.
    #[error("export discarded: the photo changed while it was rendering")]
    StaleExport,

    /// Export requested with nothing loaded.
    #[error("no photo loaded")]
    NoPhoto,
}

pub type Result<T> = std::result::Result<T, FrameError>;
