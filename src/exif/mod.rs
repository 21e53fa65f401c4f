//! EXIF decoding and normalization.
//!
//! - [`read_tags`] — decode the handful of tags the frame needs into [`RawTags`]
//! - [`normalize`] — turn raw tags into a canonical [`ExifData`] record
//! - [`read_exif`] — both at once, with decode failures mapped to an empty record
//!
//! The per-field formatters are public so edits can be validated with the
//! same rules as the initial parse (see [`ExifData::set`]).

mod format;
mod reader;
mod record;

pub use format::{EMPTY, format_date, format_f_number, format_focal_length, format_iso, format_shutter};
pub use reader::{RawTag, RawTags, read_exif, read_tags};
pub use record::{ExifData, ExifField, normalize};
