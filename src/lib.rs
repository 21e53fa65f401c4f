//! # exif-frame
//!
//! Frame photos with their camera metadata: read EXIF, normalize it into
//! display strings, and render the photo on a solid border with the camera,
//! lens, exposure settings and capture date typeset underneath.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_frame::config::Config;
//! use exif_frame::pipeline::{load_photo, render, write_export};
//! use exif_frame::session::Session;
//! use exif_frame::exif::ExifField;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let typeface = config.typeface()?;
//!
//!     let photo = load_photo(Path::new("IMG_0420.jpg"), config.transcoder().as_ref()).await?;
//!
//!     let mut session = Session::new(config.frame_style());
//!     session.load(photo);
//!     session.edit(ExifField::Lens, "RF 50mm F1.2 L USM")?;
//!
//!     let ticket = session.begin_export()?;
//!     let bytes = render(
//!         &ticket.photo.image,
//!         &ticket.exif,
//!         &ticket.style,
//!         &typeface,
//!         config.export_options(),
//!     )
//!     .await?;
//!     let bytes = session.finish_export(&ticket, bytes)?;
//!
//!     let path = write_export(Path::new("."), &ticket.exif.model, config.output.format, &bytes).await?;
//!     println!("Framed: {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use exif_frame::exif::read_exif;
//! use exif_frame::frame::{compose, FrameStyle, Typeface};
//!
//! # fn main() -> anyhow::Result<()> {
//! let bytes = std::fs::read("photo.jpg")?;
//! let exif = read_exif(&bytes);
//! let image = image::load_from_memory(&bytes)?;
//! let framed = compose(&image, &FrameStyle::default(), &exif, &Typeface::embedded()?);
//! framed.save("framed.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Input | Output |
//! |--------|-------|--------|
//! | JPEG (`.jpg`, `.jpeg`) | Yes | Yes (quality 95 by default) |
//! | PNG (`.png`) | Yes | Yes |
//! | WebP (`.webp`) | Yes | No |
//! | HEIC/HEIF (`.heic`, `.heif`) | Via an external converter | No |
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`error`] — The library error type
//! - [`exif`] — EXIF decoding and per-field normalization
//! - [`frame`] — Border, typography and brand marks
//! - [`pipeline`] — Loading, rendering and writing a framed photo
//! - [`session`] — The current photo, its edits and the stale-export guard
//! - [`transcode`] — HEIC conversion seam

pub mod config;
pub mod error;
pub mod exif;
pub mod frame;
pub mod pipeline;
pub mod session;
pub mod transcode;

pub use error::{FrameError, Result};
