//! The single-photo editing session.
//!
//! A session owns the current photo, its (possibly edited) metadata and the
//! frame style. Every load or reset starts a new generation; an export that
//! began under an older generation is discarded when it finishes, so a slow
//! render can never overwrite the result for a newer photo.

use std::sync::Arc;

use crate::error::{FrameError, Result};
use crate::exif::{ExifData, ExifField};
use crate::frame::FrameStyle;
use crate::pipeline::Photo;

/// Snapshot of everything an export needs, bound to the photo it started on.
#[derive(Debug, Clone)]
pub struct ExportTicket {
    generation: u64,
    pub photo: Arc<Photo>,
    pub exif: ExifData,
    pub style: FrameStyle,
}

impl ExportTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    photo: Option<Arc<Photo>>,
    exif: ExifData,
    style: FrameStyle,
}

impl Session {
    pub fn new(style: FrameStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Make `photo` current, replacing any previous one and its edits.
    pub fn load(&mut self, photo: Photo) -> u64 {
        self.generation += 1;
        self.exif = photo.exif.clone();
        log::debug!(
            "Session generation {}: {}",
            self.generation,
            photo.path.display()
        );
        self.photo = Some(Arc::new(photo));
        self.generation
    }

    /// Drop the current photo and its metadata.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.photo = None;
        self.exif = ExifData::default();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_deref()
    }

    pub fn exif(&self) -> &ExifData {
        &self.exif
    }

    pub fn style(&self) -> &FrameStyle {
        &self.style
    }

    /// Replace the style wholesale; it outlives photo changes.
    pub fn set_style(&mut self, style: FrameStyle) {
        self.style = style;
    }

    /// Overwrite one metadata field, canonicalized like the initial parse.
    pub fn edit(&mut self, field: ExifField, value: &str) -> Result<()> {
        if self.photo.is_none() {
            return Err(FrameError::NoPhoto);
        }
        self.exif.set(field, value);
        Ok(())
    }

    /// Snapshot the current photo, metadata and style for rendering.
    pub fn begin_export(&self) -> Result<ExportTicket> {
        let photo = self.photo.clone().ok_or(FrameError::NoPhoto)?;
        Ok(ExportTicket {
            generation: self.generation,
            photo,
            exif: self.exif.clone(),
            style: self.style.clone(),
        })
    }

    /// Accept a finished export only if its photo is still current.
    pub fn finish_export<T>(&self, ticket: &ExportTicket, output: T) -> Result<T> {
        if self.photo.is_none() || ticket.generation != self.generation {
            log::warn!(
                "Discarding export from generation {} (current {})",
                ticket.generation,
                self.generation
            );
            return Err(FrameError::StaleExport);
        }
        Ok(output)
    }
}
