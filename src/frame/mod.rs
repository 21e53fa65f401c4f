//! Frame composition: border, photo and typeset metadata on one canvas.
//!
//! - [`layout`] — every measure of the frame, derived from the photo size
//! - [`color`] — border colours and the text palette chosen from them
//! - [`text`] — glyph layout and blending with `rusttype`
//! - [`brand`] — manufacturer marks rasterized from SVG
//! - [`compose()`] — the renderer tying them together

pub mod brand;
pub mod color;
mod compose;
pub mod layout;
pub mod text;

pub use brand::{BrandMark, mark_for};
pub use color::{BorderColor, Palette};
pub use compose::{FrameStyle, compose};
pub use layout::{Alignment, FrameGeometry};
pub use text::{Anchor, Typeface, Weight};
