//! Manufacturer marks drawn beside the camera name.
//!
//! Marks are small vector badges embedded as SVG and rasterized at the
//! height of the camera line, keeping the aspect ratio of their viewBox.

use image::{Rgba, RgbaImage};
use resvg::usvg;

/// Used when a mark's viewBox is missing or degenerate.
pub const DEFAULT_ASPECT: f32 = 5.0;

/// A vector mark for one manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrandMark {
    pub name: &'static str,
    /// Lowercase substrings of `Make` that select this mark.
    keys: &'static [&'static str],
    pub svg: &'static str,
}

const MARKS: &[BrandMark] = &[
    BrandMark {
        name: "Canon",
        keys: &["canon"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 100"><rect width="500" height="100" rx="18" fill="#cc0000"/><rect x="40" y="44" width="420" height="12" rx="6" fill="#ffffff"/></svg>"##,
    },
    BrandMark {
        name: "Nikon",
        keys: &["nikon"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><rect width="100" height="100" fill="#ffe100"/><path d="M0 70 L70 0 L85 0 L0 85 Z M15 100 L100 15 L100 30 L30 100 Z" fill="#111111"/></svg>"##,
    },
    BrandMark {
        name: "Sony",
        keys: &["sony"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 100"><rect width="500" height="100" rx="10" fill="#111111"/><rect x="30" y="46" width="440" height="8" fill="#f5f5f5"/></svg>"##,
    },
    BrandMark {
        name: "Fujifilm",
        keys: &["fujifilm", "fuji"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 100"><rect width="400" height="100" rx="12" fill="#00a95c"/><rect x="300" y="20" width="60" height="60" fill="#e60012"/></svg>"##,
    },
    BrandMark {
        name: "Leica",
        keys: &["leica"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><circle cx="50" cy="50" r="50" fill="#e20612"/><circle cx="50" cy="50" r="34" fill="none" stroke="#ffffff" stroke-width="6"/></svg>"##,
    },
    BrandMark {
        name: "Panasonic",
        keys: &["panasonic", "lumix"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 100"><rect width="400" height="100" rx="8" fill="#0041c0"/><rect x="24" y="24" width="52" height="52" rx="26" fill="#ffffff"/></svg>"##,
    },
    BrandMark {
        name: "Olympus",
        keys: &["olympus", "om digital", "om system"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 100"><rect width="400" height="100" rx="8" fill="#08107b"/><rect x="20" y="78" width="360" height="8" fill="#d4af37"/></svg>"##,
    },
    BrandMark {
        name: "Ricoh",
        keys: &["ricoh", "pentax"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 100"><rect width="300" height="100" rx="14" fill="#c8102e"/><circle cx="60" cy="50" r="26" fill="#ffffff"/></svg>"##,
    },
    BrandMark {
        name: "Hasselblad",
        keys: &["hasselblad"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><rect width="100" height="100" rx="10" fill="#1a1a1a"/><circle cx="50" cy="50" r="28" fill="none" stroke="#c0c0c0" stroke-width="8"/></svg>"##,
    },
    BrandMark {
        name: "Apple",
        keys: &["apple"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path d="M50 28 C30 10 5 25 10 55 C14 80 30 98 42 94 C48 92 52 92 58 94 C70 98 86 80 90 60 C76 54 74 34 86 26 C76 14 60 18 50 28 Z" fill="#8e8e93"/><path d="M52 22 C52 12 60 4 70 2 C70 12 62 20 52 22 Z" fill="#8e8e93"/></svg>"##,
    },
    BrandMark {
        name: "DJI",
        keys: &["dji"],
        svg: r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 100"><rect width="300" height="100" rx="16" fill="#2b2b2b"/><rect x="120" y="30" width="60" height="40" rx="6" fill="#ffffff"/></svg>"##,
    },
];

/// Find the mark for a manufacturer name; `None` for unknown brands.
pub fn mark_for(brand: &str) -> Option<&'static BrandMark> {
    let brand = brand.trim().to_lowercase();
    if brand.is_empty() {
        return None;
    }
    MARKS
        .iter()
        .find(|mark| mark.keys.iter().any(|key| brand.contains(key)))
}

impl BrandMark {
    fn tree(&self) -> Result<usvg::Tree, String> {
        usvg::Tree::from_data(self.svg.as_bytes(), &usvg::Options::default())
            .map_err(|e| format!("{} mark: {e}", self.name))
    }

    /// Width over height of the mark's viewBox.
    pub fn aspect_ratio(&self) -> f32 {
        self.tree()
            .ok()
            .map(|tree| tree.size().width() / tree.size().height())
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
            .unwrap_or(DEFAULT_ASPECT)
    }

    /// Rasterize to an RGBA image `height` pixels tall.
    pub fn rasterize(&self, height: u32) -> Result<RgbaImage, String> {
        if height == 0 {
            return Err(format!("{} mark: zero height", self.name));
        }
        let tree = self.tree()?;
        let size = tree.size();
        let width = ((height as f32 * self.aspect_ratio()).round() as u32).max(1);

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| format!("{} mark: cannot allocate {width}x{height}", self.name))?;
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha; image expects straight alpha.
        let mut out = RgbaImage::new(width, height);
        for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(out)
    }
}
