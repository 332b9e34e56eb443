//! Text measurement and glyph outlines.
//!
//! The layout code never touches font files directly. It asks a
//! [`GlyphSource`] for two things: how big a character is at a given size
//! and weight, and what its outline looks like. [`registry::FontRegistry`]
//! answers from real TrueType/OpenType faces; tests use a block font.

pub mod registry;

pub use registry::{FontError, FontRegistry};

use serde::{Deserialize, Serialize};

/// CSS-style numeric font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const REGULAR: Self = Self(400);
    pub const BLACK: Self = Self(900);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::REGULAR
    }
}

/// Horizontal advance and ink extents of a single glyph, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    /// Advance width.
    pub width: f32,
    /// Distance from the baseline to the top of the ink (positive up).
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the ink (positive down).
    pub descent: f32,
}

impl GlyphMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// One outline command. Coordinates are pixels relative to the glyph origin
/// on the baseline, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32),
    CubicTo(f32, f32, f32, f32, f32, f32),
    Close,
}

/// A scaled glyph outline ready to be placed on a surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    pub segments: Vec<PathSegment>,
}

impl GlyphOutline {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Measuring and outlining capability consumed by layout and renderers.
///
/// Implementations must be pure: the same query always returns the same
/// answer, so a source can be shared by concurrent renders.
pub trait GlyphSource: Send + Sync {
    fn metrics(&self, ch: char, size: f32, weight: FontWeight) -> GlyphMetrics;

    /// Returns `None` for glyphs without ink (spaces) or unknown characters.
    fn outline(&self, ch: char, size: f32, weight: FontWeight) -> Option<GlyphOutline>;
}

/// Deterministic stand-in font: every glyph is a filled rectangle.
///
/// Advance is `0.6 * size` (`0.9 * size` for `M`/`W`), ink rises `0.72 * size`
/// above the baseline and drops `0.2 * size` below it. Weight widens glyphs
/// by 5% at 900.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BlockFont;

#[cfg(test)]
impl BlockFont {
    fn advance_em(ch: char, weight: FontWeight) -> f32 {
        let base = match ch {
            'M' | 'W' | 'm' | 'w' => 0.9,
            '.' | 'i' | 'I' | 'l' => 0.3,
            _ => 0.6,
        };
        if weight >= FontWeight::BLACK { base * 1.05 } else { base }
    }
}

#[cfg(test)]
impl GlyphSource for BlockFont {
    fn metrics(&self, ch: char, size: f32, weight: FontWeight) -> GlyphMetrics {
        if ch == ' ' {
            return GlyphMetrics {
                width: 0.25 * size,
                ..GlyphMetrics::default()
            };
        }
        GlyphMetrics {
            width: Self::advance_em(ch, weight) * size,
            ascent: 0.72 * size,
            descent: 0.2 * size,
        }
    }

    fn outline(&self, ch: char, size: f32, weight: FontWeight) -> Option<GlyphOutline> {
        if ch.is_whitespace() {
            return None;
        }
        let m = self.metrics(ch, size, weight);
        let inset = m.width * 0.05;
        Some(GlyphOutline {
            segments: vec![
                PathSegment::MoveTo(inset, -m.ascent),
                PathSegment::LineTo(m.width - inset, -m.ascent),
                PathSegment::LineTo(m.width - inset, m.descent),
                PathSegment::LineTo(inset, m.descent),
                PathSegment::Close,
            ],
        })
    }
}

/// A source whose measurements are unusable, like a broken backend.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BrokenFont;

#[cfg(test)]
impl GlyphSource for BrokenFont {
    fn metrics(&self, _ch: char, _size: f32, _weight: FontWeight) -> GlyphMetrics {
        GlyphMetrics {
            width: f32::NAN,
            ascent: 0.0,
            descent: 0.0,
        }
    }

    fn outline(&self, _ch: char, _size: f32, _weight: FontWeight) -> Option<GlyphOutline> {
        None
    }
}
