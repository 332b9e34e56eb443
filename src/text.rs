//! Styled glyph runs.
//!
//! A run is planned once from a string and a [`TextStyle`]: each character
//! gets its effective size, the glyph actually drawn (upper-cased for
//! synthetic small caps) and its x offset. Measuring and drawing both read
//! the same plan, so they agree on every advance.

use crate::font::{FontWeight, GlyphSource};

/// Advance of a literal space, as a fraction of the run size.
pub const SPACE_ADVANCE_EM: f32 = 0.36;

/// Style of one text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    /// Extra space after each glyph, as a fraction of `size`.
    pub tracking_em: f32,
    /// Draw lowercase letters upper-cased at `size * small_caps_scale`.
    pub small_caps: bool,
    pub small_caps_scale: f32,
    /// Outline stroke drawn under the fill; zero disables it.
    pub stroke_width: f32,
}

impl TextStyle {
    pub fn new(size: f32, weight: FontWeight) -> Self {
        Self {
            size,
            weight,
            tracking_em: 0.0,
            small_caps: false,
            small_caps_scale: 1.0,
            stroke_width: 0.0,
        }
    }

    pub fn tracking(mut self, tracking_em: f32) -> Self {
        self.tracking_em = tracking_em;
        self
    }

    pub fn small_caps(mut self, scale: f32) -> Self {
        self.small_caps = true;
        self.small_caps_scale = scale;
        self
    }

    pub fn stroke(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }

    /// Same style at a different size.
    pub fn at_size(self, size: f32) -> Self {
        Self { size, ..self }
    }

    fn tracking_px(&self) -> f32 {
        self.tracking_em * self.size
    }
}

/// A glyph placed within a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedGlyph {
    /// The character to draw (already upper-cased for small caps).
    pub ch: char,
    /// Effective font size for this glyph.
    pub size: f32,
    /// Offset from the run origin.
    pub x: f32,
}

/// The planned layout of a text run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphRun {
    pub glyphs: Vec<PlannedGlyph>,
    pub weight: FontWeight,
    /// Ink-to-ink width: no tracking after the final glyph.
    pub width: f32,
    /// Cursor movement once the run is drawn, trailing tracking included.
    pub advance: f32,
}

impl GlyphRun {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Plans `text` under `style`.
pub fn plan_run(font: &dyn GlyphSource, text: &str, style: &TextStyle) -> GlyphRun {
    let count = text.chars().count();
    let tracking = style.tracking_px();

    let mut glyphs = Vec::with_capacity(count);
    let mut width = 0.0;
    let mut cursor = 0.0;

    for (i, ch) in text.chars().enumerate() {
        if ch == ' ' {
            let space = style.size * SPACE_ADVANCE_EM;
            width += space;
            cursor += space;
            continue;
        }

        let shrink = style.small_caps && ch.is_ascii_lowercase();
        let size = if shrink {
            style.size * style.small_caps_scale
        } else {
            style.size
        };
        let drawn = if style.small_caps {
            ch.to_ascii_uppercase()
        } else {
            ch
        };

        let glyph_width = font.metrics(drawn, size, style.weight).width;
        glyphs.push(PlannedGlyph {
            ch: drawn,
            size,
            x: cursor,
        });

        width += glyph_width;
        if i + 1 < count {
            width += tracking;
        }
        cursor += glyph_width + tracking;
    }

    GlyphRun {
        glyphs,
        weight: style.weight,
        width,
        advance: cursor,
    }
}

/// Width of `text` under `style` as used for fitting.
pub fn measure_run(font: &dyn GlyphSource, text: &str, style: &TextStyle) -> f32 {
    plan_run(font, text, style).width
}
