//! Backend-agnostic placement data.
//!
//! Layouts produce a [`Scene`]: where every glyph run goes, at what size, and
//! how it is painted. The raster and vector renderers both draw from the same
//! scene, so they cannot drift apart on geometry.

use palette::Srgb;

use crate::brand::{BrandStyle, ColorStop};
use crate::font::GlyphSource;
use crate::text::{GlyphRun, TextStyle, plan_run};

/// Horizontal padding of a gradient box, as a fraction of size.
const GRADIENT_PAD_X_EM: f32 = 0.12;
/// Vertical padding above the ascent line of a gradient box.
const GRADIENT_PAD_Y_EM: f32 = 0.18;
/// Height of a gradient box.
const GRADIENT_BOX_EM: f32 = 1.26;
/// Approximate ascent used to place runs without per-glyph metrics.
pub const ASCENT_EM: f32 = 0.98;
/// Approximate descent, see [`ASCENT_EM`].
pub const DESCENT_EM: f32 = 0.28;

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// How a text run is colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Srgb<u8>),
    /// A linear gradient from the top-left to the bottom-right corner of
    /// `bounds`, clipped to the glyph shapes. Ink outside `bounds` is dropped.
    Gradient {
        stops: &'static [ColorStop],
        bounds: Rect,
    },
}

/// A planned run anchored on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Surface x of the run origin.
    pub x: f32,
    pub baseline: f32,
    pub run: GlyphRun,
    pub stroke_width: f32,
    pub fill: Fill,
}

/// A soft white radial highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

impl Glow {
    /// Alpha at the center; it fades to zero at `radius`.
    pub const CENTER_ALPHA: f32 = 0.06;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneItem {
    Glow(Glow),
    Text(TextItem),
}

/// Everything needed to draw one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub items: Vec<SceneItem>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: SceneItem) {
        self.items.push(item);
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        self.items.iter().filter_map(|item| match item {
            SceneItem::Text(text) => Some(text),
            SceneItem::Glow(_) => None,
        })
    }
}

/// A placed run plus the horizontal space it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawn {
    pub item: TextItem,
    pub width: f32,
}

/// Places `text` in a flat color with its origin at `x`.
///
/// The returned width is the cursor movement, so a following run can start
/// right after it.
pub fn solid_text(
    font: &dyn GlyphSource,
    text: &str,
    x: f32,
    baseline: f32,
    style: &TextStyle,
    color: Srgb<u8>,
) -> Drawn {
    let run = plan_run(font, text, style);
    let width = run.advance;
    Drawn {
        item: TextItem {
            x,
            baseline,
            run,
            stroke_width: style.stroke_width,
            fill: Fill::Solid(color),
        },
        width,
    }
}

/// Places `text` filled with the brand gradient.
///
/// The gradient spans a box hugging the whole run (padded by 12% of size on
/// both sides) so it flows across glyphs instead of repeating per glyph. The
/// box starts at `x`; glyphs start one padding in. The returned width is the
/// box width.
pub fn gradient_text(
    font: &dyn GlyphSource,
    text: &str,
    x: f32,
    baseline: f32,
    style: &TextStyle,
    brand: &BrandStyle,
) -> Drawn {
    let run = plan_run(font, text, style);
    let size = style.size;

    let pad_x = (size * GRADIENT_PAD_X_EM).ceil();
    let pad_y = (size * GRADIENT_PAD_Y_EM).ceil();
    let bounds = Rect::new(
        x,
        baseline - size * ASCENT_EM - pad_y,
        (run.width + pad_x * 2.0).ceil().max(1.0),
        (size * GRADIENT_BOX_EM).ceil().max(1.0),
    );

    Drawn {
        width: bounds.width,
        item: TextItem {
            x: x + pad_x,
            baseline,
            run,
            stroke_width: style.stroke_width,
            fill: Fill::Gradient {
                stops: brand.fill_stops,
                bounds,
            },
        },
    }
}
