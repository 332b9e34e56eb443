//! Renderers that turn a [`Scene`] into image bytes.

pub mod raster;
pub mod svg;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::font::GlyphSource;
use crate::scene::Scene;

pub use raster::{encode_png, pixmap_to_rgba_image, rasterize, render_png};
pub use svg::{render_svg, svg_to_image};

/// Encoding of a rendered scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    /// Parses a query value or file extension; anything unknown is PNG.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(p) if p.eq_ignore_ascii_case("svg") => Self::Svg,
            _ => Self::Png,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Renders `scene` in the requested format.
pub fn render_scene(font: &dyn GlyphSource, scene: &Scene, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Png => render_png(font, scene),
        OutputFormat::Svg => Ok(render_svg(font, scene).into_bytes()),
    }
}
