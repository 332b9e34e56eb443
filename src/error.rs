use thiserror::Error;

use crate::font::FontError;
use crate::icon::IconError;

/// Failures that can reach the request boundary.
///
/// Bad domains and impossible fits are not errors; they degrade to defaults.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Font(#[from] FontError),

    #[error("failed to allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    #[error("gradient needs at least one color stop")]
    Gradient,

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error(transparent)]
    Icon(#[from] IconError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
