//! Brand palettes and theme colors.

use palette::Srgb;
use serde::{Deserialize, Serialize};

/// One stop of a brand gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient, in `[0, 1]`.
    pub offset: f32,
    pub color: Srgb<u8>,
}

impl ColorStop {
    pub const fn new(offset: f32, color: Srgb<u8>) -> Self {
        Self { offset, color }
    }
}

/// A named gradient used for the letter glyph and the domain suffix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrandStyle {
    pub brand: Brand,
    pub fill_stops: &'static [ColorStop],
}

impl BrandStyle {
    /// Color at offset 0.
    pub fn first_color(&self) -> Srgb<u8> {
        self.fill_stops[0].color
    }
}

/// The known brand palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    #[default]
    Netproxy,
    Aurora,
    Ocean,
    Candy,
}

impl Brand {
    pub const ALL: [Brand; 4] = [Brand::Netproxy, Brand::Aurora, Brand::Ocean, Brand::Candy];

    /// Case-insensitive lookup. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Brand::Netproxy => "netproxy",
            Brand::Aurora => "aurora",
            Brand::Ocean => "ocean",
            Brand::Candy => "candy",
        }
    }

    pub fn style(self) -> &'static BrandStyle {
        match self {
            Brand::Netproxy => &NETPROXY,
            Brand::Aurora => &AURORA,
            Brand::Ocean => &OCEAN,
            Brand::Candy => &CANDY,
        }
    }
}

static NETPROXY: BrandStyle = BrandStyle {
    brand: Brand::Netproxy,
    fill_stops: &[
        ColorStop::new(0.0, Srgb::new(0xFF, 0xF1, 0xA6)),
        ColorStop::new(0.22, Srgb::new(0xFF, 0xC4, 0x58)),
        ColorStop::new(0.55, Srgb::new(0xFF, 0x78, 0x1F)),
        ColorStop::new(1.0, Srgb::new(0xFF, 0x3A, 0x1F)),
    ],
};

static AURORA: BrandStyle = BrandStyle {
    brand: Brand::Aurora,
    fill_stops: &[
        ColorStop::new(0.0, Srgb::new(0x5C, 0xF1, 0xE2)),
        ColorStop::new(0.3, Srgb::new(0x59, 0xC8, 0xF9)),
        ColorStop::new(0.6, Srgb::new(0x7D, 0x86, 0xFF)),
        ColorStop::new(1.0, Srgb::new(0x97, 0x57, 0xF6)),
    ],
};

static OCEAN: BrandStyle = BrandStyle {
    brand: Brand::Ocean,
    fill_stops: &[
        ColorStop::new(0.0, Srgb::new(0x4E, 0xD0, 0xFF)),
        ColorStop::new(0.45, Srgb::new(0x3A, 0xA0, 0xFF)),
        ColorStop::new(1.0, Srgb::new(0x2B, 0x66, 0xFF)),
    ],
};

static CANDY: BrandStyle = BrandStyle {
    brand: Brand::Candy,
    fill_stops: &[
        ColorStop::new(0.0, Srgb::new(0xFF, 0x6F, 0xD8)),
        ColorStop::new(0.5, Srgb::new(0xFF, 0x8C, 0x6F)),
        ColorStop::new(1.0, Srgb::new(0xFF, 0xCA, 0x5C)),
    ],
};

/// Resolves a style parameter, falling back to `netproxy`.
pub fn get_brand(name: Option<&str>) -> &'static BrandStyle {
    name.and_then(Brand::from_name).unwrap_or_default().style()
}

/// Light or dark rendering of the wordmark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Anything other than `dark` (any case) is light.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn colors(self) -> TextColors {
        match self {
            Theme::Light => TextColors {
                main: Srgb::new(0x11, 0x11, 0x11),
                sub: Srgb::new(0x4B, 0x55, 0x63),
            },
            Theme::Dark => TextColors {
                main: Srgb::new(0xFF, 0xFF, 0xFF),
                sub: Srgb::new(0xE5, 0xE7, 0xFF),
            },
        }
    }
}

/// Flat colors for the main label and the subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextColors {
    pub main: Srgb<u8>,
    pub sub: Srgb<u8>,
}

/// `#RRGGBB` for markup output.
pub fn hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}
