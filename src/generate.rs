//! Request-level pipeline: domain in, encoded image out.
//!
//! [`Generator`] ties the pieces together for one request. It normalizes the
//! host, resolves brand and theme, composes the scene and encodes it. Each
//! call builds its own surfaces, so a generator can serve concurrent requests.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brand::{Theme, get_brand};
use crate::domain::{first_letter_of_domain, root_domain};
use crate::error::Result;
use crate::font::GlyphSource;
use crate::icon::{FAVICON_SIZES, IconEntry, build_icon_file};
use crate::layout::{
    Banner, DEFAULT_FAVICON_SIZE, DEFAULT_LOGO_SIZE, LayoutResult, compose_banner,
    compose_favicon, compose_logo_only,
};
use crate::render::{OutputFormat, render_png, render_scene};

pub const MIN_LOGO_SIZE: u32 = 64;
pub const MAX_LOGO_SIZE: u32 = 2048;
pub const ICON_CONTENT_TYPE: &str = "image/x-icon";

/// What to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ImageKind {
    /// Letter mark plus domain and tagline on the wide canvas.
    Banner,
    /// The letter mark alone on a square canvas.
    Logo { size: u32 },
    /// A single small letter mark.
    Favicon { size: u32 },
    /// Every favicon size packed into one `.ico` file. Always PNG inside.
    IconFile,
}

impl ImageKind {
    pub fn logo() -> Self {
        Self::Logo {
            size: DEFAULT_LOGO_SIZE,
        }
    }

    pub fn favicon() -> Self {
        Self::Favicon {
            size: DEFAULT_FAVICON_SIZE,
        }
    }
}

/// One image request after query parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenRequest {
    /// Raw domain or host; normalized by the generator.
    pub host: String,
    pub kind: ImageKind,
    pub format: OutputFormat,
    /// Brand name; unknown names fall back to the default brand.
    pub style: Option<String>,
    pub theme: Theme,
}

impl GenRequest {
    pub fn new(host: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            host: host.into(),
            kind,
            format: OutputFormat::Png,
            style: None,
            theme: Theme::Light,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_style(mut self, style: Option<impl Into<String>>) -> Self {
        self.style = style.map(Into::into);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// Encoded output of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// Chosen sizes, for banners only.
    pub layout: Option<LayoutResult>,
}

/// Parses a logo size parameter.
///
/// Missing, unparsable or zero values mean the default size; everything else
/// is clamped to the supported range.
pub fn parse_size(param: Option<&str>) -> u32 {
    match param.and_then(|p| p.trim().parse::<i64>().ok()) {
        None | Some(0) => DEFAULT_LOGO_SIZE,
        Some(n) => n.clamp(MIN_LOGO_SIZE as i64, MAX_LOGO_SIZE as i64) as u32,
    }
}

/// Renders requests against one glyph source.
#[derive(Clone, Copy)]
pub struct Generator<'a> {
    font: &'a dyn GlyphSource,
    tagline: &'a str,
}

impl<'a> Generator<'a> {
    pub fn new(font: &'a dyn GlyphSource, tagline: &'a str) -> Self {
        Self { font, tagline }
    }

    pub fn generate(&self, request: &GenRequest) -> Result<Generated> {
        let domain = root_domain(&request.host);
        let letter = first_letter_of_domain(&domain);
        let brand = get_brand(request.style.as_deref());
        debug!(
            host = %request.host,
            %domain,
            %letter,
            brand = brand.brand.name(),
            kind = ?request.kind,
            format = ?request.format,
            "Generating image"
        );

        let (scene, layout) = match request.kind {
            ImageKind::Banner => {
                let banner = Banner {
                    domain: &domain,
                    letter,
                    brand,
                    theme: request.theme,
                    tagline: self.tagline,
                };
                let (scene, layout) = compose_banner(self.font, &banner);
                (scene, Some(layout))
            }
            ImageKind::Logo { size } => (compose_logo_only(self.font, letter, brand, size), None),
            ImageKind::Favicon { size } => (compose_favicon(self.font, letter, brand, size), None),
            ImageKind::IconFile => {
                let mut entries = Vec::with_capacity(FAVICON_SIZES.len());
                for size in FAVICON_SIZES {
                    let scene = compose_favicon(self.font, letter, brand, size);
                    entries.push(IconEntry::new(size, render_png(self.font, &scene)?));
                }
                return Ok(Generated {
                    bytes: build_icon_file(&entries)?,
                    content_type: ICON_CONTENT_TYPE,
                    layout: None,
                });
            }
        };

        Ok(Generated {
            bytes: render_scene(self.font, &scene, request.format)?,
            content_type: request.format.content_type(),
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brand::Brand;
    use crate::font::BlockFont;
    use crate::layout::DEFAULT_TAGLINE;
    use crate::render::svg_to_image;

    fn generator() -> Generator<'static> {
        Generator::new(&BlockFont, DEFAULT_TAGLINE)
    }

    fn decode(bytes: &[u8]) -> image::RgbaImage {
        image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8()
    }

    #[test]
    fn size_parameter() {
        assert_eq!(parse_size(None), 1024);
        assert_eq!(parse_size(Some("abc")), 1024);
        assert_eq!(parse_size(Some("0")), 1024);
        assert_eq!(parse_size(Some("10")), 64);
        assert_eq!(parse_size(Some("-4")), 64);
        assert_eq!(parse_size(Some(" 300 ")), 300);
        assert_eq!(parse_size(Some("99999")), 2048);
    }

    #[test]
    fn only_logo_is_square_png() {
        let request = GenRequest::new("netproxy.io", ImageKind::Logo { size: 128 });
        let out = generator().generate(&request).unwrap();
        assert_eq!(out.content_type, "image/png");
        assert!(out.layout.is_none());

        let img = decode(&out.bytes);
        assert_eq!(img.dimensions(), (128, 128));
        // netproxy stops are all full red
        assert!(img.pixels().filter(|p| p[3] == 255).all(|p| p[0] >= 250));
        assert!(img.pixels().any(|p| p[3] == 255));
    }

    #[test]
    fn banner_reports_layout() {
        let request = GenRequest::new("https://www.netproxy.io/pricing", ImageKind::Banner)
            .with_theme(Theme::Dark)
            .with_style(Some("ocean"));
        let out = generator().generate(&request).unwrap();
        let layout = out.layout.unwrap();
        assert_eq!(layout.policy.min_size, 110);
        assert_eq!(decode(&out.bytes).dimensions(), (1466, 371));
    }

    #[test]
    fn svg_output() {
        let request = GenRequest::new("netproxy.io", ImageKind::Banner).with_format(OutputFormat::Svg);
        let out = generator().generate(&request).unwrap();
        assert_eq!(out.content_type, "image/svg+xml; charset=utf-8");
        let markup = String::from_utf8(out.bytes).unwrap();
        assert_eq!(svg_to_image(&markup).unwrap().dimensions(), (1466, 371));
    }

    #[test]
    fn unknown_style_uses_default_brand() {
        let unknown = GenRequest::new("netproxy.io", ImageKind::favicon())
            .with_format(OutputFormat::Svg)
            .with_style(Some("neon"));
        let default = unknown.clone().with_style(None::<String>);
        let a = generator().generate(&unknown).unwrap();
        let b = generator().generate(&default).unwrap();
        assert_eq!(a.bytes, b.bytes);

        let netproxy_first = crate::brand::hex(Brand::Netproxy.style().first_color());
        assert!(String::from_utf8(a.bytes).unwrap().contains(&netproxy_first));
    }

    #[test]
    fn icon_file_packs_every_favicon_size() {
        let out = generator()
            .generate(&GenRequest::new("netproxy.io", ImageKind::IconFile).with_format(OutputFormat::Svg))
            .unwrap();
        assert_eq!(out.content_type, "image/x-icon");
        let ico = out.bytes;
        assert_eq!(u16::from_le_bytes([ico[4], ico[5]]) as usize, FAVICON_SIZES.len());

        for (i, size) in FAVICON_SIZES.into_iter().enumerate() {
            let dir = 6 + 16 * i;
            let len = u32::from_le_bytes(ico[dir + 8..dir + 12].try_into().unwrap()) as usize;
            let offset = u32::from_le_bytes(ico[dir + 12..dir + 16].try_into().unwrap()) as usize;
            let img = decode(&ico[offset..offset + len]);
            assert_eq!(img.dimensions(), (size, size));
        }
    }

    #[test]
    fn empty_host_falls_back_to_localhost() {
        let request = GenRequest::new("   ", ImageKind::favicon()).with_format(OutputFormat::Svg);
        let out = generator().generate(&request).unwrap();
        assert!(String::from_utf8(out.bytes).unwrap().starts_with("<svg"));
    }
}
