//! SVG markup output.
//!
//! Glyphs are emitted as outline paths rather than `<text>`, so the markup
//! looks the same in every viewer whether or not it has the fonts installed.

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::brand::{ColorStop, hex};
use crate::error::{Error, Result};
use crate::font::{GlyphSource, PathSegment};
use crate::render::raster::pixmap_to_rgba_image;
use crate::scene::{Fill, Glow, Rect, Scene, SceneItem, TextItem};

// ============================================================================
// Markup
// ============================================================================

/// Serializes `scene` as a standalone SVG document.
pub fn render_svg(font: &dyn GlyphSource, scene: &Scene) -> String {
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = scene.width,
        h = scene.height,
    );

    for (index, item) in scene.items.iter().enumerate() {
        match item {
            SceneItem::Glow(glow) => push_glow(&mut out, index, glow),
            SceneItem::Text(text) => push_text(&mut out, font, index, text),
        }
    }

    out.push_str("</svg>");
    out
}

fn push_glow(out: &mut String, index: usize, glow: &Glow) {
    out.push_str(&format!(
        r##"<defs><radialGradient id="glow{index}" gradientUnits="userSpaceOnUse" cx="{cx}" cy="{cy}" r="{r}"><stop offset="0" stop-color="#FFFFFF" stop-opacity="{a}"/><stop offset="1" stop-color="#FFFFFF" stop-opacity="0"/></radialGradient></defs>"##,
        cx = num(glow.cx),
        cy = num(glow.cy),
        r = num(glow.radius),
        a = num(Glow::CENTER_ALPHA),
    ));
    out.push_str(&format!(
        r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="url(#glow{index})"/>"#,
        cx = num(glow.cx),
        cy = num(glow.cy),
        r = num(glow.radius),
    ));
}

fn push_text(out: &mut String, font: &dyn GlyphSource, index: usize, text: &TextItem) {
    let d = run_path_data(font, text);
    if d.is_empty() {
        return;
    }

    let (paint, clip) = match &text.fill {
        Fill::Solid(color) => (hex(*color), None),
        Fill::Gradient { stops, bounds } => {
            push_gradient_defs(out, index, stops, bounds);
            (format!("url(#fill{index})"), Some(format!("url(#clip{index})")))
        }
    };

    out.push_str(&format!(r#"<path d="{d}" fill="{paint}""#));
    if text.stroke_width > 0.0 {
        out.push_str(&format!(
            r#" stroke="{paint}" stroke-width="{}" stroke-linejoin="round" stroke-miterlimit="2""#,
            num(text.stroke_width)
        ));
    }
    if let Some(clip) = clip {
        out.push_str(&format!(r#" clip-path="{clip}""#));
    }
    out.push_str("/>");
}

fn push_gradient_defs(out: &mut String, index: usize, stops: &[ColorStop], bounds: &Rect) {
    out.push_str(&format!(
        r#"<defs><linearGradient id="fill{index}" gradientUnits="userSpaceOnUse" x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}">"#,
        x1 = num(bounds.x),
        y1 = num(bounds.y),
        x2 = num(bounds.right()),
        y2 = num(bounds.bottom()),
    ));
    for stop in stops {
        out.push_str(&format!(
            r#"<stop offset="{}" stop-color="{}"/>"#,
            num(stop.offset),
            hex(stop.color)
        ));
    }
    out.push_str(&format!(
        r#"</linearGradient><clipPath id="clip{index}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath></defs>"#,
        num(bounds.x),
        num(bounds.y),
        num(bounds.width),
        num(bounds.height),
    ));
}

/// Path data for every inked glyph of a run, in surface coordinates.
fn run_path_data(font: &dyn GlyphSource, text: &TextItem) -> String {
    let mut d = Vec::new();
    for glyph in &text.run.glyphs {
        let Some(outline) = font.outline(glyph.ch, glyph.size, text.run.weight) else {
            continue;
        };
        let ox = text.x + glyph.x;
        let oy = text.baseline;
        let pt = |x: f32, y: f32| format!("{} {}", num(ox + x), num(oy + y));

        for segment in &outline.segments {
            d.push(match *segment {
                PathSegment::MoveTo(x, y) => format!("M{}", pt(x, y)),
                PathSegment::LineTo(x, y) => format!("L{}", pt(x, y)),
                PathSegment::QuadTo(x1, y1, x, y) => format!("Q{} {}", pt(x1, y1), pt(x, y)),
                PathSegment::CubicTo(x1, y1, x2, y2, x, y) => {
                    format!("C{} {} {}", pt(x1, y1), pt(x2, y2), pt(x, y))
                }
                PathSegment::Close => "Z".to_string(),
            });
        }
    }
    d.join("")
}

/// Formats a coordinate with at most two decimals.
fn num(value: f32) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-" | "-0" => "0".to_string(),
        _ => s.to_string(),
    }
}

// ============================================================================
// Rasterization
// ============================================================================

/// Renders SVG markup at its intrinsic size.
pub fn svg_to_image(markup: &str) -> Result<RgbaImage> {
    let tree = Tree::from_str(markup, &Options::default())?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or(Error::Surface {
        width: size.width(),
        height: size.height(),
    })?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use palette::Srgb;

    use super::*;
    use crate::brand::{Theme, get_brand};
    use crate::font::{BlockFont, FontWeight};
    use crate::layout::{Banner, DEFAULT_TAGLINE, compose_banner, compose_logo_only};
    use crate::scene::{gradient_text, solid_text};
    use crate::text::TextStyle;

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(0.123), "0.12");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn document_has_dimensions() {
        let svg = render_svg(&BlockFont, &Scene::new(64, 32));
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="32" viewBox="0 0 64 32">"#
        ));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn solid_run_becomes_a_filled_path() {
        let mut scene = Scene::new(200, 100);
        let style = TextStyle::new(60.0, FontWeight::BLACK).stroke(3.0);
        let color = Srgb::new(0x11, 0x11, 0x11);
        scene.push(SceneItem::Text(solid_text(&BlockFont, "AB", 10.0, 70.0, &style, color).item));

        let svg = render_svg(&BlockFont, &scene);
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains(r##"fill="#111111" stroke="#111111" stroke-width="3""##));
        assert!(!svg.contains("linearGradient"));

        let img = svg_to_image(&svg).unwrap();
        assert_eq!(img.get_pixel(30, 40).0, [0x11, 0x11, 0x11, 255]);
    }

    #[test]
    fn gradient_run_spans_its_box() {
        let mut scene = Scene::new(300, 200);
        let style = TextStyle::new(100.0, FontWeight::BLACK);
        let drawn = gradient_text(&BlockFont, "O", 20.0, 150.0, &style, get_brand(Some("ocean")));
        scene.push(SceneItem::Text(drawn.item));

        let svg = render_svg(&BlockFont, &scene);
        assert!(svg.contains(r#"gradientUnits="userSpaceOnUse" x1="20" y1="34" x2="107" y2="160""#));
        assert!(svg.contains(r##"<stop offset="0.45" stop-color="#3AA0FF"/>"##));
        assert!(svg.contains(r#"clip-path="url(#clip0)""#));

        let img = svg_to_image(&svg).unwrap();
        let inside = img.get_pixel(62, 110).0;
        assert_eq!(inside[3], 255);
        // ocean is blue all the way through
        assert!(inside[2] >= 250);
        assert!(inside[0] < 0x60);
    }

    #[test]
    fn logo_markup_parses_and_matches_raster_size() {
        let scene = compose_logo_only(&BlockFont, 'N', get_brand(None), 128);
        let svg = render_svg(&BlockFont, &scene);
        assert!(svg.contains("radialGradient"));
        let img = svg_to_image(&svg).unwrap();
        assert_eq!(img.dimensions(), (128, 128));
    }

    #[test]
    fn banner_markup_parses() {
        let (scene, _) = compose_banner(
            &BlockFont,
            &Banner {
                domain: "netproxy.io",
                letter: 'N',
                brand: get_brand(None),
                theme: Theme::Dark,
                tagline: DEFAULT_TAGLINE,
            },
        );
        let svg = render_svg(&BlockFont, &scene);
        assert!(svg.contains(r##"fill="#FFFFFF""##));
        assert!(svg.contains(r##"fill="#E5E7FF""##));
        let img = svg_to_image(&svg).unwrap();
        assert_eq!(img.dimensions(), (1466, 371));
    }

    #[test]
    fn invalid_markup_is_an_error() {
        assert!(matches!(svg_to_image("<svg"), Err(Error::Svg(_))));
    }
}
