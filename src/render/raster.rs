//! Raster rendering on a tiny-skia pixmap.
//!
//! Flat runs are filled (and optionally stroked) glyph by glyph. Gradient
//! runs are drawn in opaque black into an off-screen layer the size of their
//! gradient box, the gradient is composited over it with `SourceIn` so it only
//! survives where the glyphs are, and the layer is then drawn onto the target.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use palette::Srgb;
use resvg::tiny_skia::{
    self, BlendMode, Color, FillRule, GradientStop, LineJoin, LinearGradient, Paint, Path,
    PathBuilder, Pixmap, PixmapPaint, Point, RadialGradient, SpreadMode, Stroke, Transform,
};

use crate::brand::ColorStop;
use crate::error::{Error, Result};
use crate::font::{GlyphOutline, GlyphSource, PathSegment};
use crate::scene::{Fill, Glow, Scene, SceneItem, TextItem};

// ============================================================================
// Scene rendering
// ============================================================================

/// Draws `scene` onto a fresh transparent pixmap.
pub fn rasterize(font: &dyn GlyphSource, scene: &Scene) -> Result<Pixmap> {
    let mut pixmap = new_pixmap(scene.width, scene.height)?;

    for item in &scene.items {
        match item {
            SceneItem::Glow(glow) => draw_glow(&mut pixmap, glow),
            SceneItem::Text(text) => draw_text(&mut pixmap, font, text)?,
        }
    }

    Ok(pixmap)
}

/// Renders `scene` and encodes it as PNG.
pub fn render_png(font: &dyn GlyphSource, scene: &Scene) -> Result<Vec<u8>> {
    let pixmap = rasterize(font, scene)?;
    encode_png(&pixmap_to_rgba_image(&pixmap))
}

/// Encodes an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or(Error::Surface { width, height })
}

fn color(c: Srgb<u8>) -> Color {
    Color::from_rgba8(c.red, c.green, c.blue, 255)
}

fn gradient_stops(stops: &[ColorStop]) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|s| GradientStop::new(s.offset, color(s.color)))
        .collect()
}

// ============================================================================
// Painting
// ============================================================================

fn draw_glow(pixmap: &mut Pixmap, glow: &Glow) {
    let center = Point::from_xy(glow.cx, glow.cy);
    let stops = vec![
        GradientStop::new(0.0, Color::from_rgba(1.0, 1.0, 1.0, Glow::CENTER_ALPHA).unwrap_or(Color::TRANSPARENT)),
        GradientStop::new(1.0, Color::TRANSPARENT),
    ];
    let Some(shader) = RadialGradient::new(
        center,
        center,
        glow.radius,
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    ) else {
        return;
    };
    let Some(circle) = PathBuilder::from_circle(glow.cx, glow.cy, glow.radius) else {
        return;
    };

    let paint = Paint {
        shader,
        anti_alias: true,
        ..Paint::default()
    };
    pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
}

fn draw_text(pixmap: &mut Pixmap, font: &dyn GlyphSource, text: &TextItem) -> Result<()> {
    match &text.fill {
        Fill::Solid(c) => {
            let mut paint = Paint::default();
            paint.set_color(color(*c));
            paint.anti_alias = true;
            draw_glyphs(pixmap, font, text, &paint, 0.0, 0.0);
        }
        Fill::Gradient { stops, bounds } => {
            let width = bounds.width.ceil().max(1.0) as u32;
            let height = bounds.height.ceil().max(1.0) as u32;
            let mut layer = new_pixmap(width, height)?;

            let mut ink = Paint::default();
            ink.set_color_rgba8(0, 0, 0, 255);
            ink.anti_alias = true;
            draw_glyphs(&mut layer, font, text, &ink, -bounds.x, -bounds.y);

            let shader = LinearGradient::new(
                Point::from_xy(0.0, 0.0),
                Point::from_xy(width as f32, height as f32),
                gradient_stops(stops),
                SpreadMode::Pad,
                Transform::identity(),
            )
            .ok_or(Error::Gradient)?;
            let paint = Paint {
                shader,
                blend_mode: BlendMode::SourceIn,
                anti_alias: true,
                ..Paint::default()
            };
            let rect = tiny_skia::Rect::from_xywh(0.0, 0.0, width as f32, height as f32)
                .ok_or(Error::Surface { width, height })?;
            layer.fill_rect(rect, &paint, Transform::identity(), None);

            pixmap.draw_pixmap(
                0,
                0,
                layer.as_ref(),
                &PixmapPaint::default(),
                Transform::from_translate(bounds.x, bounds.y),
                None,
            );
        }
    }
    Ok(())
}

fn draw_glyphs(
    pixmap: &mut Pixmap,
    font: &dyn GlyphSource,
    text: &TextItem,
    paint: &Paint<'_>,
    dx: f32,
    dy: f32,
) {
    let stroke = (text.stroke_width > 0.0).then(|| Stroke {
        width: text.stroke_width,
        line_join: LineJoin::Round,
        miter_limit: 2.0,
        ..Stroke::default()
    });

    for glyph in &text.run.glyphs {
        let Some(outline) = font.outline(glyph.ch, glyph.size, text.run.weight) else {
            continue;
        };
        let Some(path) = glyph_path(&outline, text.x + glyph.x + dx, text.baseline + dy) else {
            continue;
        };
        if let Some(stroke) = &stroke {
            pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
        }
        pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Builds a tiny-skia path for `outline` with its origin at `(x, baseline)`.
fn glyph_path(outline: &GlyphOutline, x: f32, baseline: f32) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for segment in &outline.segments {
        match *segment {
            PathSegment::MoveTo(px, py) => builder.move_to(x + px, baseline + py),
            PathSegment::LineTo(px, py) => builder.line_to(x + px, baseline + py),
            PathSegment::QuadTo(x1, y1, px, py) => {
                builder.quad_to(x + x1, baseline + y1, x + px, baseline + py);
            }
            PathSegment::CubicTo(x1, y1, x2, y2, px, py) => builder.cubic_to(
                x + x1,
                baseline + y1,
                x + x2,
                baseline + y2,
                x + px,
                baseline + py,
            ),
            PathSegment::Close => builder.close(),
        }
    }
    builder.finish()
}

// ============================================================================
// Conversion
// ============================================================================

/// Converts a tiny-skia pixmap to an `image::RgbaImage`.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        // tiny-skia stores premultiplied alpha
        let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
        *dst = Rgba([r, g, b, a]);
    }

    img
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brand::{Theme, get_brand};
    use crate::font::{BlockFont, FontWeight};
    use crate::layout::{Banner, DEFAULT_TAGLINE, compose_banner, compose_logo_only};
    use crate::scene::{gradient_text, solid_text};
    use crate::text::TextStyle;

    fn opaque_pixels(img: &RgbaImage) -> impl Iterator<Item = &Rgba<u8>> {
        img.pixels().filter(|p| p[3] == 255)
    }

    #[test]
    fn solid_run_paints_its_color() {
        let mut scene = Scene::new(200, 100);
        let style = TextStyle::new(60.0, FontWeight::BLACK);
        let red = Srgb::new(200, 10, 10);
        scene.push(SceneItem::Text(solid_text(&BlockFont, "AB", 10.0, 70.0, &style, red).item));

        let img = pixmap_to_rgba_image(&rasterize(&BlockFont, &scene).unwrap());
        assert_eq!(img.get_pixel(30, 40).0, [200, 10, 10, 255]);
        assert_eq!(img.get_pixel(190, 5).0[3], 0);
    }

    #[test]
    fn gradient_is_clipped_to_glyphs() {
        let mut scene = Scene::new(300, 200);
        let style = TextStyle::new(100.0, FontWeight::BLACK);
        let drawn = gradient_text(&BlockFont, "O", 20.0, 150.0, &style, get_brand(None));
        let Fill::Gradient { bounds, .. } = drawn.item.fill.clone() else {
            panic!("expected gradient");
        };
        scene.push(SceneItem::Text(drawn.item));

        let img = pixmap_to_rgba_image(&rasterize(&BlockFont, &scene).unwrap());

        // padding corner of the box stays transparent
        assert_eq!(img.get_pixel(bounds.x as u32 + 1, bounds.y as u32 + 1).0[3], 0);
        // glyph interior carries a warm gradient color, never the black mask
        let inside = img.get_pixel(20 + 12 + 30, 150 - 40).0;
        assert_eq!(inside[3], 255);
        assert!(inside[0] >= 250);
        assert!(inside[1] > 0x30);
    }

    #[test]
    fn logo_is_painted_with_the_brand_gradient() {
        let scene = compose_logo_only(&BlockFont, 'N', get_brand(None), 256);
        let img = pixmap_to_rgba_image(&rasterize(&BlockFont, &scene).unwrap());
        assert_eq!(img.dimensions(), (256, 256));

        // the visible part of the letter sits in the amber-to-orange band
        let amber = opaque_pixels(&img).any(|p| p[0] >= 250 && (0x78..=0xC4).contains(&p[1]));
        assert!(amber);
        assert!(opaque_pixels(&img).all(|p| p[0] >= 250));
    }

    #[test]
    fn banner_renders_theme_colors() {
        let (scene, result) = compose_banner(
            &BlockFont,
            &Banner {
                domain: "netproxy.io",
                letter: 'N',
                brand: get_brand(Some("aurora")),
                theme: Theme::Light,
                tagline: DEFAULT_TAGLINE,
            },
        );
        let img = pixmap_to_rgba_image(&rasterize(&BlockFont, &scene).unwrap());
        assert_eq!(img.dimensions(), (1466, 371));

        let probe_x = (result.text_x + result.domain_size as f32 * 0.2) as u32;
        let probe_y = (result.domain_baseline - result.domain_size as f32 * 0.3) as u32;
        assert_eq!(img.get_pixel(probe_x, probe_y).0, [0x11, 0x11, 0x11, 255]);
    }

    #[test]
    fn png_has_signature() {
        let scene = Scene::new(4, 4);
        let png = render_png(&BlockFont, &scene).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn zero_sized_scene_is_an_error() {
        let err = rasterize(&BlockFont, &Scene::new(0, 10)).unwrap_err();
        assert!(matches!(err, Error::Surface { width: 0, height: 10 }));
    }

    #[test]
    fn unpremultiply_restores_channels() {
        assert_eq!(unpremultiply(0, 0, 0, 0), (0, 0, 0, 0));
        assert_eq!(unpremultiply(64, 32, 0, 128), (128, 64, 0, 128));
        assert_eq!(unpremultiply(255, 255, 255, 255), (255, 255, 255, 255));
    }

    #[test]
    fn glyph_path_offsets_segments() {
        let outline = GlyphOutline {
            segments: vec![
                PathSegment::MoveTo(0.0, -10.0),
                PathSegment::LineTo(5.0, -10.0),
                PathSegment::LineTo(5.0, 0.0),
                PathSegment::Close,
            ],
        };
        let path = glyph_path(&outline, 100.0, 50.0).unwrap();
        let b = path.bounds();
        assert_eq!((b.left(), b.top(), b.right(), b.bottom()), (100.0, 40.0, 105.0, 50.0));
    }
}
