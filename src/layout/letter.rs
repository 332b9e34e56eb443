//! The gradient initial letter used as logo, favicon and banner mark.

use crate::brand::BrandStyle;
use crate::font::{FontWeight, GlyphSource};
use crate::scene::{Glow, Rect, SceneItem, gradient_text};
use crate::text::TextStyle;

/// Inset between the box edge and the glyph ink.
pub const LETTER_PADDING: f32 = 2.0;
const MIN_LETTER_SIZE: u32 = 8;
const HEADROOM: f32 = 1.04;
const GLOW_RADIUS: f32 = 0.48;
const FALLBACK_ASCENT_EM: f32 = 0.78;
const FALLBACK_DESCENT_EM: f32 = 0.22;
const GRADIENT_PAD_X_EM: f32 = 0.12;

/// Sizes chosen for a letter glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterFit {
    /// Largest size whose ink fits inside the padded box.
    pub fitted: u32,
    /// `fitted` plus headroom; the size actually drawn.
    pub size: u32,
}

/// Binary-searches the size of `letter` against a `box_w` x `box_h` box.
pub fn fit_letter(font: &dyn GlyphSource, letter: char, box_w: f32, box_h: f32) -> LetterFit {
    let max_w = box_w - LETTER_PADDING * 2.0;
    let max_h = box_h - LETTER_PADDING * 2.0;

    let mut lo = MIN_LETTER_SIZE;
    let mut hi = (box_h * 3.0).max(0.0) as u32;
    let mut fitted = MIN_LETTER_SIZE;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let m = font.metrics(letter, mid as f32, FontWeight::BLACK);
        if m.width <= max_w && m.height() <= max_h {
            fitted = mid;
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }

    LetterFit {
        fitted,
        size: (fitted as f32 * HEADROOM).floor() as u32,
    }
}

/// Lays out the glow and the gradient letter centered in `bounds`.
pub fn letter_glyph(
    font: &dyn GlyphSource,
    bounds: Rect,
    letter: char,
    brand: &BrandStyle,
) -> (Vec<SceneItem>, LetterFit) {
    let glow = Glow {
        cx: bounds.x + bounds.width / 2.0,
        cy: bounds.y + bounds.height / 2.0,
        radius: bounds.width.min(bounds.height) * GLOW_RADIUS,
    };

    let fit = fit_letter(font, letter, bounds.width, bounds.height);
    let size = fit.size as f32;
    let max_w = bounds.width - LETTER_PADDING * 2.0;
    let max_h = bounds.height - LETTER_PADDING * 2.0;

    let m = font.metrics(letter, size, FontWeight::BLACK);
    let ascent = if m.ascent > 0.0 { m.ascent } else { size * FALLBACK_ASCENT_EM };
    let descent = if m.descent > 0.0 { m.descent } else { size * FALLBACK_DESCENT_EM };
    let baseline = bounds.y + LETTER_PADDING + (max_h + ascent - descent) / 2.0;

    let pad_x = (size * GRADIENT_PAD_X_EM).ceil();
    let box_w = m.width + pad_x * 2.0;
    let x = bounds.x + LETTER_PADDING + (max_w - box_w) / 2.0;

    let style = TextStyle::new(size, FontWeight::BLACK);
    let text = letter.to_string();
    let drawn = gradient_text(font, &text, x, baseline, &style, brand);

    (vec![SceneItem::Glow(glow), SceneItem::Text(drawn.item)], fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brand::get_brand;
    use crate::font::BlockFont;
    use crate::scene::Fill;

    #[test]
    fn fitted_letter_stays_inside_padding() {
        for (w, h) in [(16.0, 16.0), (32.0, 32.0), (371.0, 371.0), (1024.0, 1024.0), (300.0, 40.0)] {
            for letter in ['N', 'W', 'I', '7'] {
                let fit = fit_letter(&BlockFont, letter, w, h);
                assert!(fit.fitted >= 8, "{letter} in {w}x{h}");
                let m = BlockFont.metrics(letter, fit.fitted as f32, FontWeight::BLACK);
                assert!(m.width <= w - 4.0 + 1e-3, "{letter} in {w}x{h}");
                assert!(m.height() <= h - 4.0 + 1e-3, "{letter} in {w}x{h}");
                assert_eq!(fit.size, (fit.fitted as f32 * 1.04).floor() as u32);
            }
        }
    }

    #[test]
    fn tiny_box_bottoms_out_at_minimum() {
        let fit = fit_letter(&BlockFont, 'N', 2.0, 2.0);
        assert_eq!(fit.fitted, 8);
        assert_eq!(fit.size, 8);
    }

    #[test]
    fn glyph_is_centered_horizontally() {
        let bounds = Rect::new(0.0, 0.0, 1024.0, 1024.0);
        let (items, fit) = letter_glyph(&BlockFont, bounds, 'N', get_brand(None));
        assert_eq!(items.len(), 2);

        let SceneItem::Glow(glow) = items[0] else {
            panic!("expected glow first");
        };
        assert_eq!((glow.cx, glow.cy), (512.0, 512.0));
        assert!((glow.radius - 491.52).abs() < 1e-2);

        let SceneItem::Text(text) = &items[1] else {
            panic!("expected letter text");
        };
        assert_eq!(text.run.glyphs.len(), 1);
        assert_eq!(text.run.glyphs[0].ch, 'N');
        assert_eq!(text.run.glyphs[0].size, fit.size as f32);

        let ink_left = text.x;
        let ink_right = text.x + text.run.width;
        assert!((ink_left - (1024.0 - ink_right)).abs() < 1.0);
        assert!(matches!(text.fill, Fill::Gradient { .. }));
    }
}
