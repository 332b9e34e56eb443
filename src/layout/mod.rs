//! Banner, logo and favicon composition.
//!
//! Everything here is pure geometry: sizes come from the fit engine, positions
//! from fixed ratios, and the result is a [`Scene`] that any renderer can draw.

pub mod letter;

pub use letter::{LetterFit, fit_letter, letter_glyph};

use serde::Serialize;
use tracing::debug;

use crate::brand::{BrandStyle, Theme};
use crate::domain::{sld_label, split_domain_for_gradient};
use crate::fit::fit_to_width;
use crate::font::{FontWeight, GlyphSource};
use crate::scene::{ASCENT_EM, DESCENT_EM, Rect, Scene, SceneItem, gradient_text, solid_text};
use crate::text::{TextStyle, measure_run};

pub const BANNER_WIDTH: u32 = 1466;
pub const BANNER_HEIGHT: u32 = 371;
pub const DEFAULT_LOGO_SIZE: u32 = 1024;
pub const DEFAULT_FAVICON_SIZE: u32 = 64;
pub const DEFAULT_TAGLINE: &str = "PROXY RESIDENTIAL P2P";

const PAD_LEFT: f32 = 16.0;
const PAD_RIGHT: f32 = 24.0;
const GAP_AFTER_GLYPH: f32 = 36.0;
const FIT_MARGIN: f32 = 0.998;
const MAX_DOMAIN_HEIGHT: f32 = 0.44;
const SMALL_CAPS_SCALE: f32 = 0.9;
const DOMAIN_STROKE: f32 = 3.0;
const LINE_GAP: f32 = 20.0;

const SUB_TRACKING: f32 = 0.055;
const SUB_RATIO: f32 = 0.92;
const SUB_MIN: u32 = 52;
const SUB_MAX: u32 = 260;
const SUB_FLOOR: u32 = 32;
const SUB_STEP: u32 = 2;
const SUB_BASELINE_EM: f32 = 0.9;

/// Tracking and size bounds for the domain line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DomainLayout {
    pub tracking_em: f32,
    pub min_size: u32,
    pub max_size: u32,
}

/// Picks the domain line policy from the length of the second-level label.
pub fn domain_layout(domain: &str) -> DomainLayout {
    let len = sld_label(domain).chars().count();
    let (tracking_em, min_size, max_size) = match len {
        14.. => (0.010, 64, 540),
        11.. => (0.014, 80, 620),
        _ => (0.018, 110, 720),
    };
    DomainLayout {
        tracking_em,
        min_size,
        max_size,
    }
}

/// Inputs of a banner.
#[derive(Debug, Clone, Copy)]
pub struct Banner<'a> {
    /// Root domain, already normalized.
    pub domain: &'a str,
    pub letter: char,
    pub brand: &'a BrandStyle,
    pub theme: Theme,
    pub tagline: &'a str,
}

/// Sizes and positions chosen for a banner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutResult {
    pub letter_size: u32,
    pub domain_size: u32,
    pub subtitle_size: u32,
    pub domain_baseline: f32,
    pub subtitle_baseline: f32,
    /// Cursor advance of the flat-colored part of the domain.
    pub main_width: f32,
    pub text_x: f32,
    pub text_max_width: f32,
    pub policy: DomainLayout,
}

/// Lays out the full banner: letter mark on the left, domain and tagline on
/// the right.
pub fn compose_banner(font: &dyn GlyphSource, banner: &Banner<'_>) -> (Scene, LayoutResult) {
    let width = BANNER_WIDTH as f32;
    let height = BANNER_HEIGHT as f32;
    let mut scene = Scene::new(BANNER_WIDTH, BANNER_HEIGHT);

    let glyph_box = Rect::new(PAD_LEFT, 0.0, height, height);
    let (items, letter_fit) = letter_glyph(font, glyph_box, banner.letter, banner.brand);
    scene.items.extend(items);

    let text_x = glyph_box.right() + GAP_AFTER_GLYPH;
    let text_max_width = width - text_x - PAD_RIGHT;

    let parts = split_domain_for_gradient(banner.domain);
    let policy = domain_layout(banner.domain);
    let domain_style = TextStyle::new(0.0, FontWeight::BLACK)
        .tracking(policy.tracking_em)
        .small_caps(SMALL_CAPS_SCALE)
        .stroke(DOMAIN_STROKE);

    let fitted = fit_to_width(
        font,
        &parts.joined(),
        &domain_style,
        (text_max_width * FIT_MARGIN).floor(),
        policy.min_size,
        policy.max_size,
    );
    let domain_size = fitted.min((height * MAX_DOMAIN_HEIGHT).floor() as u32);
    let size = domain_size as f32;

    let ascent = size * ASCENT_EM;
    let descent = size * DESCENT_EM;
    let block_top = ((height - (ascent + descent) - LINE_GAP - size * 0.5) / 2.0)
        .floor()
        .max(0.0);
    let domain_baseline = block_top + ascent;

    let colors = banner.theme.colors();
    let domain_style = domain_style.at_size(size);

    let main = solid_text(font, &parts.main, text_x, domain_baseline, &domain_style, colors.main);
    let main_width = main.width;
    scene.push(SceneItem::Text(main.item));

    if parts.has_suffix() {
        let suffix = gradient_text(
            font,
            &parts.suffix,
            text_x + main_width,
            domain_baseline,
            &domain_style,
            banner.brand,
        );
        scene.push(SceneItem::Text(suffix.item));
    }

    let sub_template = TextStyle::new(0.0, FontWeight::REGULAR)
        .tracking(SUB_TRACKING)
        .small_caps(SMALL_CAPS_SCALE);
    let mut subtitle_size = ((size * SUB_RATIO).floor() as u32).clamp(SUB_MIN, SUB_MAX);
    while measure_run(font, banner.tagline, &sub_template.at_size(subtitle_size as f32))
        > text_max_width
    {
        subtitle_size -= SUB_STEP;
        if subtitle_size <= SUB_FLOOR {
            break;
        }
    }

    let gap = (size * 0.24).round().max(22.0);
    let subtitle_baseline =
        domain_baseline + descent + gap + subtitle_size as f32 * SUB_BASELINE_EM;
    let subtitle = solid_text(
        font,
        banner.tagline,
        text_x,
        subtitle_baseline,
        &sub_template.at_size(subtitle_size as f32),
        colors.sub,
    );
    scene.push(SceneItem::Text(subtitle.item));

    let result = LayoutResult {
        letter_size: letter_fit.size,
        domain_size,
        subtitle_size,
        domain_baseline,
        subtitle_baseline,
        main_width,
        text_x,
        text_max_width,
        policy,
    };
    debug!(domain = banner.domain, ?result, "Composed banner");
    (scene, result)
}

/// A square image holding only the letter mark.
pub fn compose_logo_only(
    font: &dyn GlyphSource,
    letter: char,
    brand: &BrandStyle,
    size: u32,
) -> Scene {
    square_mark(font, letter, brand, size)
}

/// A small square letter mark, one of the sizes packed into an icon file.
pub fn compose_favicon(
    font: &dyn GlyphSource,
    letter: char,
    brand: &BrandStyle,
    size: u32,
) -> Scene {
    square_mark(font, letter, brand, size)
}

fn square_mark(font: &dyn GlyphSource, letter: char, brand: &BrandStyle, size: u32) -> Scene {
    let mut scene = Scene::new(size, size);
    let bounds = Rect::new(0.0, 0.0, size as f32, size as f32);
    let (items, fit) = letter_glyph(font, bounds, letter, brand);
    scene.items.extend(items);
    debug!(%letter, size, letter_size = fit.size, "Composed letter mark");
    scene
}
