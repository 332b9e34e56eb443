//! Largest-size-that-fits search.

use tracing::debug;

use crate::font::GlyphSource;
use crate::text::{TextStyle, measure_run};

/// Floor applied when even `min_size` overflows and the size is scaled down.
pub const MIN_FORCED_SIZE: u32 = 40;

/// Finds the largest integer size in `[min_size, max_size]` at which `text`
/// measures no wider than `max_width`.
///
/// When nothing in range fits, the minimum size is scaled down linearly
/// (never below [`MIN_FORCED_SIZE`]). Empty text, an inverted range and an
/// unusable measurement all return `min_size`.
pub fn fit_to_width(
    font: &dyn GlyphSource,
    text: &str,
    template: &TextStyle,
    max_width: f32,
    min_size: u32,
    max_size: u32,
) -> u32 {
    if text.is_empty() || min_size > max_size {
        return min_size;
    }

    let width_at = |size: u32| measure_run(font, text, &template.at_size(size as f32));

    let mut lo = min_size;
    let mut hi = max_size;
    let mut best = None;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if width_at(mid) <= max_width {
            best = Some(mid);
            lo = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            hi = mid - 1;
        }
    }

    if let Some(size) = best {
        debug!(text, size, max_width, "Fitted text");
        return size;
    }

    let width_at_min = width_at(min_size);
    if !width_at_min.is_finite() || width_at_min <= 0.0 {
        return min_size;
    }

    let scaled = (min_size as f32 * max_width / width_at_min).floor();
    let size = if scaled.is_finite() && scaled > 0.0 {
        (scaled as u32).max(MIN_FORCED_SIZE)
    } else {
        MIN_FORCED_SIZE
    };
    debug!(text, size, width_at_min, max_width, "Text overflows minimum size, scaled down");
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{BlockFont, BrokenFont, FontWeight};

    fn template() -> TextStyle {
        TextStyle::new(0.0, FontWeight::BLACK)
            .tracking(0.018)
            .small_caps(0.9)
    }

    #[test]
    fn empty_text_returns_min() {
        assert_eq!(fit_to_width(&BlockFont, "", &template(), 10.0, 110, 720), 110);
    }

    #[test]
    fn picks_largest_fitting_size() {
        let style = template();
        let size = fit_to_width(&BlockFont, "NETPROXY.IO", &style, 1000.0, 64, 720);
        assert!(size > 64 && size < 720);
        assert!(measure_run(&BlockFont, "NETPROXY.IO", &style.at_size(size as f32)) <= 1000.0);
        assert!(measure_run(&BlockFont, "NETPROXY.IO", &style.at_size((size + 1) as f32)) > 1000.0);
    }

    #[test]
    fn short_text_hits_max() {
        assert_eq!(fit_to_width(&BlockFont, "A", &template(), 5000.0, 110, 720), 720);
    }

    #[test]
    fn overflow_scales_below_min_with_floor() {
        let style = template();
        let text = "averyveryverylongdomainname.com";
        let size = fit_to_width(&BlockFont, text, &style, 900.0, 64, 540);
        assert!(size < 64);
        assert!(size >= MIN_FORCED_SIZE);
        let width = measure_run(&BlockFont, text, &style.at_size(size as f32));
        assert!(width <= 900.0 + 1.0, "width {width}");

        let huge = "x".repeat(500);
        assert_eq!(fit_to_width(&BlockFont, &huge, &style, 600.0, 64, 540), MIN_FORCED_SIZE);
    }

    #[test]
    fn broken_measurement_returns_min() {
        assert_eq!(fit_to_width(&BrokenFont, "abc", &template(), 100.0, 80, 620), 80);
    }

    #[test]
    fn inverted_range_returns_min() {
        assert_eq!(fit_to_width(&BlockFont, "abc", &template(), 100.0, 300, 200), 300);
    }

    #[test]
    fn monotone_in_available_width() {
        let style = template();
        let mut previous = u32::MAX;
        for width in (50..=1500).rev().step_by(25) {
            let size = fit_to_width(&BlockFont, "example.co.uk", &style, width as f32, 80, 620);
            assert!(size <= previous, "width {width}: {size} > {previous}");
            assert!((MIN_FORCED_SIZE..=620).contains(&size));
            previous = size;
        }
    }
}
