//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a 0-5 star count as filled and empty stars.
///
/// Fractional values round to the nearest star.
///
/// Usage in templates: `{{ review.rating|stars }}`
#[askama::filter_fn]
pub fn stars(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(render_stars(&value.to_string()))
}

fn render_stars(raw: &str) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=5
    let filled = raw
        .trim()
        .parse::<f64>()
        .map_or(0, |v| v.round().clamp(0.0, 5.0) as usize);
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stars() {
        assert_eq!(render_stars("4"), "★★★★☆");
        assert_eq!(render_stars("4.6"), "★★★★★");
        assert_eq!(render_stars("0.0"), "☆☆☆☆☆");
        assert_eq!(render_stars("9"), "★★★★★");
        assert_eq!(render_stars("n/a"), "☆☆☆☆☆");
    }
}
