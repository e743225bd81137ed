//! Caption style validation.

use clipcut_timeline::CaptionStyle;

use crate::error::{CaptionError, CaptionResult};

/// True for `#RRGGBB` (either case).
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a style, returning it with opacity clamped to `[0, 1]`.
pub fn validate_style(mut style: CaptionStyle) -> CaptionResult<CaptionStyle> {
    if style.font_size == 0 {
        return Err(CaptionError::Validation("font size must be positive".into()));
    }
    for (field, value) in [
        ("font color", &style.font_color),
        ("outline color", &style.outline_color),
    ] {
        if !is_hex_color(value) {
            return Err(CaptionError::Validation(format!(
                "{field} must be #RRGGBB, got {value:?}"
            )));
        }
    }
    if style.background_color != "transparent" && !is_hex_color(&style.background_color) {
        return Err(CaptionError::Validation(format!(
            "background color must be #RRGGBB or transparent, got {:?}",
            style.background_color
        )));
    }
    if style.background_opacity.is_nan() {
        style.background_opacity = 0.0;
    }
    style.background_opacity = style.background_opacity.clamp(0.0, 1.0);
    Ok(style)
}
