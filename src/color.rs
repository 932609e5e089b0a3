//! Hex color parsing and shading.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// Parse `#RGB` or `#RRGGBB` values into RGB channels.
#[must_use]
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    let digits = hex.chars().map(nibble).collect::<Option<Vec<u8>>>()?;
    match digits.as_slice() {
        [r, g, b] => Some((r * 17, g * 17, b * 17)),
        [r1, r0, g1, g0, b1, b0] => Some((r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn nibble(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}

/// Normalize a color to canonical lowercase `#rrggbb`.
#[must_use]
pub fn normalize_hex_color(value: &str, fallback: &str) -> String {
    let fallback_rgb = parse_hex_rgb(fallback).unwrap_or((59, 130, 246));
    let (r, g, b) = parse_hex_rgb(value).unwrap_or(fallback_rgb);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Darken a hex color by `percent` of full scale per channel.
///
/// Each channel loses `round(2.55 * percent)` and saturates at zero, so 30
/// takes 77 off every channel. Negative percentages lighten. Unparseable
/// input is returned unchanged.
#[must_use]
pub fn darken(color: &str, percent: f64) -> String {
    let Some((r, g, b)) = parse_hex_rgb(color) else {
        return color.to_owned();
    };
    let amount = (2.55 * percent).round();
    let shade = |c: u8| shift_channel(c, amount);
    format!("#{:02x}{:02x}{:02x}", shade(r), shade(g), shade(b))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shift_channel(channel: u8, amount: f64) -> u8 {
    (f64::from(channel) - amount).clamp(0.0, 255.0) as u8
}
