use super::*;

#[test]
fn parse_hex_rgb_supports_short_and_long_forms() {
    assert_eq!(parse_hex_rgb("#ABC"), Some((170, 187, 204)));
    assert_eq!(parse_hex_rgb("  #a1B2c3 "), Some((161, 178, 195)));
}

#[test]
fn parse_hex_rgb_rejects_invalid_inputs() {
    assert_eq!(parse_hex_rgb("AABBCC"), None);
    assert_eq!(parse_hex_rgb("#12"), None);
    assert_eq!(parse_hex_rgb("#abcd"), None);
    assert_eq!(parse_hex_rgb("#12GG34"), None);
    assert_eq!(parse_hex_rgb("#"), None);
}

#[test]
fn normalize_hex_color_uses_canonical_lowercase() {
    assert_eq!(normalize_hex_color("#ABC", "#000000"), "#aabbcc");
    assert_eq!(normalize_hex_color("#A1B2C3", "#000000"), "#a1b2c3");
}

#[test]
fn normalize_hex_color_falls_back() {
    assert_eq!(normalize_hex_color("blue", "#ff0000"), "#ff0000");
    assert_eq!(normalize_hex_color("blue", "invalid"), "#3b82f6");
}

#[test]
fn darken_thirty_percent_subtracts_77() {
    // round(2.55 * 30) = 77
    assert_eq!(darken("#3b82f6", 30.0), "#0035a9");
}

#[test]
fn darken_saturates_at_black() {
    assert_eq!(darken("#102030", 30.0), "#000000");
    assert_eq!(darken("#ffffff", 100.0), "#000000");
}

#[test]
fn negative_percent_lightens_and_saturates_at_white() {
    assert_eq!(darken("#000000", -10.0), "#1a1a1a");
    assert_eq!(darken("#f0f0f0", -50.0), "#ffffff");
}

#[test]
fn darken_zero_normalizes_only() {
    assert_eq!(darken("#ABC", 0.0), "#aabbcc");
}

#[test]
fn darken_leaves_unparseable_color_alone() {
    assert_eq!(darken("rebeccapurple", 30.0), "rebeccapurple");
}
