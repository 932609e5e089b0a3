#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn default_config_is_valid() {
    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn default_zoom_limits_match_consts() {
    let config = EngineConfig::default();
    assert_eq!(config.min_scale, 0.1);
    assert_eq!(config.max_scale, 5.0);
}

#[test]
fn from_json_empty_object_uses_defaults() {
    let config = EngineConfig::from_json("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn from_json_overrides_only_given_fields() {
    let config = EngineConfig::from_json(r#"{ "fog_brush_radius": 80, "live_overlay": false }"#).unwrap();
    assert_eq!(config.fog_brush_radius, 80.0);
    assert!(!config.live_overlay);
    assert_eq!(config.redraw_interval_ms, 16);
}

#[test]
fn from_json_rejects_malformed_document() {
    let err = EngineConfig::from_json("{ nope").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn from_json_rejects_non_positive_min_scale() {
    let err = EngineConfig::from_json(r#"{ "min_scale": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "min_scale", .. }));
}

#[test]
fn validate_rejects_inverted_scale_range() {
    let config = EngineConfig { min_scale: 2.0, max_scale: 1.0, ..EngineConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "max_scale", .. })));
}

#[test]
fn validate_rejects_zoom_out_factor_above_one() {
    let config = EngineConfig { zoom_out_factor: 1.5, ..EngineConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "zoom_out_factor", .. })));
}

#[test]
fn validate_rejects_nan_scale() {
    let config = EngineConfig { min_scale: f64::NAN, ..EngineConfig::default() };
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_zero_redraw_interval() {
    let config = EngineConfig { redraw_interval_ms: 0, ..EngineConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "redraw_interval_ms", .. })));
}

#[test]
fn config_error_display_names_field() {
    let err = ConfigError::Invalid { field: "min_scale", reason: "must be positive" };
    assert_eq!(err.to_string(), "invalid engine config: min_scale must be positive");
}
