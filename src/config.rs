//! Engine configuration.
//!
//! Every field has a default matching the stock battle map, so a host can pass
//! a partial JSON document (or none at all) and only override what it needs.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_TOKEN_COLOR, MAX_SCALE, MIN_SCALE, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::error::ConfigError;

/// Tunable engine behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lower camera scale bound.
    pub min_scale: f64,
    /// Upper camera scale bound.
    pub max_scale: f64,
    /// Wheel multiplier when scrolling up.
    pub zoom_in_factor: f64,
    /// Wheel multiplier when scrolling down.
    pub zoom_out_factor: f64,
    /// Radius of one fog brush dab in world units.
    pub fog_brush_radius: f64,
    /// Extra world units painted around the visible rect so fog edges never show while panning.
    pub fog_margin: f64,
    /// Coalescing window for redraw requests.
    pub redraw_interval_ms: u32,
    /// Quiet period after the last resize event before surfaces are resized.
    pub resize_debounce_ms: u32,
    /// Delay between resizing surfaces and the follow-up redraw.
    pub resize_settle_ms: u32,
    /// Base fill of the background surface.
    pub background_color: String,
    /// Enlargement applied to the background image.
    pub background_image_scale: f64,
    /// Fill color of tokens placed with the token tool.
    pub default_token_color: String,
    /// Distance one grid square represents on the ruler label.
    pub feet_per_square: f64,
    /// Repaint the overlay surface on every pointer move while measuring or brushing.
    pub live_overlay: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_in_factor: ZOOM_IN_FACTOR,
            zoom_out_factor: ZOOM_OUT_FACTOR,
            fog_brush_radius: 50.0,
            fog_margin: 100.0,
            redraw_interval_ms: 16,
            resize_debounce_ms: 100,
            resize_settle_ms: 20,
            background_color: "#1f2937".to_owned(),
            background_image_scale: 1.2,
            default_token_color: DEFAULT_TOKEN_COLOR.to_owned(),
            feet_per_square: 5.0,
            live_overlay: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`EngineConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.min_scale) {
            return Err(invalid("min_scale", "must be positive"));
        }
        if !is_positive(self.max_scale) || self.max_scale < self.min_scale {
            return Err(invalid("max_scale", "must not be below min_scale"));
        }
        if !is_positive(self.zoom_in_factor - 1.0) {
            return Err(invalid("zoom_in_factor", "must be greater than 1"));
        }
        if !is_positive(self.zoom_out_factor) || !is_positive(1.0 - self.zoom_out_factor) {
            return Err(invalid("zoom_out_factor", "must be between 0 and 1"));
        }
        if !is_positive(self.fog_brush_radius) {
            return Err(invalid("fog_brush_radius", "must be positive"));
        }
        if self.redraw_interval_ms == 0 {
            return Err(invalid("redraw_interval_ms", "must be positive"));
        }
        if !is_positive(self.background_image_scale) {
            return Err(invalid("background_image_scale", "must be positive"));
        }
        Ok(())
    }
}

/// False for zero, negatives and NaN.
fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
