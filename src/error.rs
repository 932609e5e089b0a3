//! Error types shared across the engine.

use wasm_bindgen::JsValue;

/// A 2D drawing call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("surface call failed: {0}")]
pub struct SurfaceError(pub String);

impl From<JsValue> for SurfaceError {
    fn from(value: JsValue) -> Self {
        Self(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Engine configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for [`crate::config::EngineConfig`].
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the engine cannot run with.
    #[error("invalid engine config: {field} {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Browser wiring failed while mounting the map.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("no browser window available")]
    NoWindow,
    #[error("canvas has no 2d context")]
    NoContext,
    #[error("dom call failed: {0}")]
    Dom(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<JsValue> for MountError {
    fn from(value: JsValue) -> Self {
        Self::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
