//! Shared numeric and style constants for the battle map engine.
//!
//! Values a host may want to tune live in [`crate::config::EngineConfig`];
//! the constants here are fixed parts of the visual language.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed camera scale.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed camera scale.
pub const MAX_SCALE: f64 = 5.0;

/// Scale multiplier for one wheel notch toward the user (zoom in).
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Scale multiplier for one wheel notch away from the user (zoom out).
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

// ── Grid ────────────────────────────────────────────────────────

/// Every Nth grid line is drawn as a major line.
pub const MAJOR_GRID_EVERY: i64 = 5;

/// Grid size bounds enforced by the scene store.
pub const MIN_GRID_SIZE: f64 = 5.0;
pub const MAX_GRID_SIZE: f64 = 200.0;

/// Default cell size in world units.
pub const DEFAULT_GRID_SIZE: f64 = 50.0;

pub const GRID_MINOR_STROKE: &str = "rgba(16, 185, 129, 0.2)";
pub const GRID_MAJOR_STROKE: &str = "rgba(16, 185, 129, 0.4)";

/// Past this many lines per axis the grid pass draws only major lines.
pub const MAX_GRID_LINES: i64 = 10_000;

// ── Tokens ──────────────────────────────────────────────────────

/// Fill color for new tokens, and the fallback for unparseable colors.
pub const DEFAULT_TOKEN_COLOR: &str = "#3b82f6";

/// Outline and glow color of the selected token.
pub const SELECTED_TOKEN_STROKE: &str = "#fbbf24";

/// Outline color of unselected tokens.
pub const TOKEN_STROKE: &str = "#ffffff";

/// How much the gradient rim darkens the token color, in percent.
pub const TOKEN_RIM_DARKEN_PERCENT: f64 = 30.0;

/// Selection glow blur in screen pixels.
pub const SELECTION_GLOW_PX: f64 = 20.0;

/// Gap between a token's edge and its name label, in screen pixels.
pub const LABEL_GAP_PX: f64 = 8.0;

// ── Fog ─────────────────────────────────────────────────────────

/// Reveal discs are drawn this much larger than their nominal radius.
pub const FOG_REVEAL_FEATHER: f64 = 1.2;

// ── Ruler ───────────────────────────────────────────────────────

pub const RULER_COLOR: &str = "#ef4444";

/// Ruler dash pattern in screen pixels: dash, gap.
pub const RULER_DASH_PX: [f64; 2] = [15.0, 5.0];

/// Ruler endpoint dot radius in screen pixels.
pub const RULER_DOT_RADIUS_PX: f64 = 4.0;

/// Ruler label box size in screen pixels.
pub const RULER_LABEL_W_PX: f64 = 80.0;
pub const RULER_LABEL_H_PX: f64 = 20.0;

// ── Labels ──────────────────────────────────────────────────────

/// Label font size floor.
pub const LABEL_MIN_FONT_PX: f64 = 12.0;

/// Label font size at scale 1; divided by the camera scale.
pub const LABEL_FONT_WORLD: f64 = 14.0;

pub const TOKEN_HIGHLIGHT_FILL: &str = "rgba(255, 255, 255, 0.3)";
pub const RULER_LABEL_FILL: &str = "rgba(0, 0, 0, 0.8)";
