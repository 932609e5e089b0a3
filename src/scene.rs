//! Scene model: tokens, ruler, fog reveals, background, and the shared store.
//!
//! [`MapStore`] is the contract the interaction engine and the renderer use to
//! read and mutate shared map state. The host may back it with anything; the
//! crate ships [`SceneStore`], an in-memory implementation that also carries
//! the panel operations (grid settings, background, fog reset, scenarios).
//!
//! Everything persistent serializes with serde so a [`Scenario`] can be handed
//! to a key-value store as JSON and loaded back later.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Camera, Point};
use crate::color::normalize_hex_color;
use crate::consts::{DEFAULT_GRID_SIZE, DEFAULT_TOKEN_COLOR, MAX_GRID_SIZE, MIN_GRID_SIZE};

/// Unique identifier for a token.
pub type TokenId = String;

/// Generate a fresh random token id.
#[must_use]
pub fn fresh_token_id() -> TokenId {
    Uuid::new_v4().to_string()
}

/// Outline of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenShape {
    #[default]
    Circle,
    Square,
}

/// A token on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Unique identifier.
    pub id: TokenId,
    /// Label drawn below the token. Empty names draw no label.
    pub name: String,
    /// Center in world coordinates.
    pub x: f64,
    pub y: f64,
    /// Diameter (circle) or side length (square) in world units.
    pub size: f64,
    pub shape: TokenShape,
    /// `#rrggbb` fill color.
    pub color: String,
}

impl Token {
    /// Token center as a point.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The same token with its color as `#rrggbb`, falling back to the default color.
    #[must_use]
    pub fn with_normalized_color(mut self) -> Self {
        self.color = normalize_hex_color(&self.color, DEFAULT_TOKEN_COLOR);
        self
    }
}

/// Sparse update for a token. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<TokenShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TokenPatch {
    /// Patch that moves a token to `position`.
    #[must_use]
    pub fn position(position: Point) -> Self {
        Self { x: Some(position.x), y: Some(position.y), ..Self::default() }
    }

    fn apply(&self, token: &mut Token) {
        if let Some(name) = &self.name {
            token.name.clone_from(name);
        }
        if let Some(x) = self.x {
            token.x = x;
        }
        if let Some(y) = self.y {
            token.y = y;
        }
        if let Some(size) = self.size {
            token.size = size;
        }
        if let Some(shape) = self.shape {
            token.shape = shape;
        }
        if let Some(color) = &self.color {
            token.color = normalize_hex_color(color, &token.color);
        }
    }
}

/// Distance measurement between two world points.
///
/// `active` is true only while the pointer is held; the endpoints survive the
/// release so the last measurement stays on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ruler {
    pub active: bool,
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl Ruler {
    /// Both endpoints, if the ruler has been placed.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        Some((self.start?, self.end?))
    }

    /// Measured world distance, if both endpoints exist.
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        self.endpoints().map(|(a, b)| a.distance_to(b))
    }

    /// Whether the overlay should draw this ruler.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.active || self.endpoints().is_some()
    }
}

/// A disc cleared from the fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FogReveal {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl FogReveal {
    #[must_use]
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A decoded background image: its data URL and natural pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub data_url: String,
    pub width: f64,
    pub height: f64,
}

/// Persistent snapshot of a map, as stored in the host's key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub camera: Camera,
    pub grid_size: f64,
    pub grid_enabled: bool,
    pub fog_enabled: bool,
    pub fog_reveals: Vec<FogReveal>,
    pub tokens: Vec<Token>,
    pub background_image: Option<BackgroundImage>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            grid_size: DEFAULT_GRID_SIZE,
            grid_enabled: true,
            fog_enabled: false,
            fog_reveals: Vec::new(),
            tokens: Vec::new(),
            background_image: None,
        }
    }
}

impl Scenario {
    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns `Err` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the input is not a valid scenario document.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

// =============================================================
// MapStore
// =============================================================

/// Shared map state as seen by the engine and the renderer.
pub trait MapStore {
    fn camera(&self) -> Camera;
    fn grid_size(&self) -> f64;
    fn grid_enabled(&self) -> bool;
    fn background_image(&self) -> Option<&BackgroundImage>;
    fn fog_enabled(&self) -> bool;
    fn fog_reveals(&self) -> &[FogReveal];
    fn ruler(&self) -> &Ruler;
    /// Tokens in paint order; later tokens draw on top.
    fn tokens(&self) -> &[Token];
    fn selected_token_id(&self) -> Option<&str>;

    fn set_camera(&mut self, camera: Camera);
    fn set_ruler(&mut self, ruler: Ruler);
    fn add_fog_reveal(&mut self, reveal: FogReveal);
    fn add_token(&mut self, token: Token);
    /// Apply a sparse update. Returns false if no token has `id`.
    fn update_token(&mut self, id: &str, patch: &TokenPatch) -> bool;
    fn select_token(&mut self, id: Option<TokenId>);

    /// Modify the ruler in place.
    fn update_ruler<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Ruler),
        Self: Sized,
    {
        let mut ruler = self.ruler().clone();
        update(&mut ruler);
        self.set_ruler(ruler);
    }

    /// Look up a token by id.
    fn token(&self, id: &str) -> Option<&Token> {
        self.tokens().iter().find(|t| t.id == id)
    }

    /// The currently selected token, if it still exists.
    fn selected_token(&self) -> Option<&Token> {
        self.selected_token_id().and_then(|id| self.token(id))
    }
}

// =============================================================
// SceneStore
// =============================================================

/// In-memory [`MapStore`] plus the panel operations of the map UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStore {
    camera: Camera,
    grid_size: f64,
    grid_enabled: bool,
    background_image: Option<BackgroundImage>,
    fog_enabled: bool,
    fog_reveals: Vec<FogReveal>,
    ruler: Ruler,
    tokens: Vec<Token>,
    selected_token_id: Option<TokenId>,
}

impl SceneStore {
    /// Create a store holding an empty default scenario.
    #[must_use]
    pub fn new() -> Self {
        Self::from_scenario(Scenario::default())
    }

    /// Create a store from a saved scenario.
    #[must_use]
    pub fn from_scenario(scenario: Scenario) -> Self {
        Self {
            camera: scenario.camera,
            grid_size: clamp_grid_size(scenario.grid_size).unwrap_or(DEFAULT_GRID_SIZE),
            grid_enabled: scenario.grid_enabled,
            background_image: scenario.background_image,
            fog_enabled: scenario.fog_enabled,
            fog_reveals: scenario.fog_reveals,
            ruler: Ruler::default(),
            tokens: scenario.tokens.into_iter().map(Token::with_normalized_color).collect(),
            selected_token_id: None,
        }
    }

    /// Remove a token, clearing the selection if it pointed at it.
    pub fn remove_token(&mut self, id: &str) -> Option<Token> {
        let index = self.tokens.iter().position(|t| t.id == id)?;
        if self.selected_token_id.as_deref() == Some(id) {
            self.selected_token_id = None;
        }
        Some(self.tokens.remove(index))
    }

    /// Set the grid cell size, clamped to the supported range.
    ///
    /// Non-finite values are ignored. Returns the size now in effect.
    pub fn set_grid_size(&mut self, size: f64) -> f64 {
        if let Some(size) = clamp_grid_size(size) {
            self.grid_size = size;
        }
        self.grid_size
    }

    pub fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid_enabled = enabled;
    }

    /// Toggle fog painting. Reveals are kept either way.
    pub fn set_fog_enabled(&mut self, enabled: bool) {
        self.fog_enabled = enabled;
    }

    /// Replace the background image.
    pub fn load_background_image(&mut self, image: BackgroundImage) {
        self.background_image = Some(image);
    }

    pub fn clear_background_image(&mut self) {
        self.background_image = None;
    }

    /// Drop every reveal, covering the whole map again.
    pub fn clear_fog(&mut self) {
        self.fog_reveals.clear();
    }

    /// Reset to an empty default map.
    pub fn new_scenario(&mut self) {
        *self = Self::new();
    }

    /// Persistent part of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Scenario {
        Scenario {
            camera: self.camera,
            grid_size: self.grid_size,
            grid_enabled: self.grid_enabled,
            fog_enabled: self.fog_enabled,
            fog_reveals: self.fog_reveals.clone(),
            tokens: self.tokens.clone(),
            background_image: self.background_image.clone(),
        }
    }

    /// Replace the state with a saved scenario. Transient state (ruler, selection) is reset.
    pub fn restore(&mut self, scenario: Scenario) {
        *self = Self::from_scenario(scenario);
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_grid_size(size: f64) -> Option<f64> {
    size.is_finite().then(|| size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE))
}

impl MapStore for SceneStore {
    fn camera(&self) -> Camera {
        self.camera
    }

    fn grid_size(&self) -> f64 {
        self.grid_size
    }

    fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    fn background_image(&self) -> Option<&BackgroundImage> {
        self.background_image.as_ref()
    }

    fn fog_enabled(&self) -> bool {
        self.fog_enabled
    }

    fn fog_reveals(&self) -> &[FogReveal] {
        &self.fog_reveals
    }

    fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn selected_token_id(&self) -> Option<&str> {
        self.selected_token_id.as_deref()
    }

    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn set_ruler(&mut self, ruler: Ruler) {
        self.ruler = ruler;
    }

    fn add_fog_reveal(&mut self, reveal: FogReveal) {
        self.fog_reveals.push(reveal);
    }

    /// Append a token, or replace in place one with the same id.
    fn add_token(&mut self, token: Token) {
        let token = token.with_normalized_color();
        match self.tokens.iter_mut().find(|t| t.id == token.id) {
            Some(existing) => *existing = token,
            None => self.tokens.push(token),
        }
    }

    fn update_token(&mut self, id: &str, patch: &TokenPatch) -> bool {
        let Some(token) = self.tokens.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        patch.apply(token);
        true
    }

    /// Select a token by id. Unknown ids clear the selection.
    fn select_token(&mut self, id: Option<TokenId>) {
        self.selected_token_id = id.filter(|id| self.tokens.iter().any(|t| &t.id == id));
    }
}
