//! Input model: tools, mouse buttons, wheel deltas, and the gesture state machine.
//!
//! `Tool` captures the user's intent at the time of a pointer event.
//! `InputState` is the gesture being tracked between pointer-down and
//! pointer-up, carrying the context needed to compute incremental deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::scene::TokenId;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pan the map, or select and drag tokens (default).
    #[default]
    Move,
    /// Measure a distance by dragging.
    Ruler,
    /// Brush reveals into the fog.
    Fog,
    /// Place a new token per click.
    Token,
}

impl Tool {
    /// Parse the tool name used by the host toolbar (`"move"`, `"ruler"`, `"fog"`, `"token"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "move" => Some(Self::Move),
            "ruler" => Some(Self::Ruler),
            "fog" => Some(Self::Fog),
            "token" => Some(Self::Token),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Ruler => "ruler",
            Self::Fog => "fog",
            Self::Token => "token",
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code. Back/forward buttons map to `None`.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down, which zooms out).
    pub dy: f64,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the map with no token selected.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving a token.
    DraggingToken {
        id: TokenId,
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Stretching the ruler from its start point.
    Measuring,
    /// Painting fog reveals.
    Brushing,
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether this gesture only changes what the overlay surface shows.
    #[must_use]
    pub fn affects_overlay_only(&self) -> bool {
        matches!(self, Self::Measuring | Self::Brushing)
    }
}
