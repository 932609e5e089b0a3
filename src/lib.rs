//! Canvas rendering and interaction engine for a browser battle map.
//!
//! The crate is compiled to WebAssembly and drives four stacked canvases:
//! background image, grid, tokens, and an overlay holding fog of war and the
//! ruler. It turns pointer and wheel input into mutations of the shared map
//! state, coalesces the resulting redraws, and repaints each layer from that
//! state. Persistence and panel UI belong to the host page.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and the testable [`engine::EngineCore`] |
//! | [`scene`] | Tokens, ruler, fog reveals, the [`scene::MapStore`] contract and [`scene::SceneStore`] |
//! | [`camera`] | Screen/world conversions and the camera transform |
//! | [`input`] | Tools, buttons and the gesture state machine |
//! | [`hit`] | Token hit-testing |
//! | [`render`] | The four paint passes |
//! | [`layers`] | Surfaces per layer and pass dispatch |
//! | [`fog`] | Fog painting and reveal coverage queries |
//! | [`scheduler`] | Coalesced, drag-suppressed redraws and resize settling |
//! | [`surface`] | Drawing surface trait and the browser canvas implementation |
//! | [`image_cache`] | Decoded background images keyed by source |
//! | [`web`] | Mounting on the DOM, listeners, console logging |
//! | [`config`] | Tunable engine settings |
//! | [`color`] | Hex color parsing and darkening |
//! | [`error`] | Error types |
//! | [`consts`] | Fixed numeric and style constants |

pub mod camera;
pub mod color;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod fog;
pub mod hit;
pub mod image_cache;
pub mod input;
pub mod layers;
pub mod render;
pub mod scene;
pub mod scheduler;
pub mod surface;
pub mod web;

#[cfg(test)]
#[path = "support_test.rs"]
pub(crate) mod support;
