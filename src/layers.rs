//! The four stacked surfaces of the map and the pass that paints each.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use crate::camera::Viewport;
use crate::error::SurfaceError;
use crate::render::{RenderContext, draw_background, draw_grid, draw_overlay, draw_tokens};
use crate::scene::MapStore;
use crate::surface::Surface;

/// One stacked surface, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Grid,
    Tokens,
    Overlay,
}

impl Layer {
    /// Every layer in paint order.
    pub const ALL: [Layer; 4] = [Layer::Background, Layer::Grid, Layer::Tokens, Layer::Overlay];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Grid => "grid",
            Self::Tokens => "tokens",
            Self::Overlay => "overlay",
        }
    }
}

/// Surfaces for each layer. A missing surface turns its pass into a no-op.
pub struct LayerSet<S> {
    background: Option<S>,
    grid: Option<S>,
    tokens: Option<S>,
    overlay: Option<S>,
}

impl<S> Default for LayerSet<S> {
    fn default() -> Self {
        Self { background: None, grid: None, tokens: None, overlay: None }
    }
}

impl<S: Surface> LayerSet<S> {
    /// A set with no surfaces attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with all four surfaces attached, bottom to top.
    #[must_use]
    pub fn with_surfaces(background: S, grid: S, tokens: S, overlay: S) -> Self {
        Self { background: Some(background), grid: Some(grid), tokens: Some(tokens), overlay: Some(overlay) }
    }

    fn slot(&mut self, layer: Layer) -> &mut Option<S> {
        match layer {
            Layer::Background => &mut self.background,
            Layer::Grid => &mut self.grid,
            Layer::Tokens => &mut self.tokens,
            Layer::Overlay => &mut self.overlay,
        }
    }

    /// Attach a surface, returning the one it replaces.
    pub fn attach(&mut self, layer: Layer, surface: S) -> Option<S> {
        self.slot(layer).replace(surface)
    }

    /// Detach a surface; its pass becomes a no-op.
    pub fn detach(&mut self, layer: Layer) -> Option<S> {
        self.slot(layer).take()
    }

    #[must_use]
    pub fn surface(&self, layer: Layer) -> Option<&S> {
        match layer {
            Layer::Background => self.background.as_ref(),
            Layer::Grid => self.grid.as_ref(),
            Layer::Tokens => self.tokens.as_ref(),
            Layer::Overlay => self.overlay.as_ref(),
        }
    }

    pub fn surface_mut(&mut self, layer: Layer) -> Option<&mut S> {
        self.slot(layer).as_mut()
    }

    /// Resize every attached surface to the viewport in device pixels.
    pub fn resize_all(&mut self, viewport: &Viewport) {
        let (w, h) = viewport.pixel_size();
        for layer in Layer::ALL {
            if let Some(surface) = self.surface_mut(layer) {
                if surface.pixel_size() != (w, h) {
                    surface.set_pixel_size(w, h);
                }
            }
        }
        log::debug!("layers resized to {w}x{h} device pixels");
    }

    /// Paint one layer. Returns `Ok(false)` when no surface is attached.
    ///
    /// # Errors
    ///
    /// Propagates the pass's [`SurfaceError`].
    pub fn render_layer<M: MapStore + ?Sized>(
        &mut self,
        layer: Layer,
        store: &M,
        ctx: &RenderContext<'_>,
    ) -> Result<bool, SurfaceError> {
        let Some(surface) = self.surface_mut(layer) else {
            return Ok(false);
        };
        match layer {
            Layer::Background => draw_background(surface, store, ctx)?,
            Layer::Grid => draw_grid(surface, store, ctx)?,
            Layer::Tokens => draw_tokens(surface, store, ctx)?,
            Layer::Overlay => draw_overlay(surface, store, ctx)?,
        }
        Ok(true)
    }

    /// Paint every layer bottom to top.
    ///
    /// A failing pass is logged and skipped; the remaining passes still run.
    /// Returns the layers that failed.
    pub fn render_all<M: MapStore + ?Sized>(&mut self, store: &M, ctx: &RenderContext<'_>) -> Vec<Layer> {
        let mut failed = Vec::new();
        for layer in Layer::ALL {
            if let Err(e) = self.render_layer(layer, store, ctx) {
                log::warn!("{} pass failed: {e}", layer.name());
                failed.push(layer);
            }
        }
        failed
    }
}
