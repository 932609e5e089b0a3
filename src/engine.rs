//! Interaction engine: pointer and wheel input in, store mutations and redraws out.
//!
//! [`EngineCore`] holds everything that does not touch the browser: the store,
//! the active tool, the gesture state machine and the viewport. It is driven
//! directly by unit tests.
//!
//! [`Engine`] wraps the core together with the four layer surfaces and the
//! [`RedrawScheduler`]. It suspends redraws while a drag is in progress and
//! repaints the overlay directly while the ruler or the fog brush is moving.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::camera::{Camera, Point, Viewport};
use crate::config::EngineConfig;
use crate::hit::hit_test_token;
use crate::input::{Button, InputState, Tool, WheelDelta};
use crate::layers::{Layer, LayerSet};
use crate::render::RenderContext;
use crate::scene::{FogReveal, MapStore, Ruler, Token, TokenId, TokenPatch, TokenShape, fresh_token_id};
use crate::scheduler::{RedrawScheduler, SchedulerTimings, Timer};
use crate::surface::Surface;

/// Notifications returned from input handlers. The store already reflects
/// each change when the action is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    CameraChanged(Camera),
    TokenSelected(Option<TokenId>),
    TokenCreated(Token),
    TokenMoved { id: TokenId, x: f64, y: f64 },
    FogRevealed(FogReveal),
    RulerChanged(Ruler),
}

/// Core engine state: all logic that doesn't depend on the canvas elements.
pub struct EngineCore<M> {
    pub store: M,
    pub tool: Tool,
    pub input: InputState,
    pub viewport: Viewport,
    pub config: EngineConfig,
}

impl<M: MapStore> EngineCore<M> {
    #[must_use]
    pub fn new(store: M, config: EngineConfig) -> Self {
        Self { store, tool: Tool::default(), input: InputState::Idle, viewport: Viewport::default(), config }
    }

    // --- Tool / viewport ---

    /// Switch tools. A gesture in progress ends as if the pointer was released.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if tool == self.tool {
            return Vec::new();
        }
        let actions = self.end_gesture();
        log::debug!("tool {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
        actions
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // --- Queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.store.camera()
    }

    /// World point under a screen (CSS pixel) position.
    #[must_use]
    pub fn world_at(&self, screen_pt: Point) -> Point {
        self.store.camera().screen_to_world(screen_pt, &self.viewport)
    }

    // --- Pointer input ---

    /// Start a gesture for the active tool. Only the primary button does anything.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let mut actions = self.end_gesture();
        let world = self.world_at(screen_pt);

        match self.tool {
            Tool::Move => self.press_move(screen_pt, world, &mut actions),
            Tool::Ruler => {
                let ruler = Ruler { active: true, start: Some(world), end: Some(world) };
                self.store.set_ruler(ruler.clone());
                self.input = InputState::Measuring;
                actions.push(Action::RulerChanged(ruler));
                actions.push(Action::RenderNeeded);
            }
            Tool::Fog => {
                self.input = InputState::Brushing;
                self.brush(world, &mut actions);
            }
            Tool::Token => {
                let token = self.new_token(world);
                log::debug!("placing {} at ({:.1}, {:.1})", token.name, world.x, world.y);
                self.store.add_token(token.clone());
                actions.push(Action::TokenCreated(token));
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    fn press_move(&mut self, screen_pt: Point, world: Point, actions: &mut Vec<Action>) {
        let hit = hit_test_token(self.store.tokens(), world).map(|t| t.id.clone());
        match hit {
            Some(id) => {
                self.store.select_token(Some(id.clone()));
                self.input = InputState::DraggingToken { id: id.clone(), last_screen: screen_pt };
                actions.push(Action::TokenSelected(Some(id)));
                actions.push(Action::RenderNeeded);
            }
            None => {
                if self.store.selected_token_id().is_some() {
                    self.store.select_token(None);
                    actions.push(Action::TokenSelected(None));
                    actions.push(Action::RenderNeeded);
                }
                self.input = InputState::Panning { last_screen: screen_pt };
            }
        }
    }

    fn brush(&mut self, world: Point, actions: &mut Vec<Action>) {
        if !self.store.fog_enabled() {
            return;
        }
        let reveal = FogReveal::new(world.x, world.y, self.config.fog_brush_radius);
        self.store.add_fog_reveal(reveal);
        actions.push(Action::FogRevealed(reveal));
        actions.push(Action::RenderNeeded);
    }

    fn new_token(&self, world: Point) -> Token {
        Token {
            id: fresh_token_id(),
            name: format!("Token {}", self.store.tokens().len() + 1),
            x: world.x,
            y: world.y,
            size: self.store.grid_size(),
            shape: TokenShape::Circle,
            color: self.config.default_token_color.clone(),
        }
    }

    /// Continue the gesture in progress. Does nothing when idle.
    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        let next = match std::mem::take(&mut self.input) {
            InputState::Idle => InputState::Idle,
            InputState::Panning { last_screen } => {
                let camera = self
                    .store
                    .camera()
                    .panned_by_screen_delta(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.store.set_camera(camera);
                actions.push(Action::CameraChanged(camera));
                actions.push(Action::RenderNeeded);
                InputState::Panning { last_screen: screen_pt }
            }
            InputState::DraggingToken { id, last_screen } => {
                let scale = self.store.camera().scale;
                let Some(pos) = self.store.token(&id).map(Token::position) else {
                    log::debug!("dragged token {id} is gone; ending drag");
                    return actions;
                };
                let x = pos.x + (screen_pt.x - last_screen.x) / scale;
                let y = pos.y + (screen_pt.y - last_screen.y) / scale;
                self.store.update_token(&id, &TokenPatch::position(Point::new(x, y)));
                actions.push(Action::TokenMoved { id: id.clone(), x, y });
                actions.push(Action::RenderNeeded);
                InputState::DraggingToken { id, last_screen: screen_pt }
            }
            InputState::Measuring => {
                let world = self.world_at(screen_pt);
                self.store.update_ruler(|ruler| ruler.end = Some(world));
                actions.push(Action::RulerChanged(self.store.ruler().clone()));
                actions.push(Action::RenderNeeded);
                InputState::Measuring
            }
            InputState::Brushing => {
                let world = self.world_at(screen_pt);
                self.brush(world, &mut actions);
                InputState::Brushing
            }
        };
        self.input = next;
        actions
    }

    /// End the gesture in progress.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.end_gesture()
    }

    /// The pointer left the surface or the browser took it over mid-gesture.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.end_gesture()
    }

    fn end_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Measuring => {
                self.store.update_ruler(|ruler| ruler.active = false);
                vec![Action::RulerChanged(self.store.ruler().clone()), Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    // --- Wheel ---

    /// Zoom one step toward the cursor: out when scrolling down, in otherwise.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        let factor = if delta.dy > 0.0 { self.config.zoom_out_factor } else { self.config.zoom_in_factor };
        let camera = self.store.camera();
        let anchor = camera.screen_to_world(screen_pt, &self.viewport);
        let zoomed = camera.zoomed_at(anchor, factor, self.config.min_scale, self.config.max_scale);
        if zoomed == camera {
            return Vec::new();
        }
        self.store.set_camera(zoomed);
        vec![Action::CameraChanged(zoomed), Action::RenderNeeded]
    }
}

// =============================================================
// Engine
// =============================================================

struct EngineState<M, S> {
    core: EngineCore<M>,
    layers: LayerSet<S>,
}

impl<M: MapStore, S: Surface> EngineState<M, S> {
    fn render_all(&mut self) -> Vec<Layer> {
        let ctx = RenderContext { viewport: self.core.viewport, config: &self.core.config };
        self.layers.render_all(&self.core.store, &ctx)
    }

    fn render_overlay(&mut self) {
        let ctx = RenderContext { viewport: self.core.viewport, config: &self.core.config };
        if let Err(e) = self.layers.render_layer(Layer::Overlay, &self.core.store, &ctx) {
            log::warn!("overlay pass failed: {e}");
        }
    }
}

/// The full engine: core state, layer surfaces and the redraw scheduler.
///
/// All methods take `&self` so the browser wiring can share the engine
/// between event listeners behind an `Rc`.
pub struct Engine<M: 'static, S: 'static, T: Timer + 'static> {
    state: Rc<RefCell<EngineState<M, S>>>,
    scheduler: RedrawScheduler<T>,
}

impl<M: MapStore + 'static, S: Surface + 'static, T: Timer + 'static> Engine<M, S, T> {
    pub fn new(store: M, layers: LayerSet<S>, config: EngineConfig, viewport: Viewport, timer: T) -> Self {
        let timings = SchedulerTimings::from_config(&config);
        let mut core = EngineCore::new(store, config);
        core.set_viewport(viewport);
        let state = Rc::new(RefCell::new(EngineState { core, layers }));

        let redraw_state = Rc::downgrade(&state);
        let resize_state = Rc::downgrade(&state);
        let scheduler = RedrawScheduler::new(
            timer,
            timings,
            move || redraw(&redraw_state),
            move || resize(&resize_state),
        );
        Self { state, scheduler }
    }

    // --- Input ---

    pub fn on_pointer_down(&self, screen_pt: Point, button: Button) -> Vec<Action> {
        let (actions, dragging) = {
            let mut state = self.state.borrow_mut();
            let actions = state.core.on_pointer_down(screen_pt, button);
            (actions, state.core.input.is_active())
        };
        if dragging {
            self.scheduler.suspend();
        }
        self.dispatch(&actions);
        actions
    }

    pub fn on_pointer_move(&self, screen_pt: Point) -> Vec<Action> {
        let mut state = self.state.borrow_mut();
        let actions = state.core.on_pointer_move(screen_pt);
        if actions.is_empty() {
            return actions;
        }
        if state.core.config.live_overlay && state.core.input.affects_overlay_only() {
            state.render_overlay();
            return actions;
        }
        drop(state);
        self.dispatch(&actions);
        actions
    }

    pub fn on_pointer_up(&self) -> Vec<Action> {
        let actions = self.state.borrow_mut().core.on_pointer_up();
        self.scheduler.resume();
        self.dispatch(&actions);
        actions
    }

    pub fn on_pointer_cancel(&self) -> Vec<Action> {
        let actions = self.state.borrow_mut().core.on_pointer_cancel();
        self.scheduler.resume();
        self.dispatch(&actions);
        actions
    }

    pub fn on_wheel(&self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        let actions = self.state.borrow_mut().core.on_wheel(screen_pt, delta);
        self.dispatch(&actions);
        actions
    }

    pub fn set_tool(&self, tool: Tool) -> Vec<Action> {
        let actions = self.state.borrow_mut().core.set_tool(tool);
        self.scheduler.resume();
        self.dispatch(&actions);
        actions
    }

    // --- Viewport / rendering ---

    /// Record the new container size now; surfaces follow once resizing settles.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.state.borrow_mut().core.set_viewport(viewport);
        self.scheduler.request_resize();
    }

    pub fn request_redraw(&self) {
        self.scheduler.request_redraw();
    }

    /// Paint every layer immediately. Returns the layers whose pass failed.
    pub fn render_now(&self) -> Vec<Layer> {
        self.state.borrow_mut().render_all()
    }

    /// A callback that requests a redraw, for asynchronous sources such as
    /// image decoding.
    #[must_use]
    pub fn redraw_requester(&self) -> Rc<dyn Fn()> {
        self.scheduler.requester()
    }

    // --- Store access ---

    pub fn with_store<R>(&self, read: impl FnOnce(&M) -> R) -> R {
        read(&self.state.borrow().core.store)
    }

    /// Mutate the store from outside the engine (panel actions) and redraw.
    pub fn with_store_mut<R>(&self, write: impl FnOnce(&mut M) -> R) -> R {
        let result = write(&mut self.state.borrow_mut().core.store);
        self.scheduler.request_redraw();
        result
    }

    pub fn with_layers_mut<R>(&self, access: impl FnOnce(&mut LayerSet<S>) -> R) -> R {
        access(&mut self.state.borrow_mut().layers)
    }

    // --- Queries ---

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.state.borrow().core.tool
    }

    #[must_use]
    pub fn input(&self) -> InputState {
        self.state.borrow().core.input.clone()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.state.borrow().core.camera()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.state.borrow().core.viewport
    }

    #[must_use]
    pub fn is_redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    #[must_use]
    pub fn is_redraw_suspended(&self) -> bool {
        self.scheduler.is_suspended()
    }

    /// Cancel pending redraws and refuse new ones.
    pub fn teardown(&self) {
        self.scheduler.teardown();
    }

    fn dispatch(&self, actions: &[Action]) {
        if actions.iter().any(|a| matches!(a, Action::RenderNeeded)) {
            self.scheduler.request_redraw();
        }
    }
}

fn redraw<M: MapStore, S: Surface>(state: &Weak<RefCell<EngineState<M, S>>>) {
    let Some(state) = state.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => {
            let failed = state.render_all();
            if !failed.is_empty() {
                log::debug!("redraw finished with {} failed pass(es)", failed.len());
            }
        }
        Err(e) => log::warn!("skipping redraw: engine busy ({e})"),
    }
}

fn resize<M: MapStore, S: Surface>(state: &Weak<RefCell<EngineState<M, S>>>) {
    let Some(state) = state.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => {
            let viewport = state.core.viewport;
            state.layers.resize_all(&viewport);
        }
        Err(e) => log::warn!("skipping resize: engine busy ({e})"),
    }
}
