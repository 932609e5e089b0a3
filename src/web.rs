//! Browser wiring: mount the engine on four stacked canvases inside a container.
//!
//! Pointer and wheel listeners go on the container; positions are taken
//! relative to its bounding box. A window `resize` listener feeds the
//! scheduler's resize debounce. Dropping or unmounting the [`BattleMap`]
//! removes every listener and cancels pending timers.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement, HtmlElement, PointerEvent, WheelEvent, Window};

use crate::camera::{Point, Rect, Viewport};
use crate::config::EngineConfig;
use crate::engine::{Action, Engine};
use crate::error::MountError;
use crate::input::{Button, Tool, WheelDelta};
use crate::layers::{Layer, LayerSet};
use crate::scene::SceneStore;
use crate::scheduler::GlooTimer;
use crate::surface::CanvasSurface;

/// The engine as mounted in a browser.
pub type BrowserEngine = Engine<SceneStore, CanvasSurface, GlooTimer>;

/// Install the console logger at `level` and route panics to the console.
///
/// # Errors
///
/// Fails if a logger is already installed.
pub fn init_logging(level: log::Level) -> Result<(), log::SetLoggerError> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(level)
}

/// The element the canvases are stacked in.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    element: HtmlElement,
}

impl ContainerHandle {
    #[must_use]
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// Bounding box in CSS pixels, relative to the page viewport.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let rect = self.element.get_bounding_client_rect();
        Rect { left: rect.left(), top: rect.top(), right: rect.right(), bottom: rect.bottom() }
    }

    /// Container size and the window's device-pixel ratio.
    #[must_use]
    pub fn viewport(&self, window: &Window) -> Viewport {
        let bounds = self.bounds();
        Viewport::new(bounds.width().max(1.0), bounds.height().max(1.0), window.device_pixel_ratio().max(1.0))
    }

    /// Map a client-space pointer position into container-local CSS pixels.
    fn local_point(&self, client_x: i32, client_y: i32) -> Point {
        let bounds = self.bounds();
        Point::new(f64::from(client_x) - bounds.left, f64::from(client_y) - bounds.top)
    }
}

/// A registered DOM listener. Removed explicitly on unmount.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn add(
        target: &EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(Event)>,
        options: Option<&AddEventListenerOptions>,
    ) -> Result<Self, MountError> {
        let function = callback.as_ref().unchecked_ref();
        match options {
            Some(options) => {
                target.add_event_listener_with_callback_and_add_event_listener_options(kind, function, options)?;
            }
            None => target.add_event_listener_with_callback(kind, function)?,
        }
        Ok(Self { target: target.clone(), kind, callback })
    }

    fn remove(&self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove {} listener: {e:?}", self.kind);
        }
    }
}

/// A mounted battle map.
pub struct BattleMap {
    engine: Rc<BrowserEngine>,
    container: ContainerHandle,
    window: Window,
    listeners: Vec<Listener>,
}

/// Mount the engine. `canvases` are the background, grid, tokens and overlay
/// canvases, bottom to top, already stacked inside `container`.
///
/// # Errors
///
/// Returns [`MountError`] if the config is invalid, there is no window, a
/// canvas has no 2D context, or a listener cannot be registered.
pub fn mount(
    container: HtmlElement,
    canvases: [HtmlCanvasElement; 4],
    store: SceneStore,
    config: EngineConfig,
) -> Result<BattleMap, MountError> {
    config.validate()?;
    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let container = ContainerHandle::new(container);

    let [background, grid, tokens, overlay] = canvases;
    let layers = LayerSet::with_surfaces(
        CanvasSurface::new(background)?,
        CanvasSurface::new(grid)?,
        CanvasSurface::new(tokens)?,
        CanvasSurface::new(overlay)?,
    );
    let viewport = container.viewport(&window);
    let engine = Rc::new(Engine::new(store, layers, config, viewport, GlooTimer));

    let request = engine.redraw_requester();
    engine.with_layers_mut(|layers| {
        if let Some(surface) = layers.surface_mut(Layer::Background) {
            surface.set_on_image_load(request);
        }
    });

    let mut map = BattleMap { engine, container, window, listeners: Vec::new() };
    map.attach_listeners()?;

    let failed = map.engine.render_now();
    if !failed.is_empty() {
        log::warn!("initial paint failed for {} layer(s)", failed.len());
    }
    log::debug!("battle map mounted at {}x{} (dpr {})", viewport.width, viewport.height, viewport.dpr);
    Ok(map)
}

impl BattleMap {
    fn attach_listeners(&mut self) -> Result<(), MountError> {
        let target: EventTarget = self.container.element().clone().into();

        let down = self.pointer_listener(|engine, point, ev| match Button::from_dom(ev.button()) {
            Some(button) => engine.on_pointer_down(point, button),
            None => Vec::new(),
        });
        self.listeners.push(Listener::add(&target, "pointerdown", down, None)?);

        let moved = self.pointer_listener(|engine, point, _| engine.on_pointer_move(point));
        self.listeners.push(Listener::add(&target, "pointermove", moved, None)?);

        let up = self.pointer_listener(|engine, _, _| engine.on_pointer_up());
        self.listeners.push(Listener::add(&target, "pointerup", up, None)?);

        for kind in ["pointerleave", "pointercancel"] {
            let cancel = self.pointer_listener(|engine, _, _| engine.on_pointer_cancel());
            self.listeners.push(Listener::add(&target, kind, cancel, None)?);
        }

        let wheel = {
            let engine = Rc::clone(&self.engine);
            let container = self.container.clone();
            Closure::wrap(Box::new(move |event: Event| {
                let Some(ev) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                ev.prevent_default();
                let point = container.local_point(ev.client_x(), ev.client_y());
                let actions = engine.on_wheel(point, WheelDelta { dx: ev.delta_x(), dy: ev.delta_y() });
                trace_actions("wheel", &actions);
            }) as Box<dyn FnMut(Event)>)
        };
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        self.listeners.push(Listener::add(&target, "wheel", wheel, Some(&options))?);

        let resize = {
            let engine = Rc::clone(&self.engine);
            let container = self.container.clone();
            let window = self.window.clone();
            Closure::wrap(Box::new(move |_event: Event| {
                engine.set_viewport(container.viewport(&window));
            }) as Box<dyn FnMut(Event)>)
        };
        let window_target: EventTarget = self.window.clone().into();
        self.listeners.push(Listener::add(&window_target, "resize", resize, None)?);
        Ok(())
    }

    fn pointer_listener(
        &self,
        handle: impl Fn(&BrowserEngine, Point, &PointerEvent) -> Vec<Action> + 'static,
    ) -> Closure<dyn FnMut(Event)> {
        let engine = Rc::clone(&self.engine);
        let container = self.container.clone();
        Closure::wrap(Box::new(move |event: Event| {
            let Some(ev) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let point = container.local_point(ev.client_x(), ev.client_y());
            let actions = handle(&engine, point, ev);
            trace_actions(&event.type_(), &actions);
        }) as Box<dyn FnMut(Event)>)
    }

    #[must_use]
    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }

    /// Container bounding box in CSS pixels.
    #[must_use]
    pub fn container_bounds(&self) -> Rect {
        self.container.bounds()
    }

    #[must_use]
    pub fn engine(&self) -> &BrowserEngine {
        &self.engine
    }

    pub fn set_tool(&self, tool: Tool) -> Vec<Action> {
        self.engine.set_tool(tool)
    }

    pub fn with_store<R>(&self, read: impl FnOnce(&SceneStore) -> R) -> R {
        self.engine.with_store(read)
    }

    /// Mutate the store and schedule a redraw.
    pub fn with_store_mut<R>(&self, write: impl FnOnce(&mut SceneStore) -> R) -> R {
        self.engine.with_store_mut(write)
    }

    /// Re-read the container size now instead of waiting for a window resize.
    pub fn refresh_viewport(&self) {
        self.engine.set_viewport(self.container.viewport(&self.window));
    }

    /// Remove every listener and cancel pending redraws.
    pub fn unmount(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.remove();
        }
        self.engine.teardown();
    }
}

impl Drop for BattleMap {
    fn drop(&mut self) {
        self.detach();
    }
}

fn trace_actions(kind: &str, actions: &[Action]) {
    if !actions.is_empty() {
        log::trace!("{kind}: {actions:?}");
    }
}
