//! Redraw scheduling: coalescing, drag suppression, and resize settling.
//!
//! Mutations ask for a redraw as often as they like; at most one redraw is
//! pending at a time and it runs once the redraw interval elapses, reading
//! whatever state is current by then. While a drag is in progress the
//! scheduler is suspended: redraws that come due are remembered instead of
//! run, and one redraw is issued on resume.
//!
//! Resizes are debounced separately. When the quiet period ends the resize
//! callback runs, and a redraw follows after a short settle delay.
//!
//! Timer callbacks only hold a [`Weak`] reference to the scheduler state, and
//! dropping a timer handle cancels it, so nothing fires after teardown.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;

use crate::config::EngineConfig;

/// One-shot timer source.
pub trait Timer {
    /// Dropping the handle cancels the callback if it has not fired yet.
    type Handle: 'static;

    fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers over `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    type Handle = Timeout;

    fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, callback)
    }
}

/// Delays the scheduler runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTimings {
    pub redraw_ms: u32,
    pub resize_debounce_ms: u32,
    pub resize_settle_ms: u32,
}

impl SchedulerTimings {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            redraw_ms: config.redraw_interval_ms,
            resize_debounce_ms: config.resize_debounce_ms,
            resize_settle_ms: config.resize_settle_ms,
        }
    }
}

impl Default for SchedulerTimings {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

struct Inner<T: Timer> {
    timer: T,
    timings: SchedulerTimings,
    pending: Cell<bool>,
    suspended: Cell<bool>,
    deferred: Cell<bool>,
    torn_down: Cell<bool>,
    redraw_handle: RefCell<Option<T::Handle>>,
    resize_handle: RefCell<Option<T::Handle>>,
    settle_handle: RefCell<Option<T::Handle>>,
    redraw: Box<dyn Fn()>,
    resize: Box<dyn Fn()>,
}

/// Coalescing redraw scheduler.
pub struct RedrawScheduler<T: Timer + 'static> {
    inner: Rc<Inner<T>>,
}

impl<T: Timer + 'static> RedrawScheduler<T> {
    /// Create a scheduler that calls `redraw` for full repaints and `resize`
    /// when a debounced resize fires.
    pub fn new(timer: T, timings: SchedulerTimings, redraw: impl Fn() + 'static, resize: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                timer,
                timings,
                pending: Cell::new(false),
                suspended: Cell::new(false),
                deferred: Cell::new(false),
                torn_down: Cell::new(false),
                redraw_handle: RefCell::new(None),
                resize_handle: RefCell::new(None),
                settle_handle: RefCell::new(None),
                redraw: Box::new(redraw),
                resize: Box::new(resize),
            }),
        }
    }

    /// Ask for a full redraw. Requests made while one is pending coalesce into it.
    pub fn request_redraw(&self) {
        request_redraw(&self.inner);
    }

    /// A detached callback that requests a redraw. It does nothing once the
    /// scheduler is gone.
    #[must_use]
    pub fn requester(&self) -> Rc<dyn Fn()> {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                request_redraw(&inner);
            }
        })
    }

    /// Hold redraws while a drag is in progress.
    pub fn suspend(&self) {
        self.inner.suspended.set(true);
    }

    /// End suspension, redrawing once if anything was held back.
    pub fn resume(&self) {
        let inner = &self.inner;
        inner.suspended.set(false);
        if inner.deferred.replace(false) {
            log::trace!("resuming with a deferred redraw");
            request_redraw(inner);
        }
    }

    /// Restart the resize debounce.
    pub fn request_resize(&self) {
        let inner = &self.inner;
        if inner.torn_down.get() {
            return;
        }
        let weak = Rc::downgrade(inner);
        let handle = inner.timer.start(
            inner.timings.resize_debounce_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    fire_resize(&inner);
                }
            }),
        );
        // Replacing the handle drops and cancels the previous debounce.
        *inner.resize_handle.borrow_mut() = Some(handle);
    }

    /// Cancel every pending timer. The scheduler stays usable.
    pub fn cancel(&self) {
        let inner = &self.inner;
        inner.pending.set(false);
        inner.deferred.set(false);
        *inner.redraw_handle.borrow_mut() = None;
        *inner.resize_handle.borrow_mut() = None;
        *inner.settle_handle.borrow_mut() = None;
    }

    /// Cancel everything and refuse further requests.
    pub fn teardown(&self) {
        self.inner.torn_down.set(true);
        self.cancel();
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.inner.suspended.get()
    }
}

impl<T: Timer + 'static> Drop for RedrawScheduler<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn request_redraw<T: Timer + 'static>(inner: &Rc<Inner<T>>) {
    if inner.torn_down.get() || inner.pending.get() {
        return;
    }
    inner.pending.set(true);
    let weak: Weak<Inner<T>> = Rc::downgrade(inner);
    let handle = inner.timer.start(
        inner.timings.redraw_ms,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                fire_redraw(&inner);
            }
        }),
    );
    *inner.redraw_handle.borrow_mut() = Some(handle);
}

fn fire_redraw<T: Timer>(inner: &Inner<T>) {
    inner.pending.set(false);
    if inner.torn_down.get() {
        return;
    }
    if inner.suspended.get() {
        inner.deferred.set(true);
        return;
    }
    (inner.redraw)();
}

fn fire_resize<T: Timer + 'static>(inner: &Rc<Inner<T>>) {
    if inner.torn_down.get() {
        return;
    }
    (inner.resize)();
    let weak = Rc::downgrade(inner);
    let handle = inner.timer.start(
        inner.timings.resize_settle_ms,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                request_redraw(&inner);
            }
        }),
    );
    *inner.settle_handle.borrow_mut() = Some(handle);
}
