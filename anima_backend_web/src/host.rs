// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM implementation of the host contract.
//!
//! [`DomHost`] writes inline styles through `HTMLElement.style`, reads
//! computed styles through `getComputedStyle`, listens for the (possibly
//! prefixed) transition-end event, and schedules callbacks with
//! `setTimeout`.
//!
//! Every JS callback is a [`Closure`] owned by the host. Closures that have
//! fired or been removed are parked and dropped from a separate zero-delay
//! task, never from inside their own invocation.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, Window};

use anima_core::host::{Host, HostCallback};
use anima_core::id::{ListenerId, TimerId};
use anima_core::time::{Duration, HostTime};

// Direct global bindings instead of `web_sys::Window` methods, so timers and
// the clock work without fetching the Window object on every call.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

type TimerClosure = Closure<dyn FnMut()>;
type ListenerClosure = Closure<dyn FnMut(Event)>;

struct Listener {
    element: HtmlElement,
    event: String,
    closure: ListenerClosure,
}

/// Closures that are no longer registered and wait to be dropped.
#[derive(Default)]
struct Parked {
    timers: Vec<TimerClosure>,
    listeners: Vec<ListenerClosure>,
}

impl Parked {
    fn len(&self) -> usize {
        self.timers.len() + self.listeners.len()
    }
}

struct Inner {
    window: Window,
    next_listener: Cell<u32>,
    timers: RefCell<BTreeMap<i32, TimerClosure>>,
    listeners: RefCell<BTreeMap<u32, Listener>>,
    parked: RefCell<Parked>,
    sweep_scheduled: Cell<bool>,
}

impl Inner {
    fn park(self: &Rc<Self>, store: impl FnOnce(&mut Parked)) {
        store(&mut self.parked.borrow_mut());
        if self.sweep_scheduled.replace(true) {
            return;
        }
        let weak = Rc::downgrade(self);
        let sweep = Closure::once_into_js(move || {
            if let Some(inner) = weak.upgrade() {
                inner.sweep_scheduled.set(false);
                let parked = core::mem::take(&mut *inner.parked.borrow_mut());
                drop(parked);
            }
        });
        set_timeout(&sweep, 0);
    }

    fn timer_fired(self: &Rc<Self>, id: i32) {
        let closure = self.timers.borrow_mut().remove(&id);
        if let Some(closure) = closure {
            self.park(|parked| parked.timers.push(closure));
        }
    }
}

/// A [`Host`] backed by the browser DOM.
///
/// Targets are [`HtmlElement`]s. Clones share the same timers and listeners.
#[derive(Clone)]
pub struct DomHost {
    inner: Rc<Inner>,
}

impl DomHost {
    /// Creates a host for the global `window`, or `None` outside a browser
    /// main thread.
    #[must_use]
    pub fn new() -> Option<Self> {
        web_sys::window().map(Self::with_window)
    }

    /// Creates a host for `window`.
    #[must_use]
    pub fn with_window(window: Window) -> Self {
        Self {
            inner: Rc::new(Inner {
                window,
                next_listener: Cell::new(0),
                timers: RefCell::new(BTreeMap::new()),
                listeners: RefCell::new(BTreeMap::new()),
                parked: RefCell::new(Parked::default()),
                sweep_scheduled: Cell::new(false),
            }),
        }
    }

    /// The window this host reads computed styles from.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    /// Number of timers that have neither fired nor been cleared.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Number of registered transition-end listeners.
    #[must_use]
    pub fn live_listeners(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl Host for DomHost {
    type Target = HtmlElement;

    fn set_style(&self, target: &HtmlElement, key: &str, value: &str) {
        let style = target.style();
        // Style writes that the engine rejects are dropped.
        if value.is_empty() {
            let _ = style.remove_property(key);
        } else {
            let _ = style.set_property(key, value);
        }
    }

    fn inline_style(&self, target: &HtmlElement, key: &str) -> Option<String> {
        target
            .style()
            .get_property_value(key)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn computed_style(&self, target: &HtmlElement, key: &str) -> Option<String> {
        self.inner
            .window
            .get_computed_style(target)
            .ok()
            .flatten()?
            .get_property_value(key)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn listen_transition_end(
        &self,
        target: &HtmlElement,
        event: &str,
        callback: HostCallback,
    ) -> ListenerId {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id.wrapping_add(1));

        // Transition-end bubbles, so events from descendants are ignored.
        let watched = target.clone();
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let own_event = event.target().is_some_and(|origin| {
                let origin: &JsValue = origin.as_ref();
                let watched: &JsValue = watched.as_ref();
                origin == watched
            });
            if own_event && let Some(callback) = callback.take() {
                callback();
            }
        }) as Box<dyn FnMut(Event)>);

        let _ = target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        self.inner.listeners.borrow_mut().insert(
            id,
            Listener {
                element: target.clone(),
                event: String::from(event),
                closure,
            },
        );
        ListenerId(id)
    }

    fn unlisten(&self, _target: &HtmlElement, listener: ListenerId) {
        let removed = self.inner.listeners.borrow_mut().remove(&listener.0);
        if let Some(listener) = removed {
            let _ = listener.element.remove_event_listener_with_callback(
                &listener.event,
                listener.closure.as_ref().unchecked_ref(),
            );
            self.inner
                .park(|parked| parked.listeners.push(listener.closure));
        }
    }

    fn set_timeout(&self, delay: Duration, callback: HostCallback) -> TimerId {
        let slot: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let own_id = Rc::clone(&slot);
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(callback) = callback.take() {
                callback();
            }
            if let (Some(inner), Some(id)) = (weak.upgrade(), own_id.get()) {
                inner.timer_fired(id);
            }
        }) as Box<dyn FnMut()>);

        let id = set_timeout(closure.as_ref(), crate::timeout_millis(delay));
        slot.set(Some(id));
        self.inner.timers.borrow_mut().insert(id, closure);
        TimerId(id.cast_unsigned())
    }

    fn clear_timeout(&self, timer: TimerId) {
        let id = timer.0.cast_signed();
        clear_timeout(id);
        self.inner.timer_fired(id);
    }

    fn now(&self) -> HostTime {
        crate::host_time_from_millis(performance_now())
    }
}

impl core::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomHost")
            .field("timers", &self.inner.timers.borrow().len())
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("parked", &self.inner.parked.borrow().len())
            .finish_non_exhaustive()
    }
}
