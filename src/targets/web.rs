// ============================================================================
// mkr-signals - Web Targets
// Native event source for browser EventTargets and CSS selector targets
// ============================================================================
//
// Each native listener owns its wasm-bindgen closure. A trigger may detach
// its own listener while it runs (the last once-listener fired), so a
// closure detached during a dispatch is parked and freed by the next
// attach/detach that happens outside any dispatch.
// ============================================================================

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, EventTarget};

use tracing::{error, warn};

use super::Targets;
use crate::events::{Events, GlobalMatrix};
use crate::matrix::{EventSource, Trigger};

type NativeClosure = Closure<dyn Fn(Event)>;

thread_local! {
    /// Triggers currently on the stack
    static DISPATCH_DEPTH: Cell<usize> = const { Cell::new(0) };

    /// Closures detached while a trigger was running
    static RETIRED: RefCell<Vec<NativeClosure>> = const { RefCell::new(Vec::new()) };
}

/// Decrements the dispatch depth when the trigger returns or unwinds.
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Self {
        DISPATCH_DEPTH.with(|d| d.set(d.get() + 1));
        DispatchGuard
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

fn in_dispatch() -> bool {
    DISPATCH_DEPTH.with(|d| d.get() > 0)
}

/// Free parked closures once no trigger can still be running one of them.
fn free_retired() {
    if in_dispatch() {
        return;
    }
    let retired = RETIRED.with(|r| r.take());
    drop(retired);
}

// =============================================================================
// EVENT SOURCE
// =============================================================================

/// A native listener attached to an [`EventTarget`].
pub struct WebListener {
    closure: NativeClosure,
}

impl WebListener {
    fn function(&self) -> &js_sys::Function {
        self.closure.as_ref().unchecked_ref()
    }
}

impl std::fmt::Debug for WebListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebListener").finish_non_exhaustive()
    }
}

impl EventSource for EventTarget {
    type Event = Event;
    type Handle = WebListener;

    fn same_target(&self, other: &Self) -> bool {
        js_sys::Object::is(self.as_ref(), other.as_ref())
    }

    fn attach(&self, event_type: &str, trigger: Trigger<Self>) -> Option<WebListener> {
        free_retired();

        let closure = NativeClosure::new(move |event: Event| {
            let _guard = DispatchGuard::enter();
            trigger.invoke(&event);
        });
        let listener = WebListener { closure };

        match self.add_event_listener_with_callback(event_type, listener.function()) {
            Ok(()) => Some(listener),
            Err(err) => {
                error!(event_type, ?err, "addEventListener failed");
                None
            }
        }
    }

    fn detach(&self, event_type: &str, handle: WebListener) {
        if let Err(err) = self.remove_event_listener_with_callback(event_type, handle.function()) {
            error!(event_type, ?err, "removeEventListener failed");
        }

        if in_dispatch() {
            RETIRED.with(|r| r.borrow_mut().push(handle.closure));
        } else {
            drop(handle);
            free_retired();
        }
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

/// Every element in the document matching `selector`.
///
/// Resolves to nothing (with a warning) when there is no document or the
/// selector does not parse.
pub fn select(selector: &str) -> Vec<EventTarget> {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        warn!(selector, "no document to resolve selector against");
        return Vec::new();
    };
    match document.query_selector_all(selector) {
        Ok(nodes) => (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .map(EventTarget::from)
            .collect(),
        Err(err) => {
            warn!(selector, ?err, "invalid selector");
            Vec::new()
        }
    }
}

impl Targets<EventTarget> for &str {
    fn into_targets(self) -> Vec<EventTarget> {
        select(self)
    }
}

impl Targets<EventTarget> for String {
    fn into_targets(self) -> Vec<EventTarget> {
        select(&self)
    }
}

// =============================================================================
// DEFAULT MATRIX
// =============================================================================

thread_local! {
    /// Listener bookkeeping for the page
    static WEB_EVENTS: Events<EventTarget> = Events::new();
}

impl GlobalMatrix for EventTarget {
    fn with_global<R>(f: impl FnOnce(&Events<Self>) -> R) -> R {
        WEB_EVENTS.with(f)
    }
}

// =============================================================================
// TESTS
// =============================================================================
