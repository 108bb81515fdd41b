// ============================================================================
// mkr-signals - Local Targets
// An in-process event source with DOM-like listener semantics
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::events::{Events, GlobalMatrix};
use crate::matrix::{EventSource, Trigger};

// =============================================================================
// LOCAL EVENT
// =============================================================================

/// Event payload delivered by a [`LocalTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEvent {
    event_type: String,
    detail: Option<String>,
}

impl LocalEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

// =============================================================================
// LOCAL TARGET
// =============================================================================

/// Identity-stable event source living entirely in Rust.
///
/// Clones share identity. `emit` plays the role of the platform firing a
/// native event: every native listener attached for the event's type is
/// invoked, in attach order.
#[derive(Clone)]
pub struct LocalTarget {
    inner: Rc<LocalTargetInner>,
}

struct LocalTargetInner {
    label: String,
    listeners: RefCell<Vec<NativeListener>>,
    next_id: Cell<u64>,
}

struct NativeListener {
    id: u64,
    event_type: String,
    trigger: Trigger<LocalTarget>,
}

impl LocalTarget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(LocalTargetInner {
                label: label.into(),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Fire `event` on this target. Returns how many native listeners ran.
    pub fn emit(&self, event: &LocalEvent) -> usize {
        let snapshot: Vec<(u64, Trigger<LocalTarget>)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event_type == event.event_type)
            .map(|l| (l.id, l.trigger.clone()))
            .collect();

        let mut invoked = 0;
        for (id, trigger) in snapshot {
            // Listeners detached by an earlier one in this emit are skipped
            if !self.inner.listeners.borrow().iter().any(|l| l.id == id) {
                continue;
            }
            trigger.invoke(event);
            invoked += 1;
        }
        invoked
    }

    /// Native listeners currently attached for `event_type`.
    pub fn native_listener_count(&self, event_type: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event_type == event_type)
            .count()
    }

    pub fn total_native_listeners(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl EventSource for LocalTarget {
    type Event = LocalEvent;
    type Handle = u64;

    fn same_target(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn attach(&self, event_type: &str, trigger: Trigger<Self>) -> Option<u64> {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push(NativeListener {
            id,
            event_type: event_type.to_owned(),
            trigger,
        });
        Some(id)
    }

    fn detach(&self, _event_type: &str, handle: u64) {
        // Take the listener out first so its trigger drops after the borrow ends
        let removed: Vec<NativeListener> = {
            let mut listeners = self.inner.listeners.borrow_mut();
            let (removed, kept): (Vec<_>, Vec<_>) =
                listeners.drain(..).partition(|l| l.id == handle);
            *listeners = kept;
            removed
        };
        drop(removed);
    }
}

impl PartialEq for LocalTarget {
    fn eq(&self, other: &Self) -> bool {
        self.same_target(other)
    }
}

impl Eq for LocalTarget {}

impl fmt::Debug for LocalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTarget")
            .field("label", &self.inner.label)
            .field("native_listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

// =============================================================================
// DEFAULT MATRIX
// =============================================================================

thread_local! {
    /// Default listener bookkeeping for local targets on this thread
    static LOCAL_EVENTS: Events<LocalTarget> = Events::new();
}

impl GlobalMatrix for LocalTarget {
    fn with_global<R>(f: impl FnOnce(&Events<Self>) -> R) -> R {
        LOCAL_EVENTS.with(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{listener, Context};
    use crate::matrix::TriggerMatrix;

    #[test]
    fn clones_share_identity_labels_do_not() {
        let a = LocalTarget::new("x");
        let b = LocalTarget::new("x");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.label(), "x");
    }

    #[test]
    fn emit_only_reaches_matching_type() {
        let matrix = TriggerMatrix::new();
        let el = LocalTarget::new("el");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let l = {
            let seen = seen.clone();
            listener(move |d| {
                let event: &LocalEvent = d.event();
                seen.borrow_mut().push(event.detail().unwrap_or("").to_owned());
            })
        };
        matrix.add(&el, "click", l, Context::none(), 0).unwrap();

        assert_eq!(el.emit(&LocalEvent::new("hover").with_detail("h")), 0);
        assert_eq!(el.emit(&LocalEvent::new("click").with_detail("c")), 1);
        assert_eq!(*seen.borrow(), vec!["c"]);
    }

    #[test]
    fn detach_unknown_handle_is_harmless() {
        let el = LocalTarget::new("el");
        el.detach("click", 42);
        assert_eq!(el.total_native_listeners(), 0);
    }
}
