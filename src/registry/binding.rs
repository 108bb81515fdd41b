// ============================================================================
// mkr-signals - Binding
// One logical (listener, context, priority, once) registration
// ============================================================================

use std::cell::Cell;

use crate::core::types::{Context, Listener};

/// A listener registered on a [`SignalRegistry`](super::SignalRegistry).
///
/// Bindings are owned by their registry; the handle returned from `add`
/// is read-only. Identity for lookup and removal is the
/// `(listener, context)` pair, never the priority or the `once` flag.
pub struct Binding<E> {
    listener: Listener<E>,
    context: Context,
    priority: i32,
    once: bool,

    /// Cleared when the registry drops the binding
    bound: Cell<bool>,

    /// Set on a once-binding right before its single invocation
    fired: Cell<bool>,
}

impl<E> Binding<E> {
    pub(crate) fn new(listener: Listener<E>, context: Context, priority: i32, once: bool) -> Self {
        Self {
            listener,
            context,
            priority,
            once,
            bound: Cell::new(true),
            fired: Cell::new(false),
        }
    }

    pub fn listener(&self) -> &Listener<E> {
        &self.listener
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Whether the binding is still registered and can still fire.
    pub fn is_bound(&self) -> bool {
        self.bound.get() && !self.fired.get()
    }

    pub(crate) fn matches(&self, listener: &Listener<E>, context: &Context) -> bool {
        self.listener.ptr_eq(listener) && self.context.same(context)
    }

    pub(crate) fn has_fired(&self) -> bool {
        self.fired.get()
    }

    pub(crate) fn mark_fired(&self) {
        self.fired.set(true);
    }

    pub(crate) fn unbind(&self) {
        self.bound.set(false);
    }
}

impl<E> std::fmt::Debug for Binding<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("listener", &self.listener)
            .field("context", &self.context)
            .field("priority", &self.priority)
            .field("once", &self.once)
            .field("bound", &self.is_bound())
            .finish()
    }
}
