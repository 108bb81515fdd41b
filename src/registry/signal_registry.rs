// ============================================================================
// mkr-signals - Signal Registry
//
// Ordered listener bindings for one event type on one target.
// ============================================================================
//
// Bindings are kept sorted by priority (descending). A new binding goes
// after every binding with the same or higher priority, so equal
// priorities fire in registration order.
//
// Dispatch works on a snapshot of the binding list:
// - bindings removed mid-dispatch are skipped for the rest of it
// - bindings added mid-dispatch first fire on the next dispatch
// - a once-binding is marked fired before it runs and removed after
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{error, warn};

use super::binding::Binding;
use super::options::{DispatchOptions, FailurePolicy};
use crate::core::error::{ListenerError, Result};
use crate::core::types::{Context, Dispatch, Listener};

/// Payload of a panic caught while dispatching.
pub(crate) type PanicPayload = Box<dyn Any + Send + 'static>;

// =============================================================================
// SIGNAL REGISTRY
// =============================================================================

/// Ordered listener bindings for a single event type.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use mkr_signals::{listener, Context, SignalRegistry};
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let registry = SignalRegistry::<&str>::new();
///
/// let low = { let log = log.clone(); listener(move |_| log.borrow_mut().push("low")) };
/// let high = { let log = log.clone(); listener(move |_| log.borrow_mut().push("high")) };
///
/// registry.add(low, Context::none(), 0).unwrap();
/// registry.add(high, Context::none(), 5).unwrap();
/// registry.dispatch(&"click");
///
/// assert_eq!(*log.borrow(), vec!["high", "low"]);
/// ```
pub struct SignalRegistry<E> {
    bindings: RefCell<Vec<Rc<Binding<E>>>>,

    /// Set by `halt()`; read by the running dispatch
    halted: Cell<bool>,

    /// Inactive registries ignore dispatch
    active: Cell<bool>,

    disposed: Cell<bool>,

    options: DispatchOptions,
}

impl<E: 'static> SignalRegistry<E> {
    pub fn new() -> Self {
        Self::with_options(DispatchOptions::default())
    }

    pub fn with_options(options: DispatchOptions) -> Self {
        Self {
            bindings: RefCell::new(Vec::new()),
            halted: Cell::new(false),
            active: Cell::new(true),
            disposed: Cell::new(false),
            options,
        }
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Register a persistent listener.
    ///
    /// Re-adding a `(listener, context)` pair that is already bound returns
    /// the existing binding unchanged. Fails with
    /// [`ListenerError::ConflictingListener`] if that pair is bound as a
    /// once-listener.
    pub fn add(
        &self,
        listener: impl Into<Option<Listener<E>>>,
        context: Context,
        priority: i32,
    ) -> Result<Rc<Binding<E>>> {
        self.register(listener.into(), context, priority, false)
    }

    /// Register a listener that is removed after its first invocation.
    pub fn add_once(
        &self,
        listener: impl Into<Option<Listener<E>>>,
        context: Context,
        priority: i32,
    ) -> Result<Rc<Binding<E>>> {
        self.register(listener.into(), context, priority, true)
    }

    fn register(
        &self,
        listener: Option<Listener<E>>,
        context: Context,
        priority: i32,
        once: bool,
    ) -> Result<Rc<Binding<E>>> {
        let listener = listener.ok_or(ListenerError::InvalidListener)?;
        if self.disposed.get() {
            return Err(ListenerError::Disposed);
        }

        if let Some(existing) = self.find(&listener, &context) {
            if existing.is_once() != once {
                warn!(
                    existing_once = existing.is_once(),
                    requested_once = once,
                    "listener re-registered with a different once flag"
                );
                return Err(ListenerError::ConflictingListener {
                    existing_once: existing.is_once(),
                    requested_once: once,
                });
            }
            return Ok(existing);
        }

        let binding = Rc::new(Binding::new(listener, context, priority, once));
        let mut bindings = self.bindings.borrow_mut();
        let index = bindings
            .iter()
            .position(|b| b.priority() < priority)
            .unwrap_or(bindings.len());
        bindings.insert(index, binding.clone());
        Ok(binding)
    }

    /// Live binding for the pair, ignoring once-bindings that already fired.
    fn find(&self, listener: &Listener<E>, context: &Context) -> Option<Rc<Binding<E>>> {
        self.bindings
            .borrow()
            .iter()
            .find(|b| !b.has_fired() && b.matches(listener, context))
            .cloned()
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    /// Remove the binding for `(listener, context)`. No-op when absent.
    pub fn remove(&self, listener: &Listener<E>, context: &Context) {
        let removed: Vec<_> = {
            let mut bindings = self.bindings.borrow_mut();
            let (removed, kept): (Vec<_>, Vec<_>) = bindings
                .drain(..)
                .partition(|b| b.matches(listener, context));
            *bindings = kept;
            removed
        };
        for binding in removed {
            binding.unbind();
        }
    }

    pub fn remove_all(&self) {
        let removed: Vec<_> = self.bindings.borrow_mut().drain(..).collect();
        for binding in removed {
            binding.unbind();
        }
    }

    /// Remove every binding and refuse further registrations.
    pub fn dispose(&self) {
        self.remove_all();
        self.disposed.set(true);
    }

    fn detach(&self, binding: &Rc<Binding<E>>) {
        self.bindings
            .borrow_mut()
            .retain(|b| !Rc::ptr_eq(b, binding));
        binding.unbind();
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn has(&self, listener: &Listener<E>, context: &Context) -> bool {
        self.find(listener, context).is_some()
    }

    /// Number of bindings that can still fire.
    pub fn listener_count(&self) -> usize {
        self.bindings
            .borrow()
            .iter()
            .filter(|b| !b.has_fired())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.listener_count() == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Pause or resume delivery. Bindings are kept either way.
    pub fn set_active(&self, active: bool) {
        self.active.set(active);
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Stop the running dispatch before the next binding.
    pub fn halt(&self) {
        self.halted.set(true);
    }

    /// Deliver `event` to every binding, highest priority first.
    ///
    /// Under [`FailurePolicy::Propagate`] the first listener panic is
    /// resumed after every binding has had its turn.
    pub fn dispatch(&self, event: &E) {
        let panicked = self.dispatch_collect(event);
        self.finish(panicked);
    }

    /// Run the dispatch and hand back the first panic instead of resuming it.
    pub(crate) fn dispatch_collect(&self, event: &E) -> Option<PanicPayload> {
        if !self.active.get() || self.disposed.get() {
            return None;
        }

        // Snapshot so listeners can add/remove while we iterate
        let snapshot: Vec<Rc<Binding<E>>> = self.bindings.borrow().clone();
        let outer_halted = self.halted.replace(false);
        let mut first_panic = None;

        for binding in &snapshot {
            if self.halted.get() {
                break;
            }
            if !binding.is_bound() {
                continue;
            }
            if binding.is_once() {
                binding.mark_fired();
            }

            let call = Dispatch::new(
                event,
                binding.context(),
                binding.priority(),
                binding.is_once(),
                &self.halted,
            );
            let result = panic::catch_unwind(AssertUnwindSafe(|| binding.listener().call(&call)));

            if binding.is_once() {
                self.detach(binding);
            }

            if let Err(payload) = result {
                error!(
                    priority = binding.priority(),
                    once = binding.is_once(),
                    panic = panic_message(payload.as_ref()),
                    "listener panicked during dispatch"
                );
                if first_panic.is_none() {
                    first_panic = Some(payload);
                }
            }
        }

        self.halted.set(outer_halted);
        first_panic
    }

    pub(crate) fn finish(&self, panicked: Option<PanicPayload>) {
        if let (FailurePolicy::Propagate, Some(payload)) = (self.options.failure_policy, panicked) {
            panic::resume_unwind(payload);
        }
    }
}

impl<E: 'static> Default for SignalRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for SignalRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRegistry")
            .field("bindings", &self.bindings.borrow().len())
            .field("active", &self.active.get())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// =============================================================================
// TESTS
// =============================================================================
