// ============================================================================
// mkr-signals - Core Types
// Listener handles, receiver contexts and the per-call dispatch view
// ============================================================================

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// LISTENER
// =============================================================================

/// Callback signature for every listener.
pub type ListenerFn<E> = dyn Fn(&Dispatch<'_, E>);

/// A shared, clonable listener callback.
///
/// Identity is the identity of the shared closure: clones of one `Listener`
/// are the same listener, while two listeners built from identical code are
/// different listeners. Registries use this identity (together with the
/// [`Context`]) to find, de-duplicate and remove bindings.
///
/// # Example
///
/// ```
/// use mkr_signals::{listener, Listener};
///
/// let a: Listener<u32> = listener(|d| assert_eq!(*d.event(), 7));
/// let b = a.clone();
/// let c: Listener<u32> = listener(|d| assert_eq!(*d.event(), 7));
///
/// assert!(a.ptr_eq(&b));
/// assert!(!a.ptr_eq(&c));
/// ```
pub struct Listener<E> {
    inner: Rc<ListenerFn<E>>,
}

impl<E: 'static> Listener<E> {
    /// Wrap a closure as a listener.
    pub fn new(f: impl Fn(&Dispatch<'_, E>) + 'static) -> Self {
        Self { inner: Rc::new(f) }
    }
}

impl<E> Listener<E> {
    /// Whether both handles refer to the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        // Compare data pointers only; vtable pointers are not stable.
        Rc::as_ptr(&self.inner) as *const () == Rc::as_ptr(&other.inner) as *const ()
    }

    pub(crate) fn call(&self, dispatch: &Dispatch<'_, E>) {
        (self.inner)(dispatch)
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&(Rc::as_ptr(&self.inner) as *const ()))
            .finish()
    }
}

/// Create a listener from a closure.
pub fn listener<E: 'static>(f: impl Fn(&Dispatch<'_, E>) + 'static) -> Listener<E> {
    Listener::new(f)
}

// =============================================================================
// CONTEXT
// =============================================================================

/// The receiver a binding is registered with.
///
/// A context is either empty or a shared value. Equality is identity:
/// two contexts are equal when both are empty or both point at the same
/// allocation. Structurally equal values in different allocations are
/// different contexts.
#[derive(Clone, Default)]
pub struct Context {
    value: Option<Rc<dyn Any>>,
}

impl Context {
    /// The empty context.
    pub fn none() -> Self {
        Self { value: None }
    }

    /// Allocate a new context holding `value`.
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Some(Rc::new(value)),
        }
    }

    /// Use an existing shared value as the context.
    pub fn from_rc<T: 'static>(value: Rc<T>) -> Self {
        Self {
            value: Some(value as Rc<dyn Any>),
        }
    }

    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    /// Borrow the receiver as `T`, if it is one.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Identity comparison.
    pub fn same(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const (),
            _ => false,
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            None => f.write_str("Context(none)"),
            Some(v) => write!(f, "Context({:p})", Rc::as_ptr(v) as *const ()),
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// What a listener sees while it is being invoked.
///
/// Gives access to the event, the binding's receiver and the control
/// surface of the running dispatch.
pub struct Dispatch<'a, E> {
    event: &'a E,
    context: &'a Context,
    priority: i32,
    once: bool,
    halted: &'a Cell<bool>,
}

impl<'a, E> Dispatch<'a, E> {
    pub(crate) fn new(
        event: &'a E,
        context: &'a Context,
        priority: i32,
        once: bool,
        halted: &'a Cell<bool>,
    ) -> Self {
        Self {
            event,
            context,
            priority,
            once,
            halted,
        }
    }

    pub fn event(&self) -> &'a E {
        self.event
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this invocation belongs to a `once` binding.
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Skip the remaining lower-priority bindings of this dispatch.
    ///
    /// Only the current dispatch is affected; the next event reaches every
    /// binding again.
    pub fn halt(&self) {
        self.halted.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_identity_follows_clones() {
        let a: Listener<()> = listener(|_| {});
        let b = a.clone();
        let c: Listener<()> = listener(|_| {});

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn context_identity_is_by_allocation() {
        let shared = Rc::new(5u8);
        let a = Context::from_rc(shared.clone());
        let b = Context::from_rc(shared);
        let c = Context::new(5u8);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(Context::none(), Context::default());
        assert_ne!(Context::none(), c);
        assert!(Context::default().is_none());
        assert!(!c.is_none());
    }

    #[test]
    fn context_downcast() {
        let ctx = Context::new(String::from("menu"));
        assert_eq!(ctx.downcast_ref::<String>().map(String::as_str), Some("menu"));
        assert!(ctx.downcast_ref::<u32>().is_none());
        assert!(Context::none().downcast_ref::<String>().is_none());
    }

    #[test]
    fn dispatch_halt_sets_flag() {
        let halted = Cell::new(false);
        let ctx = Context::none();
        let d = Dispatch::new(&1u8, &ctx, 3, true, &halted);

        assert_eq!(*d.event(), 1);
        assert_eq!(d.priority(), 3);
        assert!(d.is_once());

        d.halt();
        assert!(halted.get());
    }
}
