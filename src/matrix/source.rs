// ============================================================================
// mkr-signals - Event Source
// The native event capability the matrix multiplexes onto
// ============================================================================

use super::trigger::Trigger;

/// Anything that can carry native event listeners.
///
/// Implementors are cheap handles with stable identity (a DOM node, an
/// `Rc`-backed in-process target, ...). The matrix attaches at most one
/// native listener per target and event type through this trait.
pub trait EventSource: Clone + 'static {
    /// Payload delivered by the platform for every native event.
    type Event: 'static;

    /// Whatever the platform needs to later remove an attached listener.
    type Handle;

    /// Identity comparison. Never structural equality.
    fn same_target(&self, other: &Self) -> bool;

    /// Attach `trigger` as a native listener for `event_type`.
    ///
    /// The platform must call [`Trigger::invoke`] with the native event
    /// every time `event_type` fires on this target. Returns `None` when the
    /// platform refused the listener; nothing is attached in that case.
    fn attach(&self, event_type: &str, trigger: Trigger<Self>) -> Option<Self::Handle>;

    /// Remove a listener previously returned by [`attach`](Self::attach).
    fn detach(&self, event_type: &str, handle: Self::Handle);
}
