// ============================================================================
// mkr-signals - Events API
//
// on / once / off / clear_listeners over a trigger matrix.
// ============================================================================
//
// `Events<S>` owns (or shares) one matrix and is what collaborators hold.
// Every bundled source type also has a thread-local default instance
// reachable through `GlobalMatrix`; the free functions below use it.
// ============================================================================

use crate::core::constants::DEFAULT_PRIORITY;
use crate::core::error::{ListenerError, Result};
use crate::core::types::{Context, Listener};
use crate::matrix::{EventSource, TriggerMatrix};
use crate::registry::DispatchOptions;
use crate::targets::Targets;

// =============================================================================
// EVENTS
// =============================================================================

/// Public listener API bound to one [`TriggerMatrix`].
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use mkr_signals::{listener, Context, Events, LocalEvent, LocalTarget};
///
/// let events = Events::new();
/// let (a, b) = (LocalTarget::new("a"), LocalTarget::new("b"));
/// let hits = Rc::new(Cell::new(0));
///
/// let count = { let hits = hits.clone(); listener(move |_| hits.set(hits.get() + 1)) };
/// events.on(vec![a.clone(), b.clone()], "click", count).unwrap();
///
/// a.emit(&LocalEvent::new("click"));
/// b.emit(&LocalEvent::new("click"));
/// assert_eq!(hits.get(), 2);
///
/// events.off(&a, None, None, &Context::none());
/// a.emit(&LocalEvent::new("click"));
/// assert_eq!(hits.get(), 2);
/// ```
pub struct Events<S: EventSource> {
    matrix: TriggerMatrix<S>,
}

impl<S: EventSource> Events<S> {
    /// API over a fresh matrix.
    pub fn new() -> Self {
        Self::from_matrix(TriggerMatrix::new())
    }

    pub fn with_options(options: DispatchOptions) -> Self {
        Self::from_matrix(TriggerMatrix::with_options(options))
    }

    /// API over an existing matrix (shared with whoever else holds it).
    pub fn from_matrix(matrix: TriggerMatrix<S>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &TriggerMatrix<S> {
        &self.matrix
    }

    // =========================================================================
    // ON / ONCE
    // =========================================================================

    /// Bind `listener` on every resolved target with no context and the
    /// default priority.
    pub fn on(
        &self,
        targets: impl Targets<S>,
        event_type: &str,
        listener: impl Into<Option<Listener<S::Event>>>,
    ) -> Result<()> {
        self.on_with(targets, event_type, listener, Context::none(), DEFAULT_PRIORITY)
    }

    pub fn on_with(
        &self,
        targets: impl Targets<S>,
        event_type: &str,
        listener: impl Into<Option<Listener<S::Event>>>,
        context: Context,
        priority: i32,
    ) -> Result<()> {
        self.bind(targets, event_type, listener.into(), context, priority, false)
    }

    /// Bind a listener that fires at most once per resolved target.
    pub fn once(
        &self,
        targets: impl Targets<S>,
        event_type: &str,
        listener: impl Into<Option<Listener<S::Event>>>,
    ) -> Result<()> {
        self.once_with(targets, event_type, listener, Context::none(), DEFAULT_PRIORITY)
    }

    pub fn once_with(
        &self,
        targets: impl Targets<S>,
        event_type: &str,
        listener: impl Into<Option<Listener<S::Event>>>,
        context: Context,
        priority: i32,
    ) -> Result<()> {
        self.bind(targets, event_type, listener.into(), context, priority, true)
    }

    fn bind(
        &self,
        targets: impl Targets<S>,
        event_type: &str,
        listener: Option<Listener<S::Event>>,
        context: Context,
        priority: i32,
        once: bool,
    ) -> Result<()> {
        let listener = listener.ok_or(ListenerError::InvalidListener)?;
        for target in targets.into_targets() {
            if once {
                self.matrix
                    .add_once(&target, event_type, listener.clone(), context.clone(), priority)?;
            } else {
                self.matrix
                    .add(&target, event_type, listener.clone(), context.clone(), priority)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // OFF
    // =========================================================================

    /// Remove listeners from every resolved target.
    ///
    /// - no `event_type`: everything registered on the target
    /// - `event_type` without `listener`: every listener of that type
    /// - both: exactly the `(listener, context)` binding of that type
    pub fn off(
        &self,
        targets: impl Targets<S>,
        event_type: Option<&str>,
        listener: Option<&Listener<S::Event>>,
        context: &Context,
    ) {
        for target in targets.into_targets() {
            match (event_type, listener) {
                (None, _) => self.matrix.delete(&target),
                (Some(event_type), None) => self.matrix.remove_all(&target, event_type),
                (Some(event_type), Some(listener)) => {
                    self.matrix.remove(&target, event_type, listener, context)
                }
            }
        }
    }

    /// Drop every listener this API manages.
    pub fn clear_listeners(&self) {
        self.matrix.clear();
    }
}

impl<S: EventSource> Default for Events<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSource> std::fmt::Debug for Events<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Events").field("matrix", &self.matrix).finish()
    }
}

// =============================================================================
// DEFAULT INSTANCE
// =============================================================================

/// Source types with a thread-local default [`Events`] instance.
pub trait GlobalMatrix: EventSource {
    fn with_global<R>(f: impl FnOnce(&Events<Self>) -> R) -> R;
}

/// [`Events::on`] on the default instance.
pub fn on<S: GlobalMatrix>(
    targets: impl Targets<S>,
    event_type: &str,
    listener: impl Into<Option<Listener<S::Event>>>,
) -> Result<()> {
    S::with_global(|events| events.on(targets, event_type, listener))
}

/// [`Events::on_with`] on the default instance.
pub fn on_with<S: GlobalMatrix>(
    targets: impl Targets<S>,
    event_type: &str,
    listener: impl Into<Option<Listener<S::Event>>>,
    context: Context,
    priority: i32,
) -> Result<()> {
    S::with_global(|events| events.on_with(targets, event_type, listener, context, priority))
}

/// [`Events::once`] on the default instance.
pub fn once<S: GlobalMatrix>(
    targets: impl Targets<S>,
    event_type: &str,
    listener: impl Into<Option<Listener<S::Event>>>,
) -> Result<()> {
    S::with_global(|events| events.once(targets, event_type, listener))
}

/// [`Events::once_with`] on the default instance.
pub fn once_with<S: GlobalMatrix>(
    targets: impl Targets<S>,
    event_type: &str,
    listener: impl Into<Option<Listener<S::Event>>>,
    context: Context,
    priority: i32,
) -> Result<()> {
    S::with_global(|events| events.once_with(targets, event_type, listener, context, priority))
}

/// [`Events::off`] on the default instance.
pub fn off<S: GlobalMatrix>(
    targets: impl Targets<S>,
    event_type: Option<&str>,
    listener: Option<&Listener<S::Event>>,
    context: &Context,
) {
    S::with_global(|events| events.off(targets, event_type, listener, context))
}

/// Clear the default instance for source type `S`.
pub fn clear_listeners<S: GlobalMatrix>() {
    S::with_global(|events| events.clear_listeners())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::listener;
    use crate::targets::{LocalEvent, LocalTarget};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Listener<LocalEvent> {
        let log = log.clone();
        listener(move |_| log.borrow_mut().push(name))
    }

    #[test]
    fn invalid_listener_touches_no_target() {
        let events = Events::new();
        let a = LocalTarget::new("a");

        let err = events.on(&a, "click", None).unwrap_err();

        assert_eq!(err, ListenerError::InvalidListener);
        assert!(!events.matrix().is_tracked(&a));
    }

    #[test]
    fn multi_target_error_keeps_earlier_targets() {
        let events = Events::new();
        let a = LocalTarget::new("a");
        let b = LocalTarget::new("b");
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = recorder(&log, "l");

        events.on(&b, "click", l.clone()).unwrap();
        let err = events.once(vec![a.clone(), b.clone()], "click", l.clone()).unwrap_err();

        assert!(matches!(err, ListenerError::ConflictingListener { .. }));
        assert_eq!(events.matrix().listener_count(&a, "click"), 1);
        assert_eq!(events.matrix().listener_count(&b, "click"), 1);
    }

    #[test]
    fn on_with_priority_and_context() {
        let events = Events::new();
        let el = LocalTarget::new("el");
        let log = Rc::new(RefCell::new(Vec::new()));
        let ctx = Context::new(7u8);

        events.on(&el, "click", recorder(&log, "default")).unwrap();
        events
            .on_with(&el, "click", recorder(&log, "urgent"), ctx.clone(), 10)
            .unwrap();

        el.emit(&LocalEvent::new("click"));
        assert_eq!(*log.borrow(), vec!["urgent", "default"]);
    }

    #[test]
    fn off_with_listener_needs_matching_context() {
        let events = Events::new();
        let el = LocalTarget::new("el");
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = recorder(&log, "l");
        let ctx = Context::new(());

        events.on_with(&el, "click", l.clone(), ctx.clone(), 0).unwrap();

        events.off(&el, Some("click"), Some(&l), &Context::none());
        assert_eq!(events.matrix().listener_count(&el, "click"), 1);

        events.off(&el, Some("click"), Some(&l), &ctx);
        assert_eq!(events.matrix().listener_count(&el, "click"), 0);
        assert_eq!(el.total_native_listeners(), 0);
    }

    #[test]
    fn shared_matrix_is_visible_through_both_handles() {
        let matrix = TriggerMatrix::new();
        let events = Events::from_matrix(matrix.clone());
        let el = LocalTarget::new("el");

        events.on(&el, "click", listener(|_| {})).unwrap();
        assert_eq!(matrix.listener_count(&el, "click"), 1);

        matrix.clear();
        assert!(!events.matrix().is_tracked(&el));
    }
}
