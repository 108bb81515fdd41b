// ============================================================================
// mkr-signals - Trigger Matrix
//
// Maps targets to per-event-type registries and their native triggers.
// ============================================================================
//
// The matrix owns the lifetime of native listeners:
// - the first binding for (target, type) attaches one native trigger
// - later bindings reuse it
// - the binding that empties the registry detaches it, whether it goes
//   through remove/remove_all/delete/clear or a once-listener firing
//
// Targets are compared with `EventSource::same_target`, so records live in
// a plain Vec searched by identity rather than a hashed map.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::record::TargetRecord;
use super::source::EventSource;
use crate::core::error::{ListenerError, Result};
use crate::core::types::{Context, Listener};
use crate::registry::{Binding, DispatchOptions};

// =============================================================================
// MATRIX INNER
// =============================================================================

pub(crate) struct MatrixInner<S: EventSource> {
    records: RefCell<Vec<Rc<TargetRecord<S>>>>,
    options: DispatchOptions,
}

impl<S: EventSource> MatrixInner<S> {
    fn find(&self, target: &S) -> Option<Rc<TargetRecord<S>>> {
        self.records
            .borrow()
            .iter()
            .find(|r| r.target().same_target(target))
            .cloned()
    }

    fn find_or_create(&self, target: &S) -> Rc<TargetRecord<S>> {
        if let Some(record) = self.find(target) {
            return record;
        }
        let record = Rc::new(TargetRecord::new(target.clone(), self.options));
        self.records.borrow_mut().push(record.clone());
        record
    }

    /// Drop `record` from the matrix once it tracks no event types.
    pub(crate) fn forget_if_empty(&self, record: &Rc<TargetRecord<S>>) {
        if record.is_empty() {
            self.records.borrow_mut().retain(|r| !Rc::ptr_eq(r, record));
        }
    }

    fn clear(&self) {
        let records: Vec<_> = self.records.borrow_mut().drain(..).collect();
        if !records.is_empty() {
            debug!(targets = records.len(), "clearing trigger matrix");
        }
        for record in records {
            record.release_all();
        }
    }
}

impl<S: EventSource> Drop for MatrixInner<S> {
    fn drop(&mut self) {
        // Leave no native listener behind pointing at a dead matrix
        self.clear();
    }
}

// =============================================================================
// TRIGGER MATRIX
// =============================================================================

/// Listener bookkeeping for many targets.
///
/// Cloning gives another handle to the same matrix. When the last handle is
/// dropped every native trigger it installed is detached.
///
/// # Example
///
/// ```
/// use mkr_signals::{listener, Context, LocalEvent, LocalTarget, TriggerMatrix};
///
/// let matrix = TriggerMatrix::<LocalTarget>::new();
/// let button = LocalTarget::new("button");
///
/// matrix.add(&button, "click", listener(|_| {}), Context::none(), 0).unwrap();
/// matrix.add(&button, "click", listener(|_| {}), Context::none(), 0).unwrap();
///
/// // Two logical listeners, one native listener
/// assert_eq!(matrix.listener_count(&button, "click"), 2);
/// assert_eq!(button.native_listener_count("click"), 1);
///
/// matrix.remove_all(&button, "click");
/// assert_eq!(button.native_listener_count("click"), 0);
/// ```
pub struct TriggerMatrix<S: EventSource> {
    inner: Rc<MatrixInner<S>>,
}

impl<S: EventSource> TriggerMatrix<S> {
    pub fn new() -> Self {
        Self::with_options(DispatchOptions::default())
    }

    pub fn with_options(options: DispatchOptions) -> Self {
        Self {
            inner: Rc::new(MatrixInner {
                records: RefCell::new(Vec::new()),
                options,
            }),
        }
    }

    pub fn options(&self) -> DispatchOptions {
        self.inner.options
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Bind `listener` to `event_type` on `target`.
    ///
    /// Attaches a native trigger only if none exists yet for the pair.
    pub fn add(
        &self,
        target: &S,
        event_type: &str,
        listener: impl Into<Option<Listener<S::Event>>>,
        context: Context,
        priority: i32,
    ) -> Result<Rc<Binding<S::Event>>> {
        self.register(target, event_type, listener.into(), context, priority, false)
    }

    /// Like [`add`](Self::add), but the binding is removed after it fires once.
    pub fn add_once(
        &self,
        target: &S,
        event_type: &str,
        listener: impl Into<Option<Listener<S::Event>>>,
        context: Context,
        priority: i32,
    ) -> Result<Rc<Binding<S::Event>>> {
        self.register(target, event_type, listener.into(), context, priority, true)
    }

    fn register(
        &self,
        target: &S,
        event_type: &str,
        listener: Option<Listener<S::Event>>,
        context: Context,
        priority: i32,
        once: bool,
    ) -> Result<Rc<Binding<S::Event>>> {
        // Reject before a record is created for the target
        let listener = listener.ok_or(ListenerError::InvalidListener)?;

        let record = self.inner.find_or_create(target);
        let registry = record.registry_or_insert(event_type);
        let added = if once {
            registry.add_once(listener, context, priority)
        } else {
            registry.add(listener, context, priority)
        };

        match added {
            Ok(binding) => {
                TargetRecord::ensure_trigger(&record, &Rc::downgrade(&self.inner), event_type);
                Ok(binding)
            }
            Err(err) => {
                self.release(&record, event_type);
                Err(err)
            }
        }
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    /// Remove one binding. No-op if the target, type or binding is unknown.
    pub fn remove(
        &self,
        target: &S,
        event_type: &str,
        listener: &Listener<S::Event>,
        context: &Context,
    ) {
        let Some(record) = self.inner.find(target) else {
            return;
        };
        let Some(registry) = record.registry(event_type) else {
            return;
        };
        registry.remove(listener, context);
        self.release(&record, event_type);
    }

    /// Remove every binding of `event_type` on `target`.
    pub fn remove_all(&self, target: &S, event_type: &str) {
        let Some(record) = self.inner.find(target) else {
            return;
        };
        let Some(registry) = record.registry(event_type) else {
            return;
        };
        registry.remove_all();
        self.release(&record, event_type);
    }

    /// Forget `target` entirely, detaching all of its native triggers.
    pub fn delete(&self, target: &S) {
        let Some(record) = self.inner.find(target) else {
            return;
        };
        self.inner
            .records
            .borrow_mut()
            .retain(|r| !Rc::ptr_eq(r, &record));
        debug!(event_types = ?record.event_types(), "deleting target record");
        record.release_all();
    }

    /// Delete every tracked target.
    pub fn clear(&self) {
        self.inner.clear();
    }

    fn release(&self, record: &Rc<TargetRecord<S>>, event_type: &str) {
        record.release_if_empty(event_type, None);
        self.inner.forget_if_empty(record);
    }

    /// Halt the dispatch currently running for `(target, event_type)`.
    pub fn halt(&self, target: &S, event_type: &str) {
        if let Some(registry) = self.inner.find(target).and_then(|r| r.registry(event_type)) {
            registry.halt();
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn has(
        &self,
        target: &S,
        event_type: &str,
        listener: &Listener<S::Event>,
        context: &Context,
    ) -> bool {
        self.inner
            .find(target)
            .and_then(|r| r.registry(event_type))
            .is_some_and(|registry| registry.has(listener, context))
    }

    pub fn listener_count(&self, target: &S, event_type: &str) -> usize {
        self.inner
            .find(target)
            .and_then(|r| r.registry(event_type))
            .map_or(0, |registry| registry.listener_count())
    }

    /// Whether a native trigger is attached for the pair.
    pub fn has_trigger(&self, target: &S, event_type: &str) -> bool {
        self.inner
            .find(target)
            .is_some_and(|r| r.has_trigger(event_type))
    }

    /// Event types with live bindings on `target`, in first-registration order.
    pub fn event_types(&self, target: &S) -> Vec<String> {
        self.inner
            .find(target)
            .map(|r| r.event_types())
            .unwrap_or_default()
    }

    pub fn is_tracked(&self, target: &S) -> bool {
        self.inner.find(target).is_some()
    }

    pub fn target_count(&self) -> usize {
        self.inner.records.borrow().len()
    }
}

impl<S: EventSource> Clone for TriggerMatrix<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: EventSource> Default for TriggerMatrix<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSource> std::fmt::Debug for TriggerMatrix<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerMatrix")
            .field("targets", &self.target_count())
            .field("options", &self.inner.options)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
