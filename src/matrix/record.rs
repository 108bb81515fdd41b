// ============================================================================
// mkr-signals - Target Record
// Registries and native triggers for one target
// ============================================================================
//
// Per event type an entry is either present with a non-empty registry and
// exactly one attached trigger, or absent. The one exception is a platform
// that refused the attach: the entry then has no handle until the next
// registration for the pair retries. Entries are created empty by
// `registry_or_insert`, and the caller either fills them and calls
// `ensure_trigger`, or drops them again with `release_if_empty`.
//
// Native attach/detach never runs while `entries` is borrowed.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::source::EventSource;
use super::trigger::Trigger;
use super::trigger_matrix::MatrixInner;
use crate::registry::{DispatchOptions, SignalRegistry};

struct TypeEntry<S: EventSource> {
    event_type: Rc<str>,
    registry: Rc<SignalRegistry<S::Event>>,
    handle: Option<S::Handle>,
}

pub(crate) struct TargetRecord<S: EventSource> {
    target: S,
    entries: RefCell<Vec<TypeEntry<S>>>,
    options: DispatchOptions,
}

impl<S: EventSource> TargetRecord<S> {
    pub(crate) fn new(target: S, options: DispatchOptions) -> Self {
        Self {
            target,
            entries: RefCell::new(Vec::new()),
            options,
        }
    }

    pub(crate) fn target(&self) -> &S {
        &self.target
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub(crate) fn registry(&self, event_type: &str) -> Option<Rc<SignalRegistry<S::Event>>> {
        self.entries
            .borrow()
            .iter()
            .find(|e| &*e.event_type == event_type)
            .map(|e| e.registry.clone())
    }

    pub(crate) fn registry_or_insert(&self, event_type: &str) -> Rc<SignalRegistry<S::Event>> {
        if let Some(registry) = self.registry(event_type) {
            return registry;
        }
        let registry = Rc::new(SignalRegistry::with_options(self.options));
        self.entries.borrow_mut().push(TypeEntry {
            event_type: Rc::from(event_type),
            registry: registry.clone(),
            handle: None,
        });
        registry
    }

    pub(crate) fn has_trigger(&self, event_type: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| &*e.event_type == event_type && e.handle.is_some())
    }

    pub(crate) fn event_types(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|e| e.event_type.to_string())
            .collect()
    }

    /// Attach the native trigger for `event_type` if bindings exist and
    /// none is attached yet.
    ///
    /// A refused attach leaves the entry without a handle; the next
    /// registration for the pair tries again.
    pub(crate) fn ensure_trigger(
        record: &Rc<Self>,
        matrix: &Weak<MatrixInner<S>>,
        event_type: &str,
    ) {
        let pending = {
            let entries = record.entries.borrow();
            entries
                .iter()
                .find(|e| &*e.event_type == event_type)
                .filter(|e| e.handle.is_none() && !e.registry.is_empty())
                .map(|e| (e.event_type.clone(), e.registry.clone()))
        };
        let Some((event_type, registry)) = pending else {
            return;
        };

        let trigger = Trigger::new(
            matrix.clone(),
            Rc::downgrade(record),
            event_type.clone(),
            registry.clone(),
        );
        let Some(handle) = record.target.attach(&event_type, trigger) else {
            warn!(event_type = &*event_type, "native listener could not be attached");
            return;
        };

        let mut entries = record.entries.borrow_mut();
        match entries.iter_mut().find(|e| Rc::ptr_eq(&e.registry, &registry)) {
            Some(entry) => {
                entry.handle = Some(handle);
                trace!(event_type = &*event_type, "attached native trigger");
            }
            None => {
                // Entry went away while the platform attached
                drop(entries);
                record.target.detach(&event_type, handle);
            }
        }
    }

    /// Drop the entry for `event_type` if its registry has no live bindings,
    /// detaching the native trigger.
    ///
    /// With `expected`, only an entry still backed by that registry is
    /// released.
    pub(crate) fn release_if_empty(
        &self,
        event_type: &str,
        expected: Option<&Rc<SignalRegistry<S::Event>>>,
    ) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let Some(index) = entries.iter().position(|e| {
                &*e.event_type == event_type
                    && e.registry.is_empty()
                    && expected.is_none_or(|r| Rc::ptr_eq(r, &e.registry))
            }) else {
                return;
            };
            entries.remove(index)
        };
        self.discard(removed);
    }

    /// Detach every trigger and dispose every registry of this target.
    pub(crate) fn release_all(&self) {
        let entries: Vec<_> = self.entries.borrow_mut().drain(..).collect();
        for entry in entries {
            self.discard(entry);
        }
    }

    fn discard(&self, entry: TypeEntry<S>) {
        entry.registry.dispose();
        if let Some(handle) = entry.handle {
            self.target.detach(&entry.event_type, handle);
            trace!(event_type = &*entry.event_type, "detached native trigger");
        }
    }
}
