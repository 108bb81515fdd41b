// ============================================================================
// mkr-signals - Trigger
// The single native listener installed per (target, event type)
// ============================================================================

use std::fmt;
use std::rc::{Rc, Weak};

use super::record::TargetRecord;
use super::source::EventSource;
use super::trigger_matrix::MatrixInner;
use crate::registry::SignalRegistry;

/// Native listener body for one `(target, event type)` pair.
///
/// Bundles the event type, the registry it fans out to and weak links back
/// to the owning record and matrix. Platforms hold a clone and call
/// [`invoke`](Self::invoke) for every native event.
pub struct Trigger<S: EventSource> {
    matrix: Weak<MatrixInner<S>>,
    record: Weak<TargetRecord<S>>,
    event_type: Rc<str>,
    registry: Rc<SignalRegistry<S::Event>>,
}

impl<S: EventSource> Trigger<S> {
    pub(crate) fn new(
        matrix: Weak<MatrixInner<S>>,
        record: Weak<TargetRecord<S>>,
        event_type: Rc<str>,
        registry: Rc<SignalRegistry<S::Event>>,
    ) -> Self {
        Self {
            matrix,
            record,
            event_type,
            registry,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Fan `event` out to every binding of this pair.
    ///
    /// If the dispatch leaves the registry empty (its last once-listener
    /// fired), the trigger detaches itself before returning.
    pub fn invoke(&self, event: &S::Event) {
        let panicked = self.registry.dispatch_collect(event);

        if self.registry.is_empty() {
            if let Some(record) = self.record.upgrade() {
                record.release_if_empty(&self.event_type, Some(&self.registry));
                if let Some(matrix) = self.matrix.upgrade() {
                    matrix.forget_if_empty(&record);
                }
            }
        }

        self.registry.finish(panicked);
    }
}

impl<S: EventSource> Clone for Trigger<S> {
    fn clone(&self) -> Self {
        Self {
            matrix: self.matrix.clone(),
            record: self.record.clone(),
            event_type: self.event_type.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<S: EventSource> fmt::Debug for Trigger<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("event_type", &self.event_type)
            .field("listeners", &self.registry.listener_count())
            .finish()
    }
}
