// ============================================================================
// mkr-signals - Listener aggregation for the mkr creative toolkit
// ============================================================================
//
// Many logical listeners registered through `on`/`once`/`off` share a single
// native listener per (target, event type). The trigger matrix owns the
// native listeners; each signal registry owns ordering, dispatch and once
// semantics for one (target, event type) pair.
// ============================================================================

pub mod core;
pub mod events;
pub mod matrix;
pub mod registry;
pub mod targets;

// Re-export core items at crate root for ergonomic access
pub use crate::core::constants::DEFAULT_PRIORITY;
pub use crate::core::error::{ListenerError, Result};
pub use crate::core::types::{listener, Context, Dispatch, Listener, ListenerFn};

// Registry and matrix
pub use matrix::{EventSource, Trigger, TriggerMatrix};
pub use registry::{Binding, DispatchOptions, FailurePolicy, SignalRegistry};

// Public API (mkr-style free functions)
pub use events::{
    clear_listeners, off, on, on_with, once, once_with, Events, GlobalMatrix,
};
pub use targets::{LocalEvent, LocalTarget, Targets};

// =============================================================================
// TESTS
// =============================================================================
