// ============================================================================
// mkr-signals - Registry Module
// Per-event-type listener bindings and their dispatch
// ============================================================================

pub mod binding;
pub mod options;
pub mod signal_registry;

// Re-export for convenience
pub use binding::Binding;
pub use options::{DispatchOptions, FailurePolicy};
pub use signal_registry::SignalRegistry;
