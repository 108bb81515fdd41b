// ============================================================================
// mkr-signals - Matrix Module
// Targets, their per-type registries and the native triggers behind them
// ============================================================================

mod record;
pub mod source;
pub mod trigger;
pub mod trigger_matrix;

// Re-export for convenience
pub use source::EventSource;
pub use trigger::Trigger;
pub use trigger_matrix::TriggerMatrix;
