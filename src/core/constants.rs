// ============================================================================
// mkr-signals - Constants
// Shared defaults for listener registration
// ============================================================================

/// Priority used by `on`/`once`/`add` when the caller does not pass one.
///
/// Higher priorities run first. Bindings with equal priority run in the
/// order they were registered.
pub const DEFAULT_PRIORITY: i32 = 0;
