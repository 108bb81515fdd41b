// ============================================================================
// mkr-signals - Errors
// Registration failures raised back to the caller
// ============================================================================

use thiserror::Error;

/// Error returned when a listener cannot be registered.
///
/// Removal, clearing and deletion never fail: tearing down something that
/// was never registered is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The listener passed to `add`/`add_once`/`on`/`once` was absent.
    #[error("listener is not invocable")]
    InvalidListener,

    /// The `(listener, context)` pair is already bound with the other
    /// `once` flag. Remove the existing binding before re-adding it.
    #[error("listener bound with once = {existing_once}, cannot add with once = {requested_once}")]
    ConflictingListener {
        existing_once: bool,
        requested_once: bool,
    },

    /// The registry was disposed and accepts no further bindings.
    #[error("signal registry has been disposed")]
    Disposed,
}

/// Result alias for registration calls.
pub type Result<T> = std::result::Result<T, ListenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_message_names_both_flags() {
        let err = ListenerError::ConflictingListener {
            existing_once: false,
            requested_once: true,
        };
        let message = err.to_string();
        assert!(message.contains("once = false"));
        assert!(message.contains("once = true"));
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(ListenerError::InvalidListener, ListenerError::InvalidListener);
        assert_ne!(ListenerError::InvalidListener, ListenerError::Disposed);
    }
}
