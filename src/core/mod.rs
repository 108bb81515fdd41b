// ============================================================================
// mkr-signals - Core Module
// Listener identity, receiver contexts, errors and shared defaults
// ============================================================================

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use error::{ListenerError, Result};
pub use types::{listener, Context, Dispatch, Listener, ListenerFn};
