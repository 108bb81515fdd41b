// ============================================================================
// mkr-signals - Targets Module
// Resolving call-site arguments into concrete event sources
// ============================================================================

pub mod local;
#[cfg(feature = "web")]
pub mod web;

pub use local::{LocalEvent, LocalTarget};

use crate::matrix::EventSource;

// =============================================================================
// TARGETS
// =============================================================================

/// Anything `on`/`once`/`off` accept as their first argument.
///
/// A single target, a list of targets or (with the `web` feature) a CSS
/// selector. Each resolved target gets its own matrix call.
pub trait Targets<S> {
    fn into_targets(self) -> Vec<S>;
}

impl<S: EventSource> Targets<S> for &S {
    fn into_targets(self) -> Vec<S> {
        vec![self.clone()]
    }
}

impl<S: EventSource> Targets<S> for Vec<S> {
    fn into_targets(self) -> Vec<S> {
        self
    }
}

impl<S: EventSource> Targets<S> for &Vec<S> {
    fn into_targets(self) -> Vec<S> {
        self.clone()
    }
}

impl<S: EventSource> Targets<S> for &[S] {
    fn into_targets(self) -> Vec<S> {
        self.to_vec()
    }
}

impl<S: EventSource, const N: usize> Targets<S> for [S; N] {
    fn into_targets(self) -> Vec<S> {
        self.into()
    }
}

impl<S: EventSource> Targets<S> for Option<&S> {
    fn into_targets(self) -> Vec<S> {
        self.into_iter().cloned().collect()
    }
}
