// ============================================================================
// mkr-signals - Dispatch Options
// How a dispatch reacts to a panicking listener
// ============================================================================

/// What happens when a listener panics during a dispatch.
///
/// Both policies keep delivering the event to every remaining binding; a
/// broken listener never starves its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the panic and carry on.
    #[default]
    Isolate,

    /// Log the panic, finish the dispatch, then resume the first panic on
    /// the caller of the dispatch.
    Propagate,
}

/// Options for registries and matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    pub failure_policy: FailurePolicy,
}

impl DispatchOptions {
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_isolate() {
        assert_eq!(DispatchOptions::default().failure_policy, FailurePolicy::Isolate);
        assert_eq!(
            DispatchOptions::default()
                .with_failure_policy(FailurePolicy::Propagate)
                .failure_policy,
            FailurePolicy::Propagate
        );
    }
}
