//! Apply context

/// Context passed to the executor
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyContext {
    /// Compute and report the decision, but issue no mutation
    pub check_mode: bool,
}

impl ApplyContext {
    /// Create a new apply context
    pub fn new(check_mode: bool) -> Self {
        Self { check_mode }
    }

    /// Context for a dry run
    pub fn check() -> Self {
        Self::new(true)
    }
}
