//! Resource trait for declarative state management
//!
//! A Resource is something that can be present or absent, is looked up
//! by id, and can be created, updated or deleted to reach a desired state.

use crate::types::Ensure;
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Implementors provide:
/// - Identity (id, type)
/// - The desired presence and a field comparison against current state
/// - The three mutations
///
/// The decision itself lives in [`crate::planner::plan`]; check mode is
/// handled by [`crate::executor::converge`], so mutations never need to
/// look at it.
pub trait Resource: fmt::Debug {
    /// State observed on the remote side
    type Current: fmt::Debug;

    /// Unique identifier for this resource within its type
    fn id(&self) -> &str;

    /// Resource type category, e.g. "role" or "group"
    fn resource_type(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> String {
        format!("{} '{}'", self.resource_type(), self.id())
    }

    /// Desired presence
    fn ensure(&self) -> Ensure;

    /// Look up the current state
    ///
    /// `Ok(None)` means the resource does not exist. Any `Err` is an
    /// operational failure and aborts convergence.
    fn current_state(&self) -> Result<Option<Self::Current>>;

    /// Whether an existing resource differs from the desired fields
    fn needs_update(&self, current: &Self::Current) -> bool;

    fn create(&self) -> Result<()>;

    fn update(&self, current: &Self::Current) -> Result<()>;

    fn delete(&self) -> Result<()>;
}
