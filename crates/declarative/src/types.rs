//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Desired presence of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// Resource must exist and match its desired fields
    #[default]
    Present,
    /// Resource must not exist
    Absent,
}

impl Ensure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }

    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corrective step needed to converge a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Already converged
    NoChange,
    /// Resource is missing
    Create,
    /// Resource exists but differs
    Update,
    /// Resource exists but should not
    Delete,
}

impl Action {
    /// Check if the action represents a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoChange => "no change",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Resource was removed
    Removed,
    /// A change was needed but not applied
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents a change that was carried out
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified | Self::Removed)
    }
}

/// Outcome of converging one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergence<C> {
    /// Planned action
    pub action: Action,
    /// What actually happened
    pub result: ApplyResult,
    /// State observed before any change, `None` if the resource was absent
    pub current: Option<C>,
}

impl<C> Convergence<C> {
    /// Whether the resource changed, or would have outside check mode
    pub fn changed(&self) -> bool {
        self.action.is_change()
    }

    /// Whether a mutation was actually issued
    pub fn applied(&self) -> bool {
        self.result.is_change()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_default_is_present() {
        assert_eq!(Ensure::default(), Ensure::Present);
        assert!(Ensure::Present.is_present());
        assert!(!Ensure::Absent.is_present());
    }

    #[test]
    fn test_ensure_serde_lowercase() {
        let state: Ensure = serde_json::from_str("\"absent\"").unwrap();
        assert_eq!(state, Ensure::Absent);
        assert_eq!(serde_json::to_string(&Ensure::Present).unwrap(), "\"present\"");
        assert!(serde_json::from_str::<Ensure>("\"latest\"").is_err());
    }

    #[test]
    fn test_action_is_change() {
        assert!(!Action::NoChange.is_change());
        assert!(Action::Create.is_change());
        assert!(Action::Update.is_change());
        assert!(Action::Delete.is_change());
    }

    #[test]
    fn test_skipped_is_not_applied() {
        let convergence: Convergence<()> = Convergence {
            action: Action::Delete,
            result: ApplyResult::Skipped {
                reason: "check mode".to_string(),
            },
            current: Some(()),
        };
        assert!(convergence.changed());
        assert!(!convergence.applied());
    }
}
