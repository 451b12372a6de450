//! Execution engine - converges a single resource

use crate::context::ApplyContext;
use crate::planner::plan_resource;
use crate::resource::Resource;
use crate::types::{Action, ApplyResult, Convergence};
use anyhow::{Context, Result};
use log::{debug, info};

/// Converge a resource to its desired state
///
/// Looks up the current state once, plans, and issues at most one mutation.
/// In check mode the plan is computed in full but the mutation is skipped,
/// so [`Convergence::changed`] reports the same value either way.
///
/// # Errors
/// Fails if the lookup or the mutation fails. Nothing is retried.
pub fn converge<R: Resource + ?Sized>(
    resource: &R,
    ctx: &ApplyContext,
) -> Result<Convergence<R::Current>> {
    let current = resource
        .current_state()
        .with_context(|| format!("failed to look up {}", resource.description()))?;

    let action = plan_resource(resource, current.as_ref());
    debug!(
        "{}: ensure {}, planned {action}",
        resource.description(),
        resource.ensure()
    );

    let result = if !action.is_change() {
        ApplyResult::NoChange
    } else if ctx.check_mode {
        info!("check mode: not applying {action} of {}", resource.description());
        ApplyResult::Skipped {
            reason: "check mode".to_string(),
        }
    } else {
        apply(resource, action, current.as_ref())
            .with_context(|| format!("failed to {action} {}", resource.description()))?
    };

    Ok(Convergence {
        action,
        result,
        current,
    })
}

/// Issue the mutation for a planned action
fn apply<R: Resource + ?Sized>(
    resource: &R,
    action: Action,
    current: Option<&R::Current>,
) -> Result<ApplyResult> {
    match (action, current) {
        (Action::NoChange, _) => Ok(ApplyResult::NoChange),
        (Action::Create, _) => {
            resource.create()?;
            Ok(ApplyResult::Created)
        }
        (Action::Update, Some(current)) => {
            resource.update(current)?;
            Ok(ApplyResult::Modified)
        }
        (Action::Update, None) => {
            anyhow::bail!("cannot update {}: it does not exist", resource.description())
        }
        (Action::Delete, _) => {
            resource.delete()?;
            Ok(ApplyResult::Removed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ensure;
    use std::cell::RefCell;

    /// In-memory resource holding a single number
    #[derive(Debug)]
    struct TestResource {
        ensure: Ensure,
        desired: u32,
        remote: RefCell<Option<u32>>,
        calls: RefCell<Vec<&'static str>>,
        fail_writes: bool,
    }

    impl TestResource {
        fn new(ensure: Ensure, desired: u32, remote: Option<u32>) -> Self {
            Self {
                ensure,
                desired,
                remote: RefCell::new(remote),
                calls: RefCell::new(Vec::new()),
                fail_writes: false,
            }
        }

        fn record(&self, call: &'static str) -> Result<()> {
            self.calls.borrow_mut().push(call);
            if self.fail_writes {
                anyhow::bail!("permission denied");
            }
            Ok(())
        }
    }

    impl Resource for TestResource {
        type Current = u32;

        fn id(&self) -> &str {
            "counter"
        }

        fn resource_type(&self) -> &'static str {
            "test"
        }

        fn ensure(&self) -> Ensure {
            self.ensure
        }

        fn current_state(&self) -> Result<Option<u32>> {
            Ok(*self.remote.borrow())
        }

        fn needs_update(&self, current: &u32) -> bool {
            *current != self.desired
        }

        fn create(&self) -> Result<()> {
            self.record("create")?;
            *self.remote.borrow_mut() = Some(self.desired);
            Ok(())
        }

        fn update(&self, _current: &u32) -> Result<()> {
            self.record("update")?;
            *self.remote.borrow_mut() = Some(self.desired);
            Ok(())
        }

        fn delete(&self) -> Result<()> {
            self.record("delete")?;
            *self.remote.borrow_mut() = None;
            Ok(())
        }
    }

    #[test]
    fn test_converge_creates_missing() {
        let resource = TestResource::new(Ensure::Present, 3, None);
        let outcome = converge(&resource, &ApplyContext::default()).unwrap();

        assert_eq!(outcome.action, Action::Create);
        assert_eq!(outcome.result, ApplyResult::Created);
        assert_eq!(outcome.current, None);
        assert_eq!(*resource.remote.borrow(), Some(3));
    }

    #[test]
    fn test_converge_is_idempotent() {
        let resource = TestResource::new(Ensure::Present, 3, Some(1));
        let first = converge(&resource, &ApplyContext::default()).unwrap();
        let second = converge(&resource, &ApplyContext::default()).unwrap();

        assert!(first.changed());
        assert!(!second.changed());
        assert_eq!(*resource.calls.borrow(), vec!["update"]);
    }

    #[test]
    fn test_converge_check_mode_skips_mutation() {
        let resource = TestResource::new(Ensure::Absent, 0, Some(1));
        let outcome = converge(&resource, &ApplyContext::check()).unwrap();

        assert!(outcome.changed());
        assert!(!outcome.applied());
        assert_eq!(outcome.action, Action::Delete);
        assert!(resource.calls.borrow().is_empty());
        assert_eq!(*resource.remote.borrow(), Some(1));
    }

    #[test]
    fn test_converge_absent_missing_is_noop() {
        let resource = TestResource::new(Ensure::Absent, 0, None);
        let outcome = converge(&resource, &ApplyContext::default()).unwrap();

        assert_eq!(outcome.result, ApplyResult::NoChange);
        assert!(resource.calls.borrow().is_empty());
    }

    #[test]
    fn test_converge_surfaces_mutation_errors() {
        let mut resource = TestResource::new(Ensure::Present, 3, None);
        resource.fail_writes = true;

        let err = converge(&resource, &ApplyContext::default()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to create test 'counter'"));
        assert!(message.contains("permission denied"));
    }
}
