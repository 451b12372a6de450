//! Role reconciliation

use crate::resource::{RoleResource, RoleSpec};
use anyhow::Result;
use declarative::{ApplyContext, Ensure, converge};
use pveapi::Client;
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RoleOutput {
    pub changed: bool,
    pub state: Ensure,
    pub role: RoleFacts,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RoleFacts {
    pub roleid: String,
    /// Resulting privileges, only reported for `present`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privs: Option<Vec<String>>,
}

pub fn run(client: &Client, spec: &RoleSpec, ctx: &ApplyContext) -> Result<RoleOutput> {
    spec.validate()?;
    let outcome = converge(&RoleResource::new(client, spec), ctx)?;

    let privs = spec
        .state
        .is_present()
        .then(|| spec.resulting_privs(outcome.action, outcome.current.as_ref()));

    Ok(RoleOutput {
        changed: outcome.changed(),
        state: spec.state,
        role: RoleFacts {
            roleid: spec.roleid.clone(),
            privs,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pveapi::{Call, MockBackend};

    fn client(mock: &MockBackend) -> Client {
        Client::with_backend(Box::new(mock.clone()))
    }

    #[test]
    fn test_create_missing_role() {
        let mock = MockBackend::new();
        let spec = RoleSpec::new("ops", &["VM.Audit", "Sys.Audit"], false, Ensure::Present);

        let output = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();

        assert!(output.changed);
        assert_eq!(
            output.role.privs,
            Some(vec!["Sys.Audit".to_string(), "VM.Audit".to_string()])
        );
        assert_eq!(mock.role("ops").unwrap().privs, vec!["Sys.Audit", "VM.Audit"]);
    }

    #[test]
    fn test_append_unions_privileges() {
        let mock = MockBackend::new().with_role("ops", &["A", "B"]);
        let spec = RoleSpec::new("ops", &["B", "C"], true, Ensure::Present);

        let output = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();

        assert!(output.changed);
        assert_eq!(
            output.role.privs,
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
        assert_eq!(mock.role("ops").unwrap().privs, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_replace_same_set_unchanged() {
        let mock = MockBackend::new().with_role("ops", &["A", "B"]);
        let spec = RoleSpec::new("ops", &["B", "A"], false, Ensure::Present);

        let output = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();

        assert!(!output.changed);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_replace_sends_append_false() {
        let mock = MockBackend::new().with_role("ops", &["A", "B"]);
        let spec = RoleSpec::new("ops", &["C"], false, Ensure::Present);

        let output = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();

        assert!(output.changed);
        assert_eq!(output.role.privs, Some(vec!["C".to_string()]));
        assert_eq!(
            mock.mutations(),
            vec![Call::UpdateRole {
                roleid: "ops".to_string(),
                privs: vec!["C".to_string()],
                append: false,
            }]
        );
    }

    #[test]
    fn test_absent_on_missing_role_is_noop() {
        let mock = MockBackend::new();
        let spec = RoleSpec::new("ghost", &[], false, Ensure::Absent);

        let output = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();

        assert!(!output.changed);
        assert_eq!(output.role.privs, None);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_absent_deletes_existing_role() {
        let mock = MockBackend::new().with_role("ops", &["A"]);
        let spec = RoleSpec::new("ops", &[], false, Ensure::Absent);

        let output = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();

        assert!(output.changed);
        assert_eq!(mock.mutations(), vec![Call::DeleteRole("ops".to_string())]);
        assert!(mock.role("ops").is_none());
    }

    #[test]
    fn test_check_mode_reports_same_changed_without_mutation() {
        let scenarios = [
            (MockBackend::new(), RoleSpec::new("ops", &["A"], false, Ensure::Present)),
            (
                MockBackend::new().with_role("ops", &["A", "B"]),
                RoleSpec::new("ops", &["B", "C"], true, Ensure::Present),
            ),
            (
                MockBackend::new().with_role("ops", &["A"]),
                RoleSpec::new("ops", &["B"], false, Ensure::Present),
            ),
            (
                MockBackend::new().with_role("ops", &["A"]),
                RoleSpec::new("ops", &[], false, Ensure::Absent),
            ),
        ];

        for (mock, spec) in scenarios {
            let checked = run(&client(&mock), &spec, &ApplyContext::check()).unwrap();
            assert!(mock.mutations().is_empty(), "check mode mutated for {spec:?}");

            let applied = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();
            assert_eq!(checked, applied, "check mode diverged for {spec:?}");
        }
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let mock = MockBackend::new().with_role("ops", &["A"]);
        let spec = RoleSpec::new("ops", &["A", "B"], true, Ensure::Present);

        let first = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();
        let second = run(&client(&mock), &spec, &ApplyContext::default()).unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.role.privs, second.role.privs);
    }

    #[test]
    fn test_empty_name_rejected_before_lookup() {
        let mock = MockBackend::new();
        let spec = RoleSpec::new("", &[], false, Ensure::Present);

        assert!(run(&client(&mock), &spec, &ApplyContext::default()).is_err());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_path_like_name_rejected_before_any_call() {
        let mock = MockBackend::new().with_group("admins", None, &[]);
        let spec = RoleSpec::new("x/../../groups/admins", &[], false, Ensure::Absent);

        let err = run(&client(&mock), &spec, &ApplyContext::default()).unwrap_err();

        assert!(err.to_string().contains("invalid role id"));
        assert!(mock.calls().is_empty());
        assert!(mock.group("admins").is_some());
    }

    #[test]
    fn test_write_failure_is_fatal() {
        let mock = MockBackend::new().failing_writes("Permission check failed");
        let spec = RoleSpec::new("ops", &["A"], false, Ensure::Present);

        let err = run(&client(&mock), &spec, &ApplyContext::default()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("role 'ops'"));
        assert!(message.contains("Permission check failed"));
    }

    #[test]
    fn test_output_json_shape() {
        let output = RoleOutput {
            changed: true,
            state: Ensure::Absent,
            role: RoleFacts {
                roleid: "ops".to_string(),
                privs: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            serde_json::json!({"changed": true, "state": "absent", "role": {"roleid": "ops"}})
        );
    }
}
