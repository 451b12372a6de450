//! Module results on stdout
//!
//! Success is one JSON object and exit status 0. Failure is
//! `{"failed": true, "msg": ..., <id field>: ...}` and exit status 1.

use pveapi::ErrorCategory;
use serde_json::{Map, Value};
use std::process::ExitCode;

/// A fatal module error, reported with the resource it concerns
#[derive(Debug, thiserror::Error)]
#[error("{msg}")]
pub struct ModuleFailure {
    pub msg: String,
    /// Identifying field of the resource, e.g. `("roleid", "ops")`
    pub resource: Option<(&'static str, String)>,
    /// Set when the failure came from the API client
    pub category: Option<ErrorCategory>,
}

impl ModuleFailure {
    /// Wrap an error with its full context chain
    pub fn from_error(err: &anyhow::Error, resource: Option<(&'static str, String)>) -> Self {
        let category = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<pveapi::Error>())
            .map(pveapi::Error::category);
        Self {
            msg: format!("{err:#}"),
            resource,
            category,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("failed".to_string(), Value::Bool(true));
        map.insert("msg".to_string(), Value::String(self.msg.clone()));
        if let Some((field, id)) = &self.resource {
            map.insert((*field).to_string(), Value::String(id.clone()));
        }
        Value::Object(map)
    }
}

/// Print the outcome and map it to the process exit status
pub fn finish(outcome: Result<Value, ModuleFailure>) -> ExitCode {
    match outcome {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            log::error!("{failure}");
            if let Some(category) = failure.category {
                log::warn!("{category}: {}", category.advice());
            }
            println!("{}", failure.to_json());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_json_carries_resource_id() {
        let failure = ModuleFailure {
            msg: "permission denied".to_string(),
            resource: Some(("roleid", "ops".to_string())),
            category: Some(ErrorCategory::Api),
        };
        assert_eq!(
            failure.to_json(),
            json!({"failed": true, "msg": "permission denied", "roleid": "ops"})
        );
    }

    #[test]
    fn test_failure_json_without_resource() {
        let failure = ModuleFailure {
            msg: "missing required arguments: api_host".to_string(),
            resource: None,
            category: None,
        };
        assert_eq!(
            failure.to_json(),
            json!({"failed": true, "msg": "missing required arguments: api_host"})
        );
    }

    #[test]
    fn test_from_error_keeps_context_chain() {
        let err = anyhow::anyhow!("403 Permission check failed").context("failed to delete role 'ops'");
        let failure = ModuleFailure::from_error(&err, None);
        assert_eq!(
            failure.msg,
            "failed to delete role 'ops': 403 Permission check failed"
        );
    }

    #[test]
    fn test_from_error_classifies_client_errors() {
        let err = anyhow::Error::new(pveapi::Error::http("connection refused"))
            .context("failed to look up role 'ops'");
        let failure = ModuleFailure::from_error(&err, Some(("roleid", "ops".to_string())));
        assert_eq!(failure.category, Some(ErrorCategory::Network));
        assert!(failure.msg.starts_with("failed to look up role 'ops': "));

        let local = anyhow::anyhow!("role name must not be empty");
        assert_eq!(ModuleFailure::from_error(&local, None).category, None);
    }
}
