//! Conversions between PVE wire conventions and local values.
//!
//! PVE encodes booleans as `1`/`0`, lists as comma-joined strings and a role's
//! privileges either as such a string or as a mapping keyed by privilege name.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Separator used by PVE for list-valued parameters.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Convert a PVE boolean to a local one.
///
/// Only the literal number `1` is true.
#[must_use]
pub fn remote_bool_to_local(value: &Value) -> bool {
    value.as_u64() == Some(1)
}

/// Convert a local boolean to its PVE form, propagating absence.
#[must_use]
pub fn local_bool_to_remote(value: Option<bool>) -> Option<u8> {
    value.map(u8::from)
}

/// Convert a dynamically typed value to its PVE boolean form.
///
/// `null` stays absent; anything that is not a boolean is a type error.
pub fn local_bool_value_to_remote(value: &Value) -> Result<Option<u8>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(local_bool_to_remote(Some(*flag))),
        other => Err(Error::InvalidValue(format!(
            "{other} must be of type bool not {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Compare two lists ignoring order but not multiplicity.
#[must_use]
pub fn list_equals<T: Ord + Clone>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Check that every element of `a` appears in `b`.
#[must_use]
pub fn list_subset<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.iter().all(|item| b.contains(item))
}

/// Join a list with `sep`. An empty list yields an empty string.
#[must_use]
pub fn list_to_delimited<S: AsRef<str>>(list: &[S], sep: &str) -> String {
    list.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Split a delimited string. Missing or empty input yields an empty list.
#[must_use]
pub fn delimited_to_list(value: Option<&str>, sep: &str) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(sep)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sort and deduplicate a privilege list.
#[must_use]
pub fn normalize_privileges<S: AsRef<str>>(privs: &[S]) -> Vec<String> {
    let mut out: Vec<String> = privs.iter().map(|p| p.as_ref().to_string()).collect();
    out.sort();
    out.dedup();
    out
}

/// Privileges as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WirePrivileges {
    /// `"Sys.Audit,VM.Audit"` (role list endpoint).
    Joined(String),
    /// `{"Sys.Audit": 1, "VM.Audit": 1}` (single role endpoint).
    Mapping(BTreeMap<String, Value>),
}

impl WirePrivileges {
    /// Normalize to a sorted, deduplicated list.
    #[must_use]
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Joined(joined) => {
                normalize_privileges(&delimited_to_list(Some(&joined), DEFAULT_SEPARATOR))
            }
            Self::Mapping(map) => map.into_keys().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_bool_only_literal_one_is_true() {
        assert!(remote_bool_to_local(&json!(1)));
        assert!(!remote_bool_to_local(&json!(0)));
        assert!(!remote_bool_to_local(&json!(2)));
        assert!(!remote_bool_to_local(&json!("1")));
        assert!(!remote_bool_to_local(&json!(true)));
        assert!(!remote_bool_to_local(&Value::Null));
    }

    #[test]
    fn test_local_bool_to_remote() {
        assert_eq!(local_bool_to_remote(Some(true)), Some(1));
        assert_eq!(local_bool_to_remote(Some(false)), Some(0));
        assert_eq!(local_bool_to_remote(None), None);
    }

    #[test]
    fn test_local_bool_value_to_remote() {
        assert_eq!(local_bool_value_to_remote(&json!(true)).unwrap(), Some(1));
        assert_eq!(local_bool_value_to_remote(&json!(false)).unwrap(), Some(0));
        assert_eq!(local_bool_value_to_remote(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_local_bool_value_to_remote_rejects_non_bool() {
        let err = local_bool_value_to_remote(&json!("yes")).unwrap_err();
        assert!(err.to_string().contains("must be of type bool not str"));
        assert!(local_bool_value_to_remote(&json!(1)).is_err());
    }

    #[test]
    fn test_list_equals_ignores_order() {
        assert!(list_equals(&["a", "b"], &["b", "a"]));
        assert!(list_equals(&["b", "a"], &["a", "b"]));
        assert!(list_equals::<&str>(&[], &[]));
    }

    #[test]
    fn test_list_equals_respects_multiplicity() {
        assert!(!list_equals(&["a", "a"], &["a"]));
        assert!(!list_equals(&["a", "a", "b"], &["a", "b", "b"]));
    }

    #[test]
    fn test_list_subset() {
        assert!(list_subset(&["a"], &["a", "b"]));
        assert!(!list_subset(&["a", "c"], &["a", "b"]));
        assert!(list_subset::<&str>(&[], &["a"]));
        assert!(list_subset(&["a", "a"], &["a"]));
    }

    #[test]
    fn test_list_to_delimited() {
        assert_eq!(list_to_delimited(&["a", "b"], ","), "a,b");
        assert_eq!(list_to_delimited::<&str>(&[], ","), "");
        assert_eq!(list_to_delimited(&["x"], ";"), "x");
    }

    #[test]
    fn test_delimited_to_list() {
        assert_eq!(delimited_to_list(Some("a,b"), ","), vec!["a", "b"]);
        assert!(delimited_to_list(Some(""), ",").is_empty());
        assert!(delimited_to_list(None, ",").is_empty());
        assert_eq!(delimited_to_list(Some("a,,b"), ","), vec!["a", "b"]);
    }

    #[test]
    fn test_wire_privileges_from_joined_string() {
        let privs: WirePrivileges = serde_json::from_value(json!("VM.Audit,Sys.Audit")).unwrap();
        assert_eq!(privs.into_list(), vec!["Sys.Audit", "VM.Audit"]);
    }

    #[test]
    fn test_wire_privileges_from_mapping() {
        let privs: WirePrivileges =
            serde_json::from_value(json!({"VM.Audit": 1, "Sys.Audit": 1})).unwrap();
        assert_eq!(privs.into_list(), vec!["Sys.Audit", "VM.Audit"]);
    }

    #[test]
    fn test_wire_privileges_empty_mapping() {
        let privs: WirePrivileges = serde_json::from_value(json!({})).unwrap();
        assert!(privs.into_list().is_empty());
    }
}
