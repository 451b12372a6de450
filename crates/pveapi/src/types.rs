//! Core types for the PVE access-control API.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default PVE API port.
pub const DEFAULT_PORT: u16 = 8006;

/// A PVE role with its normalized privilege list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub roleid: String,
    /// Sorted, deduplicated privilege names.
    pub privs: Vec<String>,
    /// Whether the role is predefined. Only reported by the role list.
    pub special: Option<bool>,
}

impl Role {
    /// Create a role from its id and privileges.
    pub fn new<S: AsRef<str>>(roleid: impl Into<String>, privs: &[S]) -> Self {
        Self {
            roleid: roleid.into(),
            privs: crate::convert::normalize_privileges(privs),
            special: None,
        }
    }
}

/// A PVE group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub groupid: String,
    /// Free-text comment, `None` when the group has none.
    pub comment: Option<String>,
    /// Member user ids.
    pub members: Vec<String>,
}

impl Group {
    /// Create a group without members.
    pub fn new(groupid: impl Into<String>, comment: Option<&str>) -> Self {
        Self {
            groupid: groupid.into(),
            comment: comment.map(str::to_string),
            members: Vec::new(),
        }
    }
}

/// Check a role or group id against PVE's id format.
///
/// Ids end up as a URL path segment, so anything outside
/// `[A-Za-z0-9._-]` (and `.`/`..` on their own) is rejected here, before a
/// request is built.
pub fn validate_id(kind: &'static str, id: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_');
    if id.is_empty() {
        return Err(Error::InvalidValue(format!("{kind} id must not be empty")));
    }
    if !id.chars().all(allowed) || id == "." || id == ".." {
        return Err(Error::InvalidValue(format!(
            "invalid {kind} id '{id}': only letters, digits, '.', '-' and '_' are allowed"
        )));
    }
    Ok(())
}

/// Server version, as reported by `GET /version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Product version, e.g. "8.2.4".
    #[serde(default)]
    pub version: String,
    /// Release, e.g. "8.2".
    #[serde(default)]
    pub release: String,
    /// Repository commit id.
    #[serde(default)]
    pub repoid: String,
}

/// How the client authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Username and password, exchanged for a ticket.
    Password(String),
    /// API token id and secret.
    Token {
        /// Token name, without the user prefix.
        id: String,
        /// Token secret.
        secret: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(***)"),
            Self::Token { id, .. } => f
                .debug_struct("Token")
                .field("id", id)
                .field("secret", &"***")
                .finish(),
        }
    }
}

/// Connection settings for a PVE node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Host name or address.
    pub host: String,
    /// API port.
    pub port: u16,
    /// User, including the realm (`root@pam`).
    pub user: String,
    /// Password or API token.
    pub credentials: Credentials,
    /// Verify the server's TLS certificate.
    pub validate_certs: bool,
}

impl ConnectionConfig {
    /// Base URL of the JSON API.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("https://{host}:{}/api2/json", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> ConnectionConfig {
        ConnectionConfig {
            host: host.to_string(),
            port: DEFAULT_PORT,
            user: "root@pam".to_string(),
            credentials: Credentials::Password("secret".to_string()),
            validate_certs: false,
        }
    }

    #[test]
    fn test_validate_id_accepts_pve_ids() {
        for id in ["PVEAuditor", "ops-team", "vm_admins", "v1.2"] {
            assert!(validate_id("role", id).is_ok(), "{id}");
        }
    }

    #[test]
    fn test_validate_id_rejects_path_characters() {
        for id in ["", "a/b", "x/../../groups/admins", "..", "a?b", "a#b", "a%2Fb", "a b"] {
            assert!(validate_id("role", id).is_err(), "{id:?}");
        }
        let err = validate_id("group", "a/b").unwrap_err();
        assert!(err.to_string().contains("invalid group id 'a/b'"));
    }

    #[test]
    fn test_base_url() {
        assert_eq!(config("pve1").base_url(), "https://pve1:8006/api2/json");
    }

    #[test]
    fn test_base_url_brackets_ipv6() {
        assert_eq!(config("fd00::1").base_url(), "https://[fd00::1]:8006/api2/json");
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let password = format!("{:?}", Credentials::Password("hunter2".to_string()));
        assert!(!password.contains("hunter2"));

        let token = format!(
            "{:?}",
            Credentials::Token {
                id: "automation".to_string(),
                secret: "5f1c".to_string(),
            }
        );
        assert!(token.contains("automation"));
        assert!(!token.contains("5f1c"));
    }

    #[test]
    fn test_role_new_normalizes_privileges() {
        let role = Role::new("ops", &["VM.Audit", "Sys.Audit", "VM.Audit"]);
        assert_eq!(role.privs, vec!["Sys.Audit", "VM.Audit"]);
        assert_eq!(role.special, None);
    }
}
