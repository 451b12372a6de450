//! Backend trait and implementations for the PVE access API.
//!
//! [`http::HttpBackend`] talks to a real node. [`MockBackend`] keeps roles and
//! groups in memory and records every call, so tests can run without network
//! access and assert which requests were issued.
//!
//! ```
//! use pveapi::backend::{Backend, Call, MockBackend};
//!
//! let mock = MockBackend::new().with_role("auditor", &["Sys.Audit"]);
//! let role = mock.get_role("auditor").unwrap().unwrap();
//! assert_eq!(role.privs, vec!["Sys.Audit"]);
//! assert_eq!(mock.calls(), vec![Call::GetRole("auditor".to_string())]);
//! ```

#[cfg(feature = "http")]
pub mod http;

use crate::convert::normalize_privileges;
use crate::error::{Error, Result};
use crate::types::{Group, Role, Version};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Resource client for roles and groups.
///
/// Single-resource lookups return `Ok(None)` when the resource does not exist;
/// any `Err` is an operational failure.
pub trait Backend: Send + Sync {
    /// Fetch the server version. Used as a connectivity probe.
    fn version(&self) -> Result<Version>;

    /// Fetch one role.
    fn get_role(&self, roleid: &str) -> Result<Option<Role>>;

    /// Fetch every role.
    fn list_roles(&self) -> Result<Vec<Role>>;

    /// Create a role with the given privileges.
    fn create_role(&self, roleid: &str, privs: &[String]) -> Result<()>;

    /// Set a role's privileges, or add them to the existing set when `append`.
    fn update_role(&self, roleid: &str, privs: &[String], append: bool) -> Result<()>;

    /// Remove a role.
    fn delete_role(&self, roleid: &str) -> Result<()>;

    /// Fetch one group.
    fn get_group(&self, groupid: &str) -> Result<Option<Group>>;

    /// Fetch every group.
    fn list_groups(&self) -> Result<Vec<Group>>;

    /// Create a group.
    fn create_group(&self, groupid: &str, comment: Option<&str>) -> Result<()>;

    /// Set a group's comment.
    fn update_group(&self, groupid: &str, comment: &str) -> Result<()>;

    /// Remove a group.
    fn delete_group(&self, groupid: &str) -> Result<()>;
}

/// A request recorded by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Version,
    GetRole(String),
    ListRoles,
    CreateRole {
        roleid: String,
        privs: Vec<String>,
    },
    UpdateRole {
        roleid: String,
        privs: Vec<String>,
        append: bool,
    },
    DeleteRole(String),
    GetGroup(String),
    ListGroups,
    CreateGroup {
        groupid: String,
        comment: Option<String>,
    },
    UpdateGroup {
        groupid: String,
        comment: String,
    },
    DeleteGroup(String),
}

impl Call {
    /// Whether the call changes server state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateRole { .. }
                | Self::UpdateRole { .. }
                | Self::DeleteRole(_)
                | Self::CreateGroup { .. }
                | Self::UpdateGroup { .. }
                | Self::DeleteGroup(_)
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    roles: BTreeMap<String, Role>,
    groups: BTreeMap<String, Group>,
    calls: Vec<Call>,
    read_failure: Option<String>,
    write_failure: Option<String>,
}

/// In-memory backend for tests.
///
/// Clones share state, so a test can hand one clone to a client and inspect
/// the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create an empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role.
    #[must_use]
    pub fn with_role(self, roleid: &str, privs: &[&str]) -> Self {
        self.state()
            .roles
            .insert(roleid.to_string(), Role::new(roleid, privs));
        self
    }

    /// Add a predefined role.
    #[must_use]
    pub fn with_special_role(self, roleid: &str, privs: &[&str]) -> Self {
        let mut role = Role::new(roleid, privs);
        role.special = Some(true);
        self.state().roles.insert(roleid.to_string(), role);
        self
    }

    /// Add a group.
    #[must_use]
    pub fn with_group(self, groupid: &str, comment: Option<&str>, members: &[&str]) -> Self {
        let mut group = Group::new(groupid, comment);
        group.members = members.iter().map(|m| (*m).to_string()).collect();
        self.state().groups.insert(groupid.to_string(), group);
        self
    }

    /// Make every read fail with a transport error.
    #[must_use]
    pub fn failing_reads(self, message: &str) -> Self {
        self.state().read_failure = Some(message.to_string());
        self
    }

    /// Make every write fail with an API error.
    #[must_use]
    pub fn failing_writes(self, message: &str) -> Self {
        self.state().write_failure = Some(message.to_string());
        self
    }

    /// Current state of a role.
    #[must_use]
    pub fn role(&self, roleid: &str) -> Option<Role> {
        self.state().roles.get(roleid).cloned()
    }

    /// Current state of a group.
    #[must_use]
    pub fn group(&self, groupid: &str) -> Option<Group> {
        self.state().groups.get(groupid).cloned()
    }

    /// Every call issued so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls that would have changed server state.
    #[must_use]
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, call: Call) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.calls.push(call);
        if let Some(message) = state.read_failure.clone() {
            return Err(Error::http(message));
        }
        Ok(state)
    }

    fn write(&self, call: Call) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.calls.push(call);
        if let Some(message) = state.write_failure.clone() {
            return Err(Error::api(500, message));
        }
        Ok(state)
    }
}

impl Backend for MockBackend {
    fn version(&self) -> Result<Version> {
        let _state = self.read(Call::Version)?;
        Ok(Version {
            version: "8.2.4".to_string(),
            release: "8.2".to_string(),
            repoid: "mock".to_string(),
        })
    }

    fn get_role(&self, roleid: &str) -> Result<Option<Role>> {
        let state = self.read(Call::GetRole(roleid.to_string()))?;
        // The single-role endpoint does not report `special`.
        Ok(state.roles.get(roleid).cloned().map(|mut role| {
            role.special = None;
            role
        }))
    }

    fn list_roles(&self) -> Result<Vec<Role>> {
        let state = self.read(Call::ListRoles)?;
        Ok(state
            .roles
            .values()
            .cloned()
            .map(|mut role| {
                role.special.get_or_insert(false);
                role
            })
            .collect())
    }

    fn create_role(&self, roleid: &str, privs: &[String]) -> Result<()> {
        let mut state = self.write(Call::CreateRole {
            roleid: roleid.to_string(),
            privs: privs.to_vec(),
        })?;
        if state.roles.contains_key(roleid) {
            return Err(Error::api(500, format!("role '{roleid}' already exists")));
        }
        state
            .roles
            .insert(roleid.to_string(), Role::new(roleid, privs));
        Ok(())
    }

    fn update_role(&self, roleid: &str, privs: &[String], append: bool) -> Result<()> {
        let mut state = self.write(Call::UpdateRole {
            roleid: roleid.to_string(),
            privs: privs.to_vec(),
            append,
        })?;
        let role = state.roles.get_mut(roleid).ok_or_else(|| Error::NotFound {
            kind: "role",
            id: roleid.to_string(),
        })?;
        let merged: Vec<String> = if append {
            role.privs.iter().chain(privs).cloned().collect()
        } else {
            privs.to_vec()
        };
        role.privs = normalize_privileges(&merged);
        Ok(())
    }

    fn delete_role(&self, roleid: &str) -> Result<()> {
        let mut state = self.write(Call::DeleteRole(roleid.to_string()))?;
        state
            .roles
            .remove(roleid)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound {
                kind: "role",
                id: roleid.to_string(),
            })
    }

    fn get_group(&self, groupid: &str) -> Result<Option<Group>> {
        let state = self.read(Call::GetGroup(groupid.to_string()))?;
        Ok(state.groups.get(groupid).cloned())
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        let state = self.read(Call::ListGroups)?;
        Ok(state.groups.values().cloned().collect())
    }

    fn create_group(&self, groupid: &str, comment: Option<&str>) -> Result<()> {
        let mut state = self.write(Call::CreateGroup {
            groupid: groupid.to_string(),
            comment: comment.map(str::to_string),
        })?;
        if state.groups.contains_key(groupid) {
            return Err(Error::api(500, format!("group '{groupid}' already exists")));
        }
        state
            .groups
            .insert(groupid.to_string(), Group::new(groupid, comment));
        Ok(())
    }

    fn update_group(&self, groupid: &str, comment: &str) -> Result<()> {
        let mut state = self.write(Call::UpdateGroup {
            groupid: groupid.to_string(),
            comment: comment.to_string(),
        })?;
        let group = state
            .groups
            .get_mut(groupid)
            .ok_or_else(|| Error::NotFound {
                kind: "group",
                id: groupid.to_string(),
            })?;
        // PVE drops the property when it is set to an empty string.
        group.comment = Some(comment.to_string()).filter(|c| !c.is_empty());
        Ok(())
    }

    fn delete_group(&self, groupid: &str) -> Result<()> {
        let mut state = self.write(Call::DeleteGroup(groupid.to_string()))?;
        state
            .groups
            .remove(groupid)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound {
                kind: "group",
                id: groupid.to_string(),
            })
    }
}
