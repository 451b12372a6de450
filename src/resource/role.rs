//! PVE role resource

use anyhow::Result;
use declarative::{Action, Ensure, Resource};
use pveapi::convert::{list_equals, list_subset, normalize_privileges};
use pveapi::{Client, Role};
use serde::Deserialize;

/// Desired state of a role
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleSpec {
    #[serde(rename = "name", alias = "roleid")]
    pub roleid: String,
    #[serde(default, alias = "priv", deserialize_with = "crate::args::deserialize_list")]
    pub privs: Vec<String>,
    /// Add `privs` to the existing set instead of replacing it
    #[serde(default, deserialize_with = "crate::args::deserialize_bool")]
    pub append: bool,
    #[serde(default)]
    pub state: Ensure,
}

impl RoleSpec {
    pub fn new(roleid: &str, privs: &[&str], append: bool, state: Ensure) -> Self {
        Self {
            roleid: roleid.to_string(),
            privs: privs.iter().map(|p| (*p).to_string()).collect(),
            append,
            state,
        }
    }

    /// Reject input that must never reach the API
    pub fn validate(&self) -> Result<()> {
        if self.roleid.trim().is_empty() {
            anyhow::bail!("role name must not be empty");
        }
        pveapi::validate_id("role", &self.roleid)?;
        Ok(())
    }

    /// Desired privileges as a set
    pub fn desired_privs(&self) -> Vec<String> {
        normalize_privileges(&self.privs)
    }

    /// Whether an existing role needs an update
    ///
    /// In append mode only missing privileges count; otherwise the sets must
    /// be equal.
    pub fn differs_from(&self, current: &Role) -> bool {
        let desired = self.desired_privs();
        if self.append {
            !list_subset(&desired, &current.privs)
        } else {
            !list_equals(&desired, &normalize_privileges(&current.privs))
        }
    }

    /// Privileges the role ends up with after `action`
    pub fn resulting_privs(&self, action: Action, current: Option<&Role>) -> Vec<String> {
        match (action, current) {
            (Action::Update, Some(current)) if self.append => {
                let merged: Vec<&String> = current.privs.iter().chain(&self.privs).collect();
                normalize_privileges(&merged)
            }
            (Action::NoChange | Action::Delete, Some(current)) => current.privs.clone(),
            _ => self.desired_privs(),
        }
    }
}

/// A role bound to the client that manages it
#[derive(Debug)]
pub struct RoleResource<'a> {
    client: &'a Client,
    spec: &'a RoleSpec,
}

impl<'a> RoleResource<'a> {
    pub fn new(client: &'a Client, spec: &'a RoleSpec) -> Self {
        Self { client, spec }
    }
}

impl Resource for RoleResource<'_> {
    type Current = Role;

    fn id(&self) -> &str {
        &self.spec.roleid
    }

    fn resource_type(&self) -> &'static str {
        "role"
    }

    fn ensure(&self) -> Ensure {
        self.spec.state
    }

    fn current_state(&self) -> Result<Option<Role>> {
        Ok(self.client.roles().get(&self.spec.roleid)?)
    }

    fn needs_update(&self, current: &Role) -> bool {
        self.spec.differs_from(current)
    }

    fn create(&self) -> Result<()> {
        self.client
            .roles()
            .create(&self.spec.roleid, &self.spec.desired_privs())?;
        Ok(())
    }

    fn update(&self, _current: &Role) -> Result<()> {
        self.client
            .roles()
            .update(&self.spec.roleid, &self.spec.desired_privs(), self.spec.append)?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        self.client.roles().delete(&self.spec.roleid)?;
        Ok(())
    }
}
