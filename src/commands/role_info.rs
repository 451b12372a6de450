//! Read-only role queries

use anyhow::{Context, Result};
use pveapi::{Client, Role};
use serde::Serialize;

/// One entry of the `roles` list
///
/// A lookup of a missing role yields a single entry with `name: null`.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoleInfo {
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<bool>,
}

impl From<Role> for RoleInfo {
    fn from(role: Role) -> Self {
        Self {
            name: Some(role.roleid),
            privs: Some(role.privs),
            special: role.special,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RoleInfoOutput {
    pub changed: bool,
    pub roles: Vec<RoleInfo>,
}

/// Fetch one role by name, or every role when `name` is `None`
pub fn run(client: &Client, name: Option<&str>) -> Result<RoleInfoOutput> {
    let roles = match name.filter(|n| !n.is_empty()) {
        Some(name) => {
            let role = client
                .roles()
                .get(name)
                .with_context(|| format!("failed to look up role '{name}'"))?;
            vec![role.map(RoleInfo::from).unwrap_or_default()]
        }
        None => client
            .roles()
            .get_all()
            .context("failed to list roles")?
            .into_iter()
            .map(RoleInfo::from)
            .collect(),
    };

    Ok(RoleInfoOutput {
        changed: false,
        roles,
    })
}
