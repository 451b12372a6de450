//! Per-resource handles over a [`Backend`].
//!
//! `client.roles()` and `client.groups()` expose the same five operations
//! (`get`, `get_all`, `create`, `update`, `delete`) for their resource type.
//! Ids are checked with [`validate_id`] before the backend sees them.

use crate::backend::Backend;
use crate::error::Result;
use crate::types::{Group, Role, validate_id};
use log::info;

/// Role operations.
#[derive(Clone, Copy)]
pub struct Roles<'a> {
    pub(crate) backend: &'a dyn Backend,
}

impl Roles<'_> {
    /// Fetch one role; `Ok(None)` if it does not exist.
    pub fn get(&self, roleid: &str) -> Result<Option<Role>> {
        validate_id("role", roleid)?;
        self.backend.get_role(roleid)
    }

    /// Fetch every role.
    pub fn get_all(&self) -> Result<Vec<Role>> {
        self.backend.list_roles()
    }

    pub fn create(&self, roleid: &str, privs: &[String]) -> Result<()> {
        validate_id("role", roleid)?;
        self.backend.create_role(roleid, privs)?;
        info!("created role {roleid}");
        Ok(())
    }

    /// Replace the privileges, or add to them when `append` is set.
    pub fn update(&self, roleid: &str, privs: &[String], append: bool) -> Result<()> {
        validate_id("role", roleid)?;
        self.backend.update_role(roleid, privs, append)?;
        info!("updated role {roleid} (append={append})");
        Ok(())
    }

    pub fn delete(&self, roleid: &str) -> Result<()> {
        validate_id("role", roleid)?;
        self.backend.delete_role(roleid)?;
        info!("deleted role {roleid}");
        Ok(())
    }
}

/// Group operations.
#[derive(Clone, Copy)]
pub struct Groups<'a> {
    pub(crate) backend: &'a dyn Backend,
}

impl Groups<'_> {
    /// Fetch one group; `Ok(None)` if it does not exist.
    pub fn get(&self, groupid: &str) -> Result<Option<Group>> {
        validate_id("group", groupid)?;
        self.backend.get_group(groupid)
    }

    /// Fetch every group.
    pub fn get_all(&self) -> Result<Vec<Group>> {
        self.backend.list_groups()
    }

    pub fn create(&self, groupid: &str, comment: Option<&str>) -> Result<()> {
        validate_id("group", groupid)?;
        self.backend.create_group(groupid, comment)?;
        info!("created group {groupid}");
        Ok(())
    }

    pub fn update(&self, groupid: &str, comment: &str) -> Result<()> {
        validate_id("group", groupid)?;
        self.backend.update_group(groupid, comment)?;
        info!("updated group {groupid}");
        Ok(())
    }

    pub fn delete(&self, groupid: &str) -> Result<()> {
        validate_id("group", groupid)?;
        self.backend.delete_group(groupid)?;
        info!("deleted group {groupid}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Call, Client, ErrorCategory, MockBackend};

    #[test]
    fn test_invalid_ids_never_reach_the_backend() {
        let mock = MockBackend::new().with_role("ops", &["A"]);
        let client = Client::with_backend(Box::new(mock.clone()));

        let err = client.roles().delete("x/../../groups/admins").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(client.roles().get("a/b").is_err());
        assert!(client.roles().update("a?b", &[], true).is_err());
        assert!(client.groups().create("a#b", None).is_err());
        assert!(client.groups().get("..").is_err());

        assert!(mock.calls().is_empty());
        assert!(mock.role("ops").is_some());
    }

    #[test]
    fn test_valid_ids_pass_through() {
        let mock = MockBackend::new();
        let client = Client::with_backend(Box::new(mock.clone()));

        assert_eq!(client.groups().get("vm-admins_2.0").unwrap(), None);
        assert_eq!(mock.calls(), vec![Call::GetGroup("vm-admins_2.0".to_string())]);
    }
}
