//! PVE group resource

use anyhow::Result;
use declarative::{Action, Ensure, Resource};
use pveapi::{Client, Group};
use serde::Deserialize;

/// Desired state of a group
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    #[serde(rename = "name", alias = "groupid")]
    pub groupid: String,
    /// Empty means "no comment"
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub state: Ensure,
}

impl GroupSpec {
    pub fn new(groupid: &str, comment: &str, state: Ensure) -> Self {
        Self {
            groupid: groupid.to_string(),
            comment: comment.to_string(),
            state,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.groupid.trim().is_empty() {
            anyhow::bail!("group name must not be empty");
        }
        pveapi::validate_id("group", &self.groupid)?;
        Ok(())
    }

    /// Desired comment, `None` when empty
    pub fn desired_comment(&self) -> Option<&str> {
        Some(self.comment.as_str()).filter(|c| !c.is_empty())
    }

    /// A missing comment on the server equals an empty desired comment.
    pub fn differs_from(&self, current: &Group) -> bool {
        current.comment.as_deref().unwrap_or_default() != self.comment
    }

    /// Comment the group ends up with after `action`
    pub fn resulting_comment(&self, action: Action, current: Option<&Group>) -> Option<String> {
        match (action, current) {
            (Action::NoChange | Action::Delete, Some(current)) => current.comment.clone(),
            _ => self.desired_comment().map(str::to_string),
        }
    }
}

/// A group bound to the client that manages it
#[derive(Debug)]
pub struct GroupResource<'a> {
    client: &'a Client,
    spec: &'a GroupSpec,
}

impl<'a> GroupResource<'a> {
    pub fn new(client: &'a Client, spec: &'a GroupSpec) -> Self {
        Self { client, spec }
    }
}

impl Resource for GroupResource<'_> {
    type Current = Group;

    fn id(&self) -> &str {
        &self.spec.groupid
    }

    fn resource_type(&self) -> &'static str {
        "group"
    }

    fn ensure(&self) -> Ensure {
        self.spec.state
    }

    fn current_state(&self) -> Result<Option<Group>> {
        Ok(self.client.groups().get(&self.spec.groupid)?)
    }

    fn needs_update(&self, current: &Group) -> bool {
        self.spec.differs_from(current)
    }

    fn create(&self) -> Result<()> {
        self.client
            .groups()
            .create(&self.spec.groupid, self.spec.desired_comment())?;
        Ok(())
    }

    fn update(&self, _current: &Group) -> Result<()> {
        self.client
            .groups()
            .update(&self.spec.groupid, &self.spec.comment)?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        self.client.groups().delete(&self.spec.groupid)?;
        Ok(())
    }
}
