//! Read-only group queries

use anyhow::{Context, Result};
use pveapi::{Client, Group};
use serde::Serialize;

/// One entry of the `groups` list
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub groupid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<Group> for GroupInfo {
    fn from(group: Group) -> Self {
        Self {
            groupid: Some(group.groupid),
            users: Some(group.members),
            comment: group.comment,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct GroupInfoOutput {
    pub changed: bool,
    pub groups: Vec<GroupInfo>,
}

/// Fetch one group by id, or every group when `groupid` is `None`
pub fn run(client: &Client, groupid: Option<&str>) -> Result<GroupInfoOutput> {
    let groups = match groupid.filter(|g| !g.is_empty()) {
        Some(groupid) => {
            let group = client
                .groups()
                .get(groupid)
                .with_context(|| format!("failed to look up group '{groupid}'"))?;
            vec![group.map(GroupInfo::from).unwrap_or_default()]
        }
        None => client
            .groups()
            .get_all()
            .context("failed to list groups")?
            .into_iter()
            .map(GroupInfo::from)
            .collect(),
    };

    Ok(GroupInfoOutput {
        changed: false,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pveapi::MockBackend;
    use serde_json::json;

    #[test]
    fn test_single_group_renames_members() {
        let mock = MockBackend::new().with_group("admins", Some("ops"), &["alice@pam", "bob@pve"]);
        let client = Client::with_backend(Box::new(mock));

        let output = run(&client, Some("admins")).unwrap();
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "changed": false,
                "groups": [{"groupid": "admins", "users": ["alice@pam", "bob@pve"], "comment": "ops"}]
            })
        );
    }

    #[test]
    fn test_comment_omitted_when_missing() {
        let mock = MockBackend::new().with_group("admins", None, &[]);
        let client = Client::with_backend(Box::new(mock));

        let output = run(&client, None).unwrap();
        assert_eq!(
            serde_json::to_value(&output.groups).unwrap(),
            json!([{"groupid": "admins", "users": []}])
        );
    }

    #[test]
    fn test_missing_group_reports_null_id() {
        let client = Client::with_backend(Box::new(MockBackend::new()));

        let output = run(&client, Some("ghost")).unwrap();
        assert_eq!(output.groups, vec![GroupInfo::default()]);
        assert_eq!(
            serde_json::to_value(&output.groups).unwrap(),
            json!([{"groupid": null}])
        );
    }
}
