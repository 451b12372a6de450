//! Group reconciliation

use crate::resource::{GroupResource, GroupSpec};
use anyhow::Result;
use declarative::{ApplyContext, Ensure, converge};
use pveapi::Client;
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct GroupOutput {
    pub changed: bool,
    pub state: Ensure,
    pub group: GroupFacts,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct GroupFacts {
    pub groupid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

pub fn run(client: &Client, spec: &GroupSpec, ctx: &ApplyContext) -> Result<GroupOutput> {
    spec.validate()?;
    let outcome = converge(&GroupResource::new(client, spec), ctx)?;

    let comment = spec.state.is_present().then(|| {
        spec.resulting_comment(outcome.action, outcome.current.as_ref())
            .unwrap_or_default()
    });

    Ok(GroupOutput {
        changed: outcome.changed(),
        state: spec.state,
        group: GroupFacts {
            groupid: spec.groupid.clone(),
            comment,
        },
    })
}
