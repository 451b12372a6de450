//! Command implementations
//!
//! Every entry point (CLI subcommand or module invocation) builds a [`Task`]
//! and hands it to [`execute`], which validates, connects, runs and shapes
//! the result.

pub mod group;
pub mod group_info;
pub mod role;
pub mod role_info;

use crate::config::ApiSettings;
use crate::output::ModuleFailure;
use crate::resource::{GroupSpec, RoleSpec};
use anyhow::{Context, Result};
use declarative::ApplyContext;
use log::debug;
use pveapi::Client;
use serde_json::Value;

/// One unit of work against the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Role(RoleSpec),
    Group(GroupSpec),
    RoleInfo(Option<String>),
    GroupInfo(Option<String>),
}

impl Task {
    /// Field and value identifying the resource in failure output
    pub fn identity(&self) -> Option<(&'static str, String)> {
        match self {
            Self::Role(spec) => Some(("roleid", spec.roleid.clone())),
            Self::Group(spec) => Some(("groupid", spec.groupid.clone())),
            Self::RoleInfo(name) => name.clone().map(|n| ("name", n)),
            Self::GroupInfo(groupid) => groupid.clone().map(|g| ("groupid", g)),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Role(spec) => spec.validate(),
            Self::Group(spec) => spec.validate(),
            Self::RoleInfo(Some(name)) if !name.is_empty() => {
                Ok(pveapi::validate_id("role", name)?)
            }
            Self::GroupInfo(Some(groupid)) if !groupid.is_empty() => {
                Ok(pveapi::validate_id("group", groupid)?)
            }
            Self::RoleInfo(_) | Self::GroupInfo(_) => Ok(()),
        }
    }
}

/// Validate input, connect and run `task`
///
/// Input errors are reported before any network traffic.
pub fn execute(settings: ApiSettings, task: &Task, ctx: &ApplyContext) -> Result<Value, ModuleFailure> {
    let fail = |err: anyhow::Error| ModuleFailure::from_error(&err, task.identity());

    task.validate().map_err(fail)?;
    let config = settings.into_connection().map_err(fail)?;

    debug!("connecting to {}:{} as {}", config.host, config.port, config.user);
    let client = Client::connect(&config)
        .with_context(|| format!("failed to connect to {}", config.host))
        .map_err(fail)?;

    run(&client, task, ctx).map_err(fail)
}

/// Run `task` with an established client
pub fn run(client: &Client, task: &Task, ctx: &ApplyContext) -> Result<Value> {
    let value = match task {
        Task::Role(spec) => serde_json::to_value(role::run(client, spec, ctx)?)?,
        Task::Group(spec) => serde_json::to_value(group::run(client, spec, ctx)?)?,
        Task::RoleInfo(name) => serde_json::to_value(role_info::run(client, name.as_deref())?)?,
        Task::GroupInfo(groupid) => {
            serde_json::to_value(group_info::run(client, groupid.as_deref())?)?
        }
    };
    Ok(value)
}
