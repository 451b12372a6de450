//! Ansible binary-module entry point
//!
//! Ansible copies a JSON file holding the task arguments to the target and
//! runs the module with its path. Framework keys start with `_ansible_`;
//! of those only `_ansible_check_mode` is honoured.
//!
//! Installed under a module name (`pve_role`, a symlink to the binary),
//! the tool is invoked by Ansible as `pve_role <args-file>`.

use crate::commands::Task;
use crate::config::{API_KEYS, ApiSettings};
use crate::output::ModuleFailure;
use crate::resource::{GroupSpec, RoleSpec};
use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use declarative::ApplyContext;
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ModuleName {
    PveRole,
    PveGroup,
    PveRoleInfo,
    PveGroupInfo,
}

impl ModuleName {
    /// Field that names the resource, plus its alias
    fn id_keys(self) -> [&'static str; 2] {
        match self {
            Self::PveRole | Self::PveRoleInfo => ["name", "roleid"],
            Self::PveGroup | Self::PveGroupInfo => ["name", "groupid"],
        }
    }

    /// Field the failure output uses for the resource id
    fn id_field(self) -> &'static str {
        match self {
            Self::PveRole => "roleid",
            Self::PveRoleInfo => "name",
            Self::PveGroup | Self::PveGroupInfo => "groupid",
        }
    }
}

/// Parsed module arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleArgs {
    pub check_mode: bool,
    pub api: ApiSettings,
    /// Module options, framework and connection keys removed
    pub options: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RoleInfoOptions {
    #[serde(default, alias = "roleid")]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupInfoOptions {
    #[serde(default, alias = "groupid")]
    name: Option<String>,
}

impl ModuleArgs {
    /// Split a raw args document into its parts
    ///
    /// Accepts the bare argument object as well as one wrapped in
    /// `ANSIBLE_MODULE_ARGS`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut document: Map<String, Value> =
            serde_json::from_str(raw).context("module arguments are not a JSON object")?;
        if let Some(Value::Object(inner)) = document.remove("ANSIBLE_MODULE_ARGS") {
            document = inner;
        }

        let mut check_mode = false;
        let mut api = Map::new();
        let mut options = Map::new();
        for (key, value) in document {
            if key == "_ansible_check_mode" {
                check_mode = value.as_bool().unwrap_or(false);
            } else if key.starts_with("_ansible_") {
                debug!("ignoring framework argument {key}");
            } else if API_KEYS.contains(&key.as_str()) {
                api.insert(key, value);
            } else {
                options.insert(key, value);
            }
        }

        let api = serde_json::from_value(Value::Object(api)).context("invalid connection arguments")?;
        Ok(Self {
            check_mode,
            api,
            options,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("could not read module arguments from {}", path.display()))?;
        Self::parse(&raw)
    }

    /// Build the task for `module` from the options
    pub fn task(&self, module: ModuleName) -> Result<Task> {
        let task = match module {
            ModuleName::PveRole => Task::Role(self.options_as::<RoleSpec>()?),
            ModuleName::PveGroup => Task::Group(self.options_as::<GroupSpec>()?),
            ModuleName::PveRoleInfo => Task::RoleInfo(self.options_as::<RoleInfoOptions>()?.name),
            ModuleName::PveGroupInfo => {
                Task::GroupInfo(self.options_as::<GroupInfoOptions>()?.name)
            }
        };
        Ok(task)
    }

    /// Best-effort resource id for failures raised before the task exists
    fn raw_identity(&self, module: ModuleName) -> Option<(&'static str, String)> {
        module
            .id_keys()
            .iter()
            .find_map(|key| self.options.get(*key).and_then(Value::as_str))
            .map(|id| (module.id_field(), id.to_string()))
    }

    fn options_as<T: DeserializeOwned>(&self) -> Result<T> {
        if let Some(Value::String(state)) = self.options.get("state")
            && !matches!(state.as_str(), "present" | "absent")
        {
            bail!("value of state must be one of: present, absent, got: {state}");
        }
        serde_json::from_value(Value::Object(self.options.clone()))
            .context("unsupported module arguments")
    }
}

/// Module named by the program name, with the args file that follows it
///
/// `None` when the binary runs under any other name.
pub fn invoked_as(args: impl IntoIterator<Item = OsString>) -> Option<(ModuleName, Option<PathBuf>)> {
    let mut args = args.into_iter();
    let program = PathBuf::from(args.next()?);
    let stem = program.file_stem()?.to_str()?;
    let module = ModuleName::from_str(stem, false).ok()?;
    Some((module, args.next().map(PathBuf::from)))
}

/// Run a module invoked by name
pub fn run_invoked(module: ModuleName, path: Option<&Path>) -> Result<Value, ModuleFailure> {
    match path {
        Some(path) => run(module, path),
        None => Err(ModuleFailure {
            msg: "no module arguments file given".to_string(),
            resource: None,
            category: None,
        }),
    }
}

/// Run `module` with the args file at `path`
pub fn run(module: ModuleName, path: &Path) -> Result<Value, ModuleFailure> {
    let args = ModuleArgs::load(path).map_err(|e| ModuleFailure::from_error(&e, None))?;
    let task = args
        .task(module)
        .map_err(|e| ModuleFailure::from_error(&e, args.raw_identity(module)))?;
    let api = args
        .api
        .clone()
        .with_env_fallback(|key| std::env::var(key).ok())
        .map_err(|e| ModuleFailure::from_error(&e, task.identity()))?;

    debug!("running {module:?} (check mode: {})", args.check_mode);
    crate::commands::execute(api, &task, &ApplyContext::new(args.check_mode))
}
