use crate::config::ApiSettings;
use crate::module::ModuleName;
use crate::resource::{GroupSpec, RoleSpec};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use declarative::Ensure;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pvectl")]
#[command(version)]
#[command(about = "Manage Proxmox VE access-control roles and groups", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub api: ApiArgs,

    #[command(subcommand)]
    pub command: Command,
}

// ============================================================================
// Connection
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct ApiArgs {
    /// Node to connect to
    #[arg(long, env = "PROXMOX_HOST", global = true)]
    pub api_host: Option<String>,

    /// API port [default: 8006]
    #[arg(long, env = "PROXMOX_PORT", global = true)]
    pub api_port: Option<u16>,

    /// User to authenticate as, e.g. root@pam
    #[arg(long, env = "PROXMOX_USER", global = true)]
    pub api_user: Option<String>,

    /// Password login
    #[arg(long, env = "PROXMOX_PASSWORD", hide_env_values = true, global = true)]
    pub api_password: Option<String>,

    /// API token id (requires --api-token-secret)
    #[arg(long, alias = "token-id", env = "PROXMOX_TOKEN", global = true)]
    pub api_token_id: Option<String>,

    /// API token secret
    #[arg(
        long,
        alias = "token-secret",
        env = "PROXMOX_SECRET",
        hide_env_values = true,
        global = true
    )]
    pub api_token_secret: Option<String>,

    /// Verify the node's TLS certificate
    #[arg(long, alias = "validate-certs", global = true)]
    pub api_validate_certs: bool,
}

impl From<ApiArgs> for ApiSettings {
    fn from(args: ApiArgs) -> Self {
        Self {
            api_host: args.api_host,
            api_port: args.api_port,
            api_user: args.api_user,
            api_password: args.api_password,
            api_token_id: args.api_token_id,
            api_token_secret: args.api_token_secret,
            api_validate_certs: Some(args.api_validate_certs),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Subcommand)]
pub enum Command {
    /// Ensure a role exists with the given privileges, or does not exist
    Role(RoleArgs),

    /// Ensure a group exists with the given comment, or does not exist
    Group(GroupArgs),

    /// Show one role, or every role
    RoleInfo {
        /// Role to show
        name: Option<String>,
    },

    /// Show one group, or every group
    GroupInfo {
        /// Group to show
        name: Option<String>,
    },

    /// Run as an Ansible binary module
    Module {
        #[arg(value_enum)]
        module: ModuleName,

        /// JSON file with the module arguments
        args_file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum StateArg {
    #[default]
    Present,
    Absent,
}

impl From<StateArg> for Ensure {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}

#[derive(Args)]
pub struct RoleArgs {
    /// Role id
    pub name: String,

    /// Privileges, comma-separated
    #[arg(long, alias = "priv", value_delimiter = ',')]
    pub privs: Vec<String>,

    /// Add the privileges to the existing set instead of replacing it
    #[arg(long)]
    pub append: bool,

    #[arg(long, value_enum, default_value_t)]
    pub state: StateArg,

    /// Report what would change without changing it
    #[arg(long)]
    pub check: bool,
}

impl From<RoleArgs> for RoleSpec {
    fn from(args: RoleArgs) -> Self {
        Self {
            roleid: args.name,
            privs: args.privs,
            append: args.append,
            state: args.state.into(),
        }
    }
}

#[derive(Args)]
pub struct GroupArgs {
    /// Group id
    pub name: String,

    /// Free-text comment; empty clears it
    #[arg(long, default_value = "")]
    pub comment: String,

    #[arg(long, value_enum, default_value_t)]
    pub state: StateArg,

    /// Report what would change without changing it
    #[arg(long)]
    pub check: bool,
}

impl From<GroupArgs> for GroupSpec {
    fn from(args: GroupArgs) -> Self {
        Self {
            groupid: args.name,
            comment: args.comment,
            state: args.state.into(),
        }
    }
}
