//! Connection settings shared by every subcommand and module
//!
//! Settings come from CLI flags (clap reads the environment itself) or from a
//! module args file, which gets an explicit environment fallback pass. Both
//! end in [`ApiSettings::into_connection`].

use anyhow::{Context, Result, bail};
use pveapi::{ConnectionConfig, Credentials, DEFAULT_PORT};
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Keys of the args file that belong to [`ApiSettings`], aliases included
pub const API_KEYS: &[&str] = &[
    "api_host",
    "api_port",
    "api_user",
    "api_password",
    "api_token_id",
    "token_id",
    "api_token_secret",
    "token_secret",
    "api_validate_certs",
    "validate_certs",
];

/// Raw, unvalidated connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSettings {
    #[serde(default)]
    pub api_host: Option<String>,
    #[serde(default, deserialize_with = "deserialize_port")]
    pub api_port: Option<u16>,
    #[serde(default)]
    pub api_user: Option<String>,
    #[serde(default)]
    pub api_password: Option<String>,
    #[serde(default, alias = "token_id")]
    pub api_token_id: Option<String>,
    #[serde(default, alias = "token_secret")]
    pub api_token_secret: Option<String>,
    #[serde(
        default,
        alias = "validate_certs",
        deserialize_with = "crate::args::deserialize_optional_bool"
    )]
    pub api_validate_certs: Option<bool>,
}

impl ApiSettings {
    /// Fill unset fields from the `PROXMOX_*` variables
    ///
    /// `lookup` is `std::env::var` in production.
    pub fn with_env_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| non_empty(lookup(key));

        fill(&mut self.api_host, || env("PROXMOX_HOST"));
        fill(&mut self.api_user, || env("PROXMOX_USER"));
        fill(&mut self.api_password, || env("PROXMOX_PASSWORD"));
        fill(&mut self.api_token_id, || env("PROXMOX_TOKEN"));
        fill(&mut self.api_token_secret, || env("PROXMOX_SECRET"));

        if self.api_port.is_none()
            && let Some(port) = env("PROXMOX_PORT")
        {
            self.api_port = Some(parse_port(&port).context("invalid PROXMOX_PORT")?);
        }
        Ok(self)
    }

    /// Validate the settings into a connection config
    ///
    /// Nothing here touches the network.
    pub fn into_connection(self) -> Result<ConnectionConfig> {
        let host = non_empty(self.api_host);
        let user = non_empty(self.api_user);
        let password = non_empty(self.api_password);
        let token_id = non_empty(self.api_token_id);
        let token_secret = non_empty(self.api_token_secret);

        let (host, user) = match (host, user) {
            (Some(host), Some(user)) => (host, user),
            (host, user) => {
                let missing: Vec<&str> = [("api_host", host.is_none()), ("api_user", user.is_none())]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                bail!("missing required arguments: {}", missing.join(", "));
            }
        };

        let credentials = match (password, token_id, token_secret) {
            (Some(_), Some(_), _) => {
                bail!("parameters are mutually exclusive: api_password|api_token_id")
            }
            (_, Some(_), None) | (_, None, Some(_)) => {
                bail!("parameters are required together: api_token_id, api_token_secret")
            }
            (Some(password), None, None) => Credentials::Password(password),
            (None, Some(id), Some(secret)) => Credentials::Token { id, secret },
            (None, None, None) => {
                bail!("one of the following is required: api_password, api_token_id")
            }
        };

        Ok(ConnectionConfig {
            host,
            port: self.api_port.unwrap_or(DEFAULT_PORT),
            user,
            credentials,
            validate_certs: self.api_validate_certs.unwrap_or(false),
        })
    }
}

fn fill(slot: &mut Option<String>, fallback: impl FnOnce() -> Option<String>) {
    if slot.as_deref().is_none_or(|v| v.trim().is_empty()) {
        *slot = fallback();
    }
}

/// Empty strings count as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .with_context(|| format!("'{value}' is not a valid port"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

/// Ports arrive as numbers or strings depending on the caller
fn deserialize_port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u16>, D::Error> {
    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PortValue::Text(text)) => parse_port(&text)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("api_port: {e}"))),
    }
}
