//! HTTP backend for a live PVE node.
//!
//! # Not-found detection
//!
//! PVE reports a missing role or group with an error status whose message is
//! carried in the status line, not in the body. A `404` is taken at face
//! value. For any other error status on a single-resource lookup the list
//! endpoint decides: if the id is not listed the lookup yields `Ok(None)`,
//! otherwise the original error is returned.

use crate::auth::{Session, parse_ticket_response};
use crate::backend::Backend;
use crate::convert::{DEFAULT_SEPARATOR, WirePrivileges, delimited_to_list, list_to_delimited};
use crate::convert::{local_bool_to_remote, remote_bool_to_local};
use crate::error::{Error, Result};
use crate::types::{ConnectionConfig, Credentials, Group, Role, Version};
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use ureq::http::{Response, StatusCode};
use ureq::tls::TlsConfig;
use ureq::{Agent, Body};

const USER_AGENT: &str = concat!("pveapi-rs/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP backend.
pub struct HttpBackend {
    /// HTTP agent for requests.
    agent: Agent,
    /// `https://host:port/api2/json`
    base_url: String,
    session: Session,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
enum Method {
    Post,
    Put,
}

impl HttpBackend {
    /// Create a backend and authenticate against the node.
    ///
    /// Password credentials are exchanged for a ticket here; token
    /// credentials need no round trip.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let tls = TlsConfig::builder()
            .disable_verification(!config.validate_certs)
            .build();
        let agent_config = Agent::config_builder()
            .tls_config(tls)
            .http_status_as_error(false)
            .build();
        let agent = Agent::new_with_config(agent_config);
        let base_url = config.base_url();

        let session = match &config.credentials {
            Credentials::Token { id, secret } => Session::token(&config.user, id, secret),
            Credentials::Password(password) => {
                login(&agent, &base_url, &config.user, password)?
            }
        };

        Ok(Self {
            agent,
            base_url,
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {path}");
        let mut request = self
            .agent
            .get(&self.url(path))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);
        for (name, value) in self.session.headers(false) {
            request = request.header(name, value);
        }
        let body = read_body(request.call()?)?;
        parse_data(&body)
    }

    fn send_form(&self, method: Method, path: &str, form: &[(&str, String)]) -> Result<()> {
        let mut request = match method {
            Method::Post => {
                debug!("POST {path}");
                self.agent.post(&self.url(path))
            }
            Method::Put => {
                debug!("PUT {path}");
                self.agent.put(&self.url(path))
            }
        }
        .header("Accept", "application/json")
        .header("User-Agent", USER_AGENT);
        for (name, value) in self.session.headers(true) {
            request = request.header(name, value);
        }
        let response = request.send_form(form.iter().map(|(k, v)| (*k, v.as_str())))?;
        read_body(response).map(|_| ())
    }

    fn delete(&self, path: &str) -> Result<()> {
        debug!("DELETE {path}");
        let mut request = self
            .agent
            .delete(&self.url(path))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);
        for (name, value) in self.session.headers(true) {
            request = request.header(name, value);
        }
        read_body(request.call()?).map(|_| ())
    }
}

impl Backend for HttpBackend {
    fn version(&self) -> Result<Version> {
        self.get("/version")
    }

    fn get_role(&self, roleid: &str) -> Result<Option<Role>> {
        match self.get::<WirePrivileges>(&format!("/access/roles/{roleid}")) {
            Ok(privs) => Ok(Some(Role {
                roleid: roleid.to_string(),
                privs: privs.into_list(),
                special: None,
            })),
            Err(err) => resolve_missing(err, || {
                Ok(self.list_roles()?.iter().any(|r| r.roleid == roleid))
            }),
        }
    }

    fn list_roles(&self) -> Result<Vec<Role>> {
        let entries: Vec<RoleEntry> = self.get("/access/roles")?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    fn create_role(&self, roleid: &str, privs: &[String]) -> Result<()> {
        let mut form = vec![("roleid", roleid.to_string())];
        if !privs.is_empty() {
            form.push(("privs", list_to_delimited(privs, DEFAULT_SEPARATOR)));
        }
        self.send_form(Method::Post, "/access/roles", &form)
    }

    fn update_role(&self, roleid: &str, privs: &[String], append: bool) -> Result<()> {
        let mut form = vec![("privs", list_to_delimited(privs, DEFAULT_SEPARATOR))];
        if let Some(flag) = local_bool_to_remote(Some(append)) {
            form.push(("append", flag.to_string()));
        }
        self.send_form(Method::Put, &format!("/access/roles/{roleid}"), &form)
    }

    fn delete_role(&self, roleid: &str) -> Result<()> {
        self.delete(&format!("/access/roles/{roleid}"))
    }

    fn get_group(&self, groupid: &str) -> Result<Option<Group>> {
        match self.get::<GroupDetail>(&format!("/access/groups/{groupid}")) {
            Ok(detail) => Ok(Some(Group {
                groupid: groupid.to_string(),
                comment: detail.comment,
                members: detail.members,
            })),
            Err(err) => resolve_missing(err, || {
                Ok(self.list_groups()?.iter().any(|g| g.groupid == groupid))
            }),
        }
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        let entries: Vec<GroupEntry> = self.get("/access/groups")?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    fn create_group(&self, groupid: &str, comment: Option<&str>) -> Result<()> {
        let mut form = vec![("groupid", groupid.to_string())];
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            form.push(("comment", comment.to_string()));
        }
        self.send_form(Method::Post, "/access/groups", &form)
    }

    fn update_group(&self, groupid: &str, comment: &str) -> Result<()> {
        let form = [("comment", comment.to_string())];
        self.send_form(Method::Put, &format!("/access/groups/{groupid}"), &form)
    }

    fn delete_group(&self, groupid: &str) -> Result<()> {
        self.delete(&format!("/access/groups/{groupid}"))
    }
}

/// Turn a failed single-resource lookup into `Ok(None)` when the resource
/// is confirmed missing.
///
/// `is_listed` is only consulted for non-404 statuses. If it fails, the
/// lookup error is kept.
fn resolve_missing<T>(err: Error, is_listed: impl FnOnce() -> Result<bool>) -> Result<Option<T>> {
    match err.status() {
        Some(404) => Ok(None),
        Some(_) => match is_listed() {
            Ok(false) => Ok(None),
            Ok(true) => Err(err),
            Err(list_err) => {
                debug!("could not confirm absence: {list_err}");
                Err(err)
            }
        },
        None => Err(err),
    }
}

/// Exchange a password for a ticket.
fn login(agent: &Agent, base_url: &str, user: &str, password: &str) -> Result<Session> {
    debug!("POST /access/ticket for {user}");
    let response = agent
        .post(&format!("{base_url}/access/ticket"))
        .header("Accept", "application/json")
        .header("User-Agent", USER_AGENT)
        .send_form([("username", user), ("password", password)])?;

    match read_body(response) {
        Ok(body) => parse_ticket_response(&body),
        Err(Error::Api { status: 401, message }) => Err(Error::Auth(message)),
        Err(err) => Err(err),
    }
}

/// Read the response body, mapping error statuses to [`Error::Api`].
fn read_body(mut response: Response<Body>) -> Result<String> {
    let status = response.status();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| Error::http(e.to_string()))?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::api(status.as_u16(), api_message(status, &body)))
    }
}

/// Best-effort error message for a failed request.
///
/// Parameter validation errors come back as an `errors` object keyed by
/// parameter name.
fn api_message(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("error").to_string();
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        return if trimmed.is_empty() {
            reason
        } else {
            trimmed.to_string()
        };
    };

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return message.trim().to_string();
    }
    if let Some(errors) = value.get("errors").and_then(Value::as_object) {
        let details: Vec<String> = errors
            .iter()
            .map(|(param, msg)| format!("{param}: {}", msg.as_str().unwrap_or_default().trim()))
            .collect();
        if !details.is_empty() {
            return format!("{reason} ({})", details.join("; "));
        }
    }
    reason
}

/// Unwrap the `{"data": ...}` envelope.
fn parse_data<T: DeserializeOwned>(body: &str) -> Result<T> {
    #[derive(Deserialize)]
    struct Envelope<T> {
        data: T,
    }
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.data)
}

// =============================================================================
// PVE API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RoleEntry {
    roleid: String,
    #[serde(default)]
    privs: Option<WirePrivileges>,
    #[serde(default)]
    special: Value,
}

impl From<RoleEntry> for Role {
    fn from(entry: RoleEntry) -> Self {
        Self {
            roleid: entry.roleid,
            privs: entry.privs.map(WirePrivileges::into_list).unwrap_or_default(),
            special: Some(remote_bool_to_local(&entry.special)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GroupDetail {
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    members: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    groupid: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    users: Option<String>,
}

impl From<GroupEntry> for Group {
    fn from(entry: GroupEntry) -> Self {
        Self {
            groupid: entry.groupid,
            comment: entry.comment,
            members: delimited_to_list(entry.users.as_deref(), DEFAULT_SEPARATOR),
        }
    }
}
