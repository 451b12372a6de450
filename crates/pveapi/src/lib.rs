//! # pveapi
//!
//! Blocking client for the access-control part of the Proxmox VE API.
//!
//! This crate provides:
//! - Typed roles and groups with their wire formats normalized
//! - Password (ticket) and API token authentication
//! - A [`Backend`](backend::Backend) trait with an HTTP implementation and an
//!   in-memory [`MockBackend`] for tests
//! - The boolean and list conversions PVE's API conventions need
//!
//! ## Example
//!
//! ```no_run
//! use pveapi::{Client, ConnectionConfig, Credentials};
//!
//! let config = ConnectionConfig {
//!     host: "pve1.example.com".to_string(),
//!     port: 8006,
//!     user: "root@pam".to_string(),
//!     credentials: Credentials::Token {
//!         id: "automation".to_string(),
//!         secret: "00000000-0000-0000-0000-000000000000".to_string(),
//!     },
//!     validate_certs: true,
//! };
//!
//! let client = Client::connect(&config).expect("connection failed");
//! match client.roles().get("PVEAuditor").unwrap() {
//!     Some(role) => println!("{}: {}", role.roleid, role.privs.join(",")),
//!     None => println!("no such role"),
//! }
//! ```
//!
//! ## Lookups
//!
//! A lookup of a resource that does not exist returns `Ok(None)`. Every `Err`
//! is an operational failure (network, authentication, rejected request).

#![warn(clippy::all)]

pub mod access;
pub mod auth;
pub mod backend;
pub mod convert;
pub mod error;
pub mod types;

pub use access::{Groups, Roles};
pub use backend::{Backend, Call, MockBackend};
pub use error::{Error, ErrorCategory, Result};
pub use types::{ConnectionConfig, Credentials, DEFAULT_PORT, Group, Role, Version, validate_id};

use log::debug;
use std::fmt;

/// High-level client for PVE access-control operations.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Connect to a node and verify the credentials.
    ///
    /// Authenticates, then probes `GET /version` so bad credentials fail
    /// before any reconciliation starts.
    #[cfg(feature = "http")]
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let backend = backend::http::HttpBackend::connect(config)?;
        let client = Self::with_backend(Box::new(backend));
        let version = client.version()?;
        debug!("connected to {} (PVE {})", config.host, version.version);
        Ok(client)
    }

    /// Built without the `http` feature: there is no transport to connect with.
    #[cfg(not(feature = "http"))]
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        debug!("cannot connect to {}: no HTTP transport", config.host);
        Err(Error::MissingDependency(
            "HTTP transport (build pveapi with the `http` feature)",
        ))
    }

    /// Create a client with a custom backend (useful for testing).
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Fetch the server version.
    pub fn version(&self) -> Result<Version> {
        self.backend.version()
    }

    /// Role operations.
    #[must_use]
    pub fn roles(&self) -> Roles<'_> {
        Roles {
            backend: self.backend.as_ref(),
        }
    }

    /// Group operations.
    #[must_use]
    pub fn groups(&self) -> Groups<'_> {
        Groups {
            backend: self.backend.as_ref(),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_with_mock_backend() {
        let mock = MockBackend::new().with_role("ops", &["VM.Audit"]);
        let client = Client::with_backend(Box::new(mock.clone()));

        let role = client.roles().get("ops").unwrap().unwrap();
        assert_eq!(role.privs, vec!["VM.Audit"]);
        assert_eq!(client.roles().get("ghost").unwrap(), None);
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn test_client_version() {
        let client = Client::with_backend(Box::new(MockBackend::new()));
        assert_eq!(client.version().unwrap().release, "8.2");
    }

    #[test]
    fn test_client_group_lifecycle() {
        let mock = MockBackend::new();
        let client = Client::with_backend(Box::new(mock.clone()));
        let groups = client.groups();

        groups.create("admins", Some("ops team")).unwrap();
        groups.update("admins", "platform team").unwrap();
        assert_eq!(
            groups.get("admins").unwrap().unwrap().comment.as_deref(),
            Some("platform team")
        );

        groups.delete("admins").unwrap();
        assert!(groups.get_all().unwrap().is_empty());
        assert_eq!(mock.mutations().len(), 3);
    }

    #[test]
    fn test_client_role_update_append() {
        let mock = MockBackend::new().with_role("ops", &["A"]);
        let client = Client::with_backend(Box::new(mock.clone()));

        client
            .roles()
            .update("ops", &["B".to_string()], true)
            .unwrap();
        assert_eq!(mock.role("ops").unwrap().privs, vec!["A", "B"]);
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn test_connect_without_transport_fails_fast() {
        let config = ConnectionConfig {
            host: "pve1".to_string(),
            port: DEFAULT_PORT,
            user: "root@pam".to_string(),
            credentials: Credentials::Password("secret".to_string()),
            validate_certs: false,
        };
        let err = Client::connect(&config).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Capability);
    }
}
