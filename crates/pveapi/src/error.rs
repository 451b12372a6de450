//! Error types for PVE API operations.
//!
//! A lookup of a resource that does not exist is not an error: lookups return
//! `Ok(None)`. Everything in this module describes an operational failure,
//! which the callers treat as fatal for the current invocation.

use std::fmt;

/// Result type alias for PVE API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Host unreachable, TLS failure, connection reset.
    Network,
    /// Credentials rejected or session not established.
    Auth,
    /// The referenced resource does not exist.
    NotFound,
    /// The API rejected the request.
    Api,
    /// The API answered with something we could not decode.
    Format,
    /// Invalid local configuration or argument.
    Config,
    /// The binary was built without a required capability.
    Capability,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Resource not found",
            Self::Api => "Request rejected by the API",
            Self::Format => "Unexpected API response",
            Self::Config => "Invalid configuration",
            Self::Capability => "Missing capability",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check api_host, api_port and api_validate_certs",
            Self::Auth => "Check api_user and the password or API token",
            Self::NotFound => "Verify the role or group name",
            Self::Api => "Check the request parameters and the token's privileges",
            Self::Format => "The server may run an unsupported Proxmox VE version",
            Self::Config => "Check the module arguments and PROXMOX_* environment variables",
            Self::Capability => "Rebuild with the default features enabled",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the PVE API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure (connection, TLS, I/O).
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
    },

    /// The API answered with an error status.
    #[error("{status} {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response.
        message: String,
    },

    /// Login or token authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A mutation referenced a resource that does not exist.
    #[error("{kind} '{id}' does not exist")]
    NotFound {
        /// Resource type ("role", "group").
        kind: &'static str,
        /// Resource identifier.
        id: String,
    },

    /// Invalid response from the API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// A value had the wrong type.
    #[error("{0}")]
    InvalidValue(String),

    /// The binary was built without a capability it needs at runtime.
    #[error("missing required dependency: {0}")]
    MissingDependency(&'static str),
}

impl Error {
    /// Create an API status error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// HTTP status code carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { .. } => ErrorCategory::Network,
            Self::Api { status: 401, .. } => ErrorCategory::Auth,
            Self::Api { status: 404, .. } => ErrorCategory::NotFound,
            Self::Api { .. } => ErrorCategory::Api,
            Self::Auth(_) => ErrorCategory::Auth,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidResponse(_) => ErrorCategory::Format,
            Self::InvalidValue(_) => ErrorCategory::Config,
            Self::MissingDependency(_) => ErrorCategory::Capability,
        }
    }
}

#[cfg(feature = "http")]
impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Api {
                status: code,
                message: format!("HTTP {code}"),
            },
            other => Self::Http {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
