//! Request authentication.
//!
//! Password logins are exchanged for a ticket once; the ticket travels as the
//! `PVEAuthCookie` cookie and every write additionally carries the CSRF token.
//! API tokens are sent verbatim in the `Authorization` header.

use crate::error::{Error, Result};
use serde::Deserialize;

/// An authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub enum Session {
    /// Ticket obtained from `POST /access/ticket`.
    Ticket {
        /// Value of the `PVEAuthCookie` cookie.
        ticket: String,
        /// Value of the `CSRFPreventionToken` header.
        csrf_token: String,
    },
    /// API token header value.
    Token(String),
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ticket { .. } => f.write_str("Session::Ticket"),
            Self::Token(_) => f.write_str("Session::Token"),
        }
    }
}

impl Session {
    /// Build a token session for `user` (`root@pam`) and token `id`.
    #[must_use]
    pub fn token(user: &str, id: &str, secret: &str) -> Self {
        Self::Token(format!("PVEAPIToken={user}!{id}={secret}"))
    }

    /// Headers to attach to a request. `write` selects the CSRF header.
    #[must_use]
    pub fn headers(&self, write: bool) -> Vec<(&'static str, String)> {
        match self {
            Self::Ticket { ticket, csrf_token } => {
                let mut headers = vec![("Cookie", format!("PVEAuthCookie={ticket}"))];
                if write {
                    headers.push(("CSRFPreventionToken", csrf_token.clone()));
                }
                headers
            }
            Self::Token(value) => vec![("Authorization", value.clone())],
        }
    }
}

#[derive(Debug, Deserialize)]
struct TicketEnvelope {
    data: Option<TicketData>,
}

#[derive(Debug, Deserialize)]
struct TicketData {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    csrf_token: String,
}

/// Parse the body of a successful `POST /access/ticket`.
///
/// PVE answers a rejected login with `{"data": null}`.
pub fn parse_ticket_response(body: &str) -> Result<Session> {
    let envelope: TicketEnvelope = serde_json::from_str(body)?;
    let data = envelope
        .data
        .ok_or_else(|| Error::Auth("authentication failure".to_string()))?;
    Ok(Session::Ticket {
        ticket: data.ticket,
        csrf_token: data.csrf_token,
    })
}
