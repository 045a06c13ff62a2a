//! Error taxonomy for the grocery API client.
//!
//! Classification is typed: the reauthentication policy dispatches on
//! variants, never on rendered messages. The only place message text is
//! inspected is [`message_looks_unauthenticated`], a decode-time fallback for
//! GraphQL error envelopes that carry no `extensions.code`.

use thiserror::Error;

use crate::api::types::ApiFailure;

/// Errors produced by the dispatch, session and reauthentication layers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx HTTP status.
    #[error("HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The request never completed (DNS, TLS, connect, body read).
    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// A 2xx response whose top-level GraphQL `errors` list was non-empty.
    ///
    /// `unauthenticated` is derived once at decode time from
    /// `extensions.code`, so callers never re-parse messages.
    #[error("GraphQL error: {message}")]
    Protocol {
        message: String,
        unauthenticated: bool,
    },

    /// A business rejection nested inside an otherwise valid payload.
    /// Never retried: the service understood the request and said no.
    #[error("Rejected by the service: {}", join_failures(failures))]
    Domain { failures: Vec<ApiFailure> },

    /// The login call itself was rejected by the backend.
    #[error("Login rejected: {0}")]
    Authentication(String),

    /// No session is held and no credential source could supply one.
    #[error("Not logged in, and no credentials are available")]
    NotAuthenticated,

    /// The single permitted retry after a fresh login also failed.
    #[error("Re-authentication failed: {source}")]
    ReauthenticationFailed {
        #[source]
        source: Box<ApiError>,
    },

    /// The response body did not match the expected envelope shape.
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this failure should trigger one reauthentication cycle.
    ///
    /// Only a 401 transport status or a protocol error flagged
    /// unauthenticated at decode time qualifies. Domain failures and every
    /// other status propagate untouched.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ApiError::Transport { status, .. } => *status == 401,
            ApiError::Protocol {
                unauthenticated, ..
            } => *unauthenticated,
            _ => false,
        }
    }
}

/// Fallback classification for GraphQL errors without an `extensions.code`.
///
/// Matches the upstream service's known auth-rejection wordings. Runs only
/// against protocol error messages, never against payload data, so a product
/// description containing "401" cannot trip it.
pub(crate) fn message_looks_unauthenticated(message: &str) -> bool {
    message.contains("401")
        || message.contains("Unauthorized")
        || message.contains("UNAUTHENTICATED")
}

fn join_failures(failures: &[ApiFailure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
