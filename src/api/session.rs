//! Session ownership: the only component permitted to mutate the session.

use serde_json::json;

use crate::api::dispatch::ProtocolDispatcher;
use crate::api::error::ApiError;
use crate::api::operations::{EndSessionData, LoginData, END_SESSION, GENERATE_SESSION};
use crate::api::types::Session;

/// Owns the `Option<Session>` and performs login/logout against the backend.
///
/// Expiry is discovered lazily: `is_authenticated` reports whether a session
/// is held, not whether it is still valid, and a failed call is what
/// triggers re-authentication. No background timers run.
///
/// Methods take `&mut self`, so one client cannot race against itself.
/// Sharing one manager across tasks is out of contract; concurrent logins
/// would be last-writer-wins.
pub struct SessionManager {
    client_id: String,
    session: Option<Session>,
}

impl SessionManager {
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            session: None,
        }
    }

    /// Install a session supplied by an external collaborator (persisted
    /// record or environment token) without validating it against the
    /// backend. Validation is deferred to first use.
    pub fn restore(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Authenticate with the "new session" operation.
    ///
    /// On success the held session is replaced wholesale and a copy is
    /// returned. On a non-empty failure list the error carries the joined
    /// messages and no state is mutated, so the previously held session
    /// (absent or otherwise) stays observable.
    pub async fn login(
        &mut self,
        dispatcher: &ProtocolDispatcher,
        username: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let variables = json!({
            "username": username,
            "password": password,
            "clientId": self.client_id,
        });
        let data: LoginData = dispatcher
            .execute_graphql(GENERATE_SESSION, variables, None)
            .await?;

        let payload = data.generate_session;
        if let Some(failures) = payload.failures.as_ref().filter(|f| !f.is_empty()) {
            let message = failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::Authentication(message));
        }

        let session = payload.into_session()?;
        tracing::info!(customer_id = %session.customer_id, "logged in");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Invalidate the server-side session (best-effort) and clear the held
    /// session unconditionally. A failed backend call never prevents the
    /// local state from clearing.
    pub async fn logout(&mut self, dispatcher: &ProtocolDispatcher) {
        if let Some(session) = &self.session {
            let result: Result<EndSessionData, ApiError> = dispatcher
                .execute_graphql(END_SESSION, json!({}), Some(&session.access_token))
                .await;
            if let Err(err) = result {
                tracing::warn!(%err, "server-side session invalidation failed");
            }
        }
        self.session = None;
    }

    /// Whether a session is held, regardless of whether it has expired.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn order_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.customer_order_id.as_str())
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.customer_id.as_str())
    }

    pub fn branch_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.default_branch_id.as_str())
    }
}
